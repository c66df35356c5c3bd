//! Scripting end-to-end scenarios against a list-oriented terminal UI.
//!
//! A scenario talks to the application through two vocabularies: [`Input`]
//! for key presses and popup flows, and [`Assert`] for checks on what is
//! rendered. Both sit on a [`GuiDriver`], and both tolerate the application
//! lagging behind its input by polling under a bounded [`RetryPolicy`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use keypilot_core::{GuiDriver, HarnessConfig, Result, contains};
//! # use keypilot_harness::Harness;
//! # async fn scenario(driver: Arc<dyn GuiDriver>) -> Result<()> {
//! let harness = Harness::new(driver, &HarnessConfig::default());
//! harness.input.switch_to_commits_window().await?;
//! harness.input.navigate_to_list_item(&contains("commit 02")).await?;
//! harness.assert.selected_line(&contains("commit 02")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`RetryPolicy`]: keypilot_core::RetryPolicy

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Allow for tests"
    )
)]

/// Polling assertions.
pub mod assert;
/// Input driver facade.
pub mod input;
/// Key delivery with settle delay.
pub mod keyboard;
/// List navigation.
pub mod navigator;

use std::sync::Arc;

use keypilot_core::{GuiDriver, HarnessConfig, KeybindingConfig};

pub use assert::Assert;
pub use input::{Input, SIDE_WINDOWS};
pub use keyboard::Keyboard;
pub use navigator::{Direction, ListNavigator, MatchResult, Movement, Navigation};

/// Everything a scenario body receives.
#[derive(Clone)]
pub struct Harness {
    /// Input vocabulary
    pub input: Input,
    /// Assertion vocabulary
    pub assert: Assert,
    /// Keybinding table, for pressing application-specific actions
    pub keys: KeybindingConfig,
}

impl Harness {
    /// Wire the input and assertion vocabularies to `driver` using `config`'s
    /// settle delay, retry policy and keybindings.
    pub fn new(driver: Arc<dyn GuiDriver>, config: &HarnessConfig) -> Self {
        let keyboard = Keyboard::new(Arc::clone(&driver), config.key_delay());
        let assert = Assert::new(Arc::clone(&driver), config.retry_policy());
        let keys = config.keybindings.clone();
        let input = Input::new(driver, keys.clone(), keyboard, assert.clone());
        Self { input, assert, keys }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use keypilot_core::{ListSnapshot, RetryConfig, contains};
    use keypilot_testkit::{RecordingDriver, list_context};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_harness_uses_config_delay_and_policy() {
        let config = HarnessConfig {
            key_delay_ms: 30,
            retry: RetryConfig {
                interval_ms: 100,
                max_attempts: 3,
            },
            ..HarnessConfig::default()
        };
        let driver = Arc::new(RecordingDriver::list("commits", ["a", "b"], 0));
        let harness = Harness::new(Arc::clone(&driver) as Arc<dyn GuiDriver>, &config);
        assert_eq!(harness.assert.policy().max_attempts(), 3);

        let start = Instant::now();
        harness.input.next_item().await.unwrap();
        assert_eq!(driver.presses()[0].at.duration_since(start), Duration::from_millis(30));

        driver.queue_frame(list_context("commits", ListSnapshot::new(["a", "b"], 0)));
        let before = Instant::now();
        harness.assert.selected_line(&contains("b")).await.unwrap();
        assert_eq!(before.elapsed(), Duration::from_millis(100));
    }
}
