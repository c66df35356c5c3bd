//! Interactive rebase scenario against the scripted application.
//!
//! Begins an interactive rebase, then fixups, drops and squashes some commits
//! and continues, leaving two commits behind.

#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use std::sync::Arc;

use anyhow::{Context as _, Result};
use keypilot_core::{GuiDriver, HarnessConfig, RetryConfig, contains};
use keypilot_harness::Harness;
use keypilot_testkit::{ChannelDriver, DriverOptions, RepoFixture, ScriptedApp};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt, registry};

fn init_tracing() {
    drop(
        registry()
            .with(fmt::layer().with_test_writer().with_target(false))
            .with(EnvFilter::from_default_env())
            .try_init(),
    );
}

fn harness_config() -> HarnessConfig {
    HarnessConfig {
        key_delay_ms: 5,
        retry: RetryConfig {
            interval_ms: 20,
            max_attempts: 50,
        },
        ..HarnessConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn interactive_rebase_fixup_drop_squash() -> Result<()> {
    init_tracing();
    let config = harness_config();
    let app = ScriptedApp::new(RepoFixture::with_commits(5), config.keybindings.clone());
    let driver = Arc::new(ChannelDriver::spawn(app, DriverOptions::default())?);
    let Harness { input, assert, .. } =
        Harness::new(Arc::clone(&driver) as Arc<dyn GuiDriver>, &config);

    input.switch_to_commits_window().await?;
    assert.current_view_name("commits").await?;

    let navigation = input
        .navigate_to_list_item(&contains("commit 02"))
        .await
        .context("navigating to the commit to edit")?;
    assert_eq!(navigation.presses, 3);
    input.press_action("universal.edit").await?;
    assert.selected_line(&contains("YOU ARE HERE")).await?;

    input.previous_item().await?;
    input.press_action("commits.markCommitAsFixup").await?;
    assert.selected_line(&contains("fixup")).await?;

    input.previous_item().await?;
    input.press_action("universal.remove").await?;
    assert.selected_line(&contains("drop")).await?;

    input.previous_item().await?;
    input.press_action("commits.squashDown").await?;
    assert.selected_line(&contains("squash")).await?;

    input.continue_rebase().await.context("continuing the rebase")?;

    assert.current_view_name("commits").await?;
    assert.view_line_count(2).await?;
    let commits = driver.inspect(|app| app.commits().to_vec()).await?;
    assert_eq!(commits, vec!["commit 02", "commit 01"]);
    assert!(!driver.inspect(ScriptedApp::is_rebasing).await?);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rebase_continues_from_first_commit() -> Result<()> {
    init_tracing();
    let config = harness_config();
    let app = ScriptedApp::new(RepoFixture::with_commits(3), config.keybindings.clone());
    let driver = Arc::new(ChannelDriver::spawn(app, DriverOptions::default())?);
    let harness = Harness::new(Arc::clone(&driver) as Arc<dyn GuiDriver>, &config);

    harness.input.switch_to_commits_window().await?;
    let navigation = harness
        .input
        .navigate_to_list_item(&contains("commit 03"))
        .await?;
    assert_eq!(navigation.presses, 0);
    harness.input.press_action("universal.edit").await?;
    harness.assert.selected_line(&contains("YOU ARE HERE")).await?;
    harness.input.continue_merge().await?;

    harness.assert.current_view_name("commits").await?;
    harness.assert.view_line_count(3).await?;
    Ok(())
}
