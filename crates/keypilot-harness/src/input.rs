//! Scenario-facing input vocabulary.
//!
//! [`Input`] turns symbolic intents into key presses resolved through the
//! keybinding table, and wraps the common popup interactions in flows that
//! check they are talking to the right popup before acting.

use core::time::Duration;
use std::sync::Arc;

use keypilot_core::{GuiDriver, KeyBinding, KeybindingConfig, Matcher, Result, contains};
use tokio::time::sleep;
use tracing::info;

use crate::assert::Assert;
use crate::keyboard::Keyboard;
use crate::navigator::{ListNavigator, Navigation};

/// Window names of the five side panels, in `jumpToBlock` order.
pub const SIDE_WINDOWS: [&str; 5] = ["status", "files", "localBranches", "commits", "stash"];

/// Input driver facade.
#[derive(Clone)]
pub struct Input {
    driver: Arc<dyn GuiDriver>,
    keys: KeybindingConfig,
    keyboard: Keyboard,
    assert: Assert,
    navigator: ListNavigator,
}

impl Input {
    /// Facade over `driver`, pressing through `keyboard` and checking with `assert`.
    pub fn new(
        driver: Arc<dyn GuiDriver>,
        keys: KeybindingConfig,
        keyboard: Keyboard,
        assert: Assert,
    ) -> Self {
        let navigator = ListNavigator::new(keyboard.clone(), assert.clone(), &keys);
        Self {
            driver,
            keys,
            keyboard,
            assert,
            navigator,
        }
    }

    /// Press literal key strings in order, e.g. `"w"` or `"<space>"`.
    ///
    /// # Errors
    /// Returns the first delivery error.
    pub async fn press(&self, keys: &[&str]) -> Result<()> {
        self.keyboard.press_all(keys).await
    }

    /// Press the key(s) bound to a symbolic action such as `commits.squashDown`.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::UnknownAction`] if the action is not bound.
    pub async fn press_action(&self, action: &str) -> Result<()> {
        match self.keys.lookup(action)? {
            KeyBinding::Single(key) => self.keyboard.press(&key).await,
            KeyBinding::Sequence(keys) => self.keyboard.press_all(&keys).await,
        }
    }

    /// Type `content` one character at a time.
    ///
    /// # Errors
    /// Returns the first delivery error.
    pub async fn type_text(&self, content: &str) -> Result<()> {
        let mut buffer = [0_u8; 4];
        for character in content.chars() {
            self.keyboard.press(character.encode_utf8(&mut buffer)).await?;
        }
        Ok(())
    }

    /// Give the application time to process something before continuing.
    pub async fn wait(&self, duration: Duration) {
        sleep(duration).await;
    }

    /// Press the confirm key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be delivered.
    pub async fn confirm(&self) -> Result<()> {
        self.keyboard.press(&self.keys.universal.confirm).await
    }

    /// Same as [`Input::confirm`].
    ///
    /// # Errors
    /// Returns an error if the key cannot be delivered.
    pub async fn enter(&self) -> Result<()> {
        self.confirm().await
    }

    /// Press the return key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be delivered.
    pub async fn cancel(&self) -> Result<()> {
        self.keyboard.press(&self.keys.universal.return_key).await
    }

    /// Press the select key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be delivered.
    pub async fn primary_action(&self) -> Result<()> {
        self.keyboard.press(&self.keys.universal.select).await
    }

    /// Press the next-item key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be delivered.
    pub async fn next_item(&self) -> Result<()> {
        self.keyboard.press(&self.keys.universal.next_item).await
    }

    /// Press the previous-item key.
    ///
    /// # Errors
    /// Returns an error if the key cannot be delivered.
    pub async fn previous_item(&self) -> Result<()> {
        self.keyboard.press(&self.keys.universal.prev_item).await
    }

    /// Focus the status window.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the window never gains focus.
    pub async fn switch_to_status_window(&self) -> Result<()> {
        self.switch_to_window(0).await
    }

    /// Focus the files window.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the window never gains focus.
    pub async fn switch_to_files_window(&self) -> Result<()> {
        self.switch_to_window(1).await
    }

    /// Focus the local branches window.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the window never gains focus.
    pub async fn switch_to_branches_window(&self) -> Result<()> {
        self.switch_to_window(2).await
    }

    /// Focus the commits window.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the window never gains focus.
    pub async fn switch_to_commits_window(&self) -> Result<()> {
        self.switch_to_window(3).await
    }

    /// Focus the stash window.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the window never gains focus.
    pub async fn switch_to_stash_window(&self) -> Result<()> {
        self.switch_to_window(4).await
    }

    async fn switch_to_window(&self, index: usize) -> Result<()> {
        let key = self.keys.jump_to_block(index)?;
        self.keyboard.press(key).await?;
        let window = SIDE_WINDOWS.get(index).copied().unwrap_or_default();
        self.assert.current_window_name(window).await
    }

    /// Move the focused list's selection onto the only visible line matching
    /// `matcher`.
    ///
    /// # Errors
    /// See [`ListNavigator::navigate_to`].
    pub async fn navigate_to_list_item(&self, matcher: &Matcher) -> Result<Navigation> {
        self.navigator.navigate_to(matcher).await
    }

    /// Send a message to the application's log channel.
    pub fn log(&self, message: &str) {
        info!(text = message, "scenario log");
        self.driver.log(message);
    }

    /// Check the confirmation popup's title and content, then accept it.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the popup or its text never matches.
    pub async fn accept_confirmation(&self, title: &Matcher, content: &Matcher) -> Result<()> {
        info!(title = %title, "accepting confirmation");
        self.expect_confirmation(title, content).await?;
        self.confirm().await
    }

    /// Check the confirmation popup's title and content, then dismiss it.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the popup or its text never matches.
    pub async fn deny_confirmation(&self, title: &Matcher, content: &Matcher) -> Result<()> {
        info!(title = %title, "denying confirmation");
        self.expect_confirmation(title, content).await?;
        self.cancel().await
    }

    async fn expect_confirmation(&self, title: &Matcher, content: &Matcher) -> Result<()> {
        self.assert.in_confirm().await?;
        self.assert.current_view_title(title).await?;
        self.assert.current_view_content(content).await
    }

    /// Check the prompt's title, type `text` and submit it.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if no matching prompt appears.
    pub async fn prompt(&self, title: &Matcher, text: &str) -> Result<()> {
        info!(title = %title, text, "answering prompt");
        self.assert.in_prompt().await?;
        self.assert.current_view_title(title).await?;
        self.type_text(text).await?;
        self.confirm().await
    }

    /// Type `text` into the prompt, switch to its suggestions, check the
    /// selected suggestion against `expected_first` and confirm it.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the prompt, the
    /// suggestions or the expected suggestion never appear.
    pub async fn typeahead(&self, title: &Matcher, text: &str, expected_first: &Matcher) -> Result<()> {
        info!(title = %title, text, "answering prompt with a suggestion");
        self.assert.in_prompt().await?;
        self.assert.current_view_title(title).await?;
        self.type_text(text).await?;
        self.keyboard.press(&self.keys.universal.toggle_panel).await?;
        self.assert.current_view_name("suggestions").await?;
        self.assert.selected_line(expected_first).await?;
        self.confirm().await
    }

    /// Check the menu's title, navigate to `option` and confirm it.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the menu or option never
    /// appears, or the option is not unique.
    pub async fn menu(&self, title: &Matcher, option: &Matcher) -> Result<()> {
        info!(title = %title, option = %option, "choosing menu option");
        self.assert.in_menu().await?;
        self.assert.current_view_title(title).await?;
        self.navigate_to_list_item(option).await?;
        self.confirm().await
    }

    /// Check the alert's title and content, then dismiss it.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the alert or its text never matches.
    pub async fn alert(&self, title: &Matcher, content: &Matcher) -> Result<()> {
        info!(title = %title, "acknowledging alert");
        self.assert.in_alert().await?;
        self.assert.current_view_title(title).await?;
        self.assert.current_view_content(content).await?;
        self.confirm().await
    }

    /// Open the merge/rebase options menu and pick "continue".
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Timeout`] if the menu never offers
    /// "continue" as its selected option.
    pub async fn continue_merge(&self) -> Result<()> {
        info!("continuing merge");
        self.keyboard
            .press(&self.keys.universal.create_rebase_options_menu)
            .await?;
        self.assert.selected_line(&contains("continue")).await?;
        self.confirm().await
    }

    /// Same as [`Input::continue_merge`].
    ///
    /// # Errors
    /// See [`Input::continue_merge`].
    pub async fn continue_rebase(&self) -> Result<()> {
        self.continue_merge().await
    }
}
