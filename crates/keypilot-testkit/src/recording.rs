//! In-memory driver that records every interaction.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use keypilot_core::{ContextKind, ContextSnapshot, GuiDriver, KeybindingConfig, ListSnapshot, Result};
use tokio::time::Instant;

/// A key press as seen by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPress {
    /// Key string
    pub key: String,
    /// When the press reached the driver
    pub at: Instant,
}

struct RecordingState {
    context: ContextSnapshot,
    queued_frames: VecDeque<ContextSnapshot>,
    presses: Vec<RecordedPress>,
    logs: Vec<String>,
    reads: usize,
    frozen: bool,
}

/// Driver over a single focused region whose selection reacts to the
/// next/previous item keys instantly.
///
/// Frames queued with [`RecordingDriver::queue_frame`] are served to reads
/// before the live context, which lets a test stage a view that is still
/// loading or out of date.
pub struct RecordingDriver {
    keys: KeybindingConfig,
    state: Mutex<RecordingState>,
}

impl RecordingDriver {
    /// Driver showing `context`, using the default keybindings.
    #[must_use]
    pub fn new(context: ContextSnapshot) -> Self {
        Self::with_keys(context, KeybindingConfig::default())
    }

    /// Driver showing `context`, moving the selection on `keys`' next/previous bindings.
    #[must_use]
    pub fn with_keys(context: ContextSnapshot, keys: KeybindingConfig) -> Self {
        Self {
            keys,
            state: Mutex::new(RecordingState {
                context,
                queued_frames: VecDeque::new(),
                presses: Vec::new(),
                logs: Vec::new(),
                reads: 0,
                frozen: false,
            }),
        }
    }

    /// Driver showing a side list named `view` with `lines` and `selected`.
    #[must_use]
    pub fn list<S: Into<String>>(view: &str, lines: impl IntoIterator<Item = S>, selected: usize) -> Self {
        Self::new(list_context(view, ListSnapshot::new(lines, selected)))
    }

    /// Serve `frame` to the next read instead of the live context.
    pub fn queue_frame(&self, frame: ContextSnapshot) {
        self.lock().queued_frames.push_back(frame);
    }

    /// Stop the selection from reacting to key presses.
    pub fn freeze_selection(&self, frozen: bool) {
        self.lock().frozen = frozen;
    }

    /// Replace the live context.
    pub fn set_context(&self, context: ContextSnapshot) {
        self.lock().context = context;
    }

    /// The live context.
    #[must_use]
    pub fn context(&self) -> ContextSnapshot {
        self.lock().context.clone()
    }

    /// Selected index of the live list, if the context is list-shaped.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.lock().context.list.as_ref().map(|list| list.selected)
    }

    /// Keys pressed so far, in order.
    #[must_use]
    pub fn pressed_keys(&self) -> Vec<String> {
        self.lock()
            .presses
            .iter()
            .map(|press| press.key.clone())
            .collect()
    }

    /// Key presses with their arrival times.
    #[must_use]
    pub fn presses(&self) -> Vec<RecordedPress> {
        self.lock().presses.clone()
    }

    /// Messages sent through the log channel.
    #[must_use]
    pub fn logs(&self) -> Vec<String> {
        self.lock().logs.clone()
    }

    /// Number of context reads served.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GuiDriver for RecordingDriver {
    async fn press_key(&self, key: &str) -> Result<()> {
        let mut state = self.lock();
        state.presses.push(RecordedPress {
            key: key.to_owned(),
            at: Instant::now(),
        });
        if state.frozen {
            return Ok(());
        }
        let universal = &self.keys.universal;
        if let Some(list) = state.context.list.as_mut() {
            let last = list.lines.len().saturating_sub(1);
            if key == universal.next_item {
                list.selected = (list.selected + 1).min(last);
            } else if key == universal.prev_item {
                list.selected = list.selected.saturating_sub(1);
            }
        }
        Ok(())
    }

    async fn current_context(&self) -> Result<ContextSnapshot> {
        let mut state = self.lock();
        state.reads += 1;
        let frame = state
            .queued_frames
            .pop_front()
            .unwrap_or_else(|| state.context.clone());
        Ok(frame)
    }

    fn log(&self, message: &str) {
        self.lock().logs.push(message.to_owned());
    }
}

/// Context for a side list named `view` showing `list`.
#[must_use]
pub fn list_context(view: &str, list: ListSnapshot) -> ContextSnapshot {
    ContextSnapshot {
        view: view.to_owned(),
        window: view.to_owned(),
        kind: ContextKind::SideList,
        title: view.to_owned(),
        content: list.lines.join("\n"),
        list: Some(list),
    }
}

/// Context for a non-list region of `kind`.
#[must_use]
pub fn popup_context(view: &str, kind: ContextKind, title: &str, content: &str) -> ContextSnapshot {
    ContextSnapshot {
        view: view.to_owned(),
        window: view.to_owned(),
        kind,
        title: title.to_owned(),
        content: content.to_owned(),
        list: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_selection_follows_keys_and_clamps() {
        let driver = RecordingDriver::list("commits", ["a", "b", "c"], 0);
        driver.press_key("<down>").await.unwrap();
        driver.press_key("<down>").await.unwrap();
        driver.press_key("<down>").await.unwrap();
        assert_eq!(driver.selected(), Some(2));
        driver.press_key("<up>").await.unwrap();
        assert_eq!(driver.selected(), Some(1));
        assert_eq!(driver.pressed_keys(), vec!["<down>", "<down>", "<down>", "<up>"]);
    }

    #[tokio::test]
    async fn test_frozen_selection_ignores_keys() {
        let driver = RecordingDriver::list("commits", ["a", "b"], 0);
        driver.freeze_selection(true);
        driver.press_key("<down>").await.unwrap();
        assert_eq!(driver.selected(), Some(0));
        assert_eq!(driver.pressed_keys().len(), 1);
    }

    #[tokio::test]
    async fn test_queued_frames_served_first() {
        let driver = RecordingDriver::list("commits", ["live"], 0);
        driver.queue_frame(list_context("commits", ListSnapshot::default()));
        let stale = driver.current_context().await.unwrap();
        assert!(stale.list.unwrap().lines.is_empty());
        let live = driver.current_context().await.unwrap();
        assert_eq!(live.list.unwrap().lines, vec!["live"]);
        assert_eq!(driver.reads(), 2);
    }
}
