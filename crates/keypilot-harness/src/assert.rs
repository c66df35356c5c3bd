//! Assertions over the application's focused region.
//!
//! Every assertion here polls: the application may not have redrawn yet when
//! the assertion starts, so a mismatch is only reported once the retry budget
//! is spent. [`Assert::require_list_context`] is the single exception. It
//! guards operations that make no sense outside a list and fails on the first
//! read.

use std::sync::Arc;

use keypilot_core::{
    Attempt, ContextKind, ContextSnapshot, Error, GuiDriver, ListSnapshot, Matcher, Result,
    RetryPolicy,
};

/// Polling assertion vocabulary.
#[derive(Clone)]
pub struct Assert {
    driver: Arc<dyn GuiDriver>,
    policy: RetryPolicy,
}

impl Assert {
    /// Assertions reading from `driver`, retried under `policy`.
    pub fn new(driver: Arc<dyn GuiDriver>, policy: RetryPolicy) -> Self {
        Self { driver, policy }
    }

    /// The retry policy applied to every assertion.
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Read the focused region repeatedly until `check` is ready.
    ///
    /// Each attempt takes a fresh snapshot; nothing is carried between
    /// attempts.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] with the last pending reason, or a driver error.
    pub async fn poll_context<T, F>(&self, check: F) -> Result<T>
    where
        F: Fn(&ContextSnapshot) -> Attempt<T>,
    {
        let driver = &self.driver;
        let check = &check;
        self.policy
            .run(move || async move {
                let context = driver.current_context().await?;
                Ok(check(&context))
            })
            .await
    }

    /// The focused window is `name`.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if the window never matches.
    pub async fn current_window_name(&self, name: &str) -> Result<()> {
        self.poll_context(|context| {
            if context.window == name {
                Attempt::Ready(())
            } else {
                Attempt::pending(format!(
                    "Expected current window name to be '{name}', but got '{}'",
                    context.window
                ))
            }
        })
        .await
    }

    /// The focused view is `name`.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if the view never matches.
    pub async fn current_view_name(&self, name: &str) -> Result<()> {
        self.poll_context(|context| {
            if context.view == name {
                Attempt::Ready(())
            } else {
                Attempt::pending(format!(
                    "Expected current view name to be '{name}', but got '{}'",
                    context.view
                ))
            }
        })
        .await
    }

    /// The focused region is list-shaped.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if a list never gains focus.
    pub async fn in_list_context(&self) -> Result<()> {
        self.poll_context(|context| {
            if context.kind.is_list() {
                Attempt::Ready(())
            } else {
                Attempt::pending(not_a_list(context))
            }
        })
        .await
    }

    /// Read the focused region once and fail immediately unless it is a list.
    ///
    /// # Errors
    /// Returns [`Error::Precondition`] if the focused region is not list-shaped.
    pub async fn require_list_context(&self) -> Result<ContextSnapshot> {
        let context = self.driver.current_context().await?;
        if context.kind.is_list() && context.list.is_some() {
            Ok(context)
        } else {
            Err(Error::Precondition(not_a_list(&context)))
        }
    }

    /// A menu has focus.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if no menu appears.
    pub async fn in_menu(&self) -> Result<()> {
        self.in_kind(ContextKind::Menu).await
    }

    /// A confirmation popup has focus.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if no confirmation appears.
    pub async fn in_confirm(&self) -> Result<()> {
        self.in_kind(ContextKind::Confirmation).await
    }

    /// A text prompt has focus.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if no prompt appears.
    pub async fn in_prompt(&self) -> Result<()> {
        self.in_kind(ContextKind::Prompt).await
    }

    /// An alert popup has focus.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if no alert appears.
    pub async fn in_alert(&self) -> Result<()> {
        self.in_kind(ContextKind::Alert).await
    }

    async fn in_kind(&self, kind: ContextKind) -> Result<()> {
        self.poll_context(|context| {
            if context.kind == kind {
                Attempt::Ready(())
            } else {
                Attempt::pending(format!(
                    "Expected to be in a {kind} context, but current view is {}",
                    context.describe()
                ))
            }
        })
        .await
    }

    /// The selected line of the focused list satisfies `matcher`.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] naming `matcher` if the selection never matches.
    pub async fn selected_line(&self, matcher: &Matcher) -> Result<()> {
        self.poll_context(|context| {
            let Some(line) = context.list.as_ref().and_then(ListSnapshot::selected_line) else {
                return Attempt::pending(format!(
                    "Expected selected line to match {}, but {} has no selected line",
                    matcher.name(),
                    context.describe()
                ));
            };
            let outcome = matcher.test(line);
            if outcome.matched {
                Attempt::Ready(())
            } else {
                Attempt::pending(mismatch("selected line", matcher, line, outcome.detail))
            }
        })
        .await
    }

    /// The title of the focused region satisfies `matcher`.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] naming `matcher` if the title never matches.
    pub async fn current_view_title(&self, matcher: &Matcher) -> Result<()> {
        self.poll_context(|context| {
            let outcome = matcher.test(&context.title);
            if outcome.matched {
                Attempt::Ready(())
            } else {
                Attempt::pending(mismatch("view title", matcher, &context.title, outcome.detail))
            }
        })
        .await
    }

    /// The content of the focused region satisfies `matcher`.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] naming `matcher` if the content never matches.
    pub async fn current_view_content(&self, matcher: &Matcher) -> Result<()> {
        self.poll_context(|context| {
            let outcome = matcher.test(&context.content);
            if outcome.matched {
                Attempt::Ready(())
            } else {
                Attempt::pending(mismatch(
                    "view content",
                    matcher,
                    &context.content,
                    outcome.detail,
                ))
            }
        })
        .await
    }

    /// The focused region holds exactly `expected` lines of content.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] if the count never matches.
    pub async fn view_line_count(&self, expected: usize) -> Result<()> {
        self.poll_context(|context| {
            let actual = context.content.lines().count();
            if actual == expected {
                Attempt::Ready(())
            } else {
                Attempt::pending(format!(
                    "Expected {expected} lines in view '{}', but got {actual}",
                    context.view
                ))
            }
        })
        .await
    }
}

fn not_a_list(context: &ContextSnapshot) -> String {
    format!(
        "Expected to be in a list context, but current view is {}",
        context.describe()
    )
}

fn mismatch(subject: &str, matcher: &Matcher, actual: &str, detail: Option<String>) -> String {
    let detail = detail.unwrap_or_else(|| format!("got '{actual}'"));
    format!("Unexpected {subject}: expected {}. {detail}", matcher.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use keypilot_core::{contains, equals};
    use keypilot_testkit::{RecordingDriver, list_context, popup_context};

    fn assert_over(driver: &Arc<RecordingDriver>) -> Assert {
        Assert::new(
            Arc::clone(driver) as Arc<dyn GuiDriver>,
            RetryPolicy::new(Duration::from_millis(10), 5),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_selected_line_waits_for_redraw() {
        let driver = Arc::new(RecordingDriver::list("commits", ["commit 02", "commit 01"], 1));
        driver.queue_frame(list_context("commits", ListSnapshot::new(["commit 02", "commit 01"], 0)));
        driver.queue_frame(list_context("commits", ListSnapshot::new(["commit 02", "commit 01"], 0)));
        let assert = assert_over(&driver);
        assert.selected_line(&contains("commit 01")).await.unwrap();
        assert_eq!(driver.reads(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selected_line_timeout_names_matcher() {
        let driver = Arc::new(RecordingDriver::list("commits", ["commit 02", "commit 01"], 0));
        let assert = assert_over(&driver);
        let error = assert.selected_line(&contains("commit 01")).await.unwrap_err();
        assert!(error.is_timeout());
        let reason = error.to_string();
        assert!(reason.contains("contains 'commit 01'"), "{reason}");
        assert!(reason.contains("commit 02"), "{reason}");
        assert_eq!(driver.reads(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_list_context_is_not_retried() {
        let driver = Arc::new(RecordingDriver::new(popup_context(
            "confirmation",
            ContextKind::Confirmation,
            "Delete branch",
            "Are you sure?",
        )));
        let assert = assert_over(&driver);
        let error = assert.require_list_context().await.unwrap_err();
        assert!(error.is_fatal_precondition());
        assert!(error.to_string().contains("confirmation (confirmation)"));
        assert_eq!(driver.reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_kind_and_text() {
        let driver = Arc::new(RecordingDriver::new(popup_context(
            "alert",
            ContextKind::Alert,
            "Error",
            "You cannot delete the checked out branch!",
        )));
        let assert = assert_over(&driver);
        assert.in_alert().await.unwrap();
        assert.current_view_title(&equals("Error")).await.unwrap();
        assert
            .current_view_content(&contains("checked out"))
            .await
            .unwrap();
        let error = assert.in_menu().await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Expected to be in a menu context, but current view is alert (alert)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_names_and_line_count() {
        let driver = Arc::new(RecordingDriver::list("commits", ["a", "b", "c"], 0));
        let assert = assert_over(&driver);
        assert.current_window_name("commits").await.unwrap();
        assert.current_view_name("commits").await.unwrap();
        assert.in_list_context().await.unwrap();
        assert.view_line_count(3).await.unwrap();
        let error = assert.view_line_count(2).await.unwrap_err();
        assert_eq!(error.to_string(), "Expected 2 lines in view 'commits', but got 3");
    }
}
