//! Bounded polling against live application state.
//!
//! The application under test redraws on its own schedule, so reading its
//! state once right after sending input races the render loop. [`RetryPolicy`]
//! re-evaluates a check at a fixed interval until it succeeds or the attempt
//! budget runs out, and on exhaustion reports the last failure reason.

use core::future::Future;
use core::time::Duration;

use tokio::time::sleep;
use tracing::{trace, warn};

use crate::error::{Error, Result};

/// Result of a single poll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The condition held; polling stops and yields the value
    Ready(T),
    /// The condition did not hold yet, with the reason why
    Pending(String),
}

impl<T> Attempt<T> {
    /// Shorthand for [`Attempt::Pending`].
    pub fn pending(reason: impl Into<String>) -> Self {
        Self::Pending(reason.into())
    }
}

/// Fixed-interval, fixed-budget polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl RetryPolicy {
    /// Create a policy. A budget of zero attempts is treated as one.
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    /// Pause between attempts.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Maximum number of times the check is evaluated.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on the time spent waiting before a check is declared failed.
    pub fn worst_case_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }

    /// Poll `check` until it yields [`Attempt::Ready`].
    ///
    /// Errors returned by `check` itself are not retried: they abort the poll
    /// immediately, since re-reading cannot fix a broken driver or a caller in
    /// the wrong context.
    ///
    /// # Errors
    /// Returns [`Error::Timeout`] carrying the last pending reason if the budget
    /// is exhausted, or the first error returned by `check`.
    pub async fn run<T, F, Fut>(&self, mut check: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        let mut last_reason = String::new();
        for attempt in 1..=self.max_attempts {
            match check().await? {
                Attempt::Ready(value) => {
                    trace!(attempt, "poll condition satisfied");
                    return Ok(value);
                }
                Attempt::Pending(reason) => {
                    trace!(attempt, %reason, "poll condition not yet satisfied");
                    last_reason = reason;
                }
            }
            if attempt < self.max_attempts {
                sleep(self.interval).await;
            }
        }

        warn!(
            attempts = self.max_attempts,
            reason = %last_reason,
            "poll budget exhausted"
        );
        Err(Error::Timeout {
            reason: last_reason,
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), 40)
    }
}
