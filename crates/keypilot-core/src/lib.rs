//! Core types for the keypilot terminal UI harness.
//!
//! This crate holds the pieces the harness is built from and that carry no
//! knowledge of a particular application: line matchers, the bounded poll
//! loop, the UI driver interface, focused-region snapshots, the keybinding
//! table, configuration and errors.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Allow for tests"
    )
)]

/// Harness configuration loading.
pub mod config;
/// UI driver interface.
pub mod driver;
/// Error types and result definitions.
pub mod error;
/// Keybinding table.
pub mod keybindings;
/// Named line predicates.
pub mod matcher;
/// Bounded polling.
pub mod retry;
/// Focused-region snapshots.
pub mod snapshot;

pub use config::{HarnessConfig, RetryConfig};
pub use driver::GuiDriver;
pub use error::{Error, Result};
pub use keybindings::{KeyBinding, KeybindingConfig};
pub use matcher::{MatchOutcome, Matcher, any_of, contains, equals, matches_regex, not_contains};
pub use retry::{Attempt, RetryPolicy};
pub use snapshot::{ContextKind, ContextSnapshot, ListSnapshot};
