//! Test doubles for driving the keypilot harness without a real terminal.
//!
//! [`ScriptedApp`] is a small git-client-shaped application rendered into a
//! ratatui test backend. [`ChannelDriver`] runs it on a background task with
//! frame-tick redraws, so reads lag input just like a live process.
//! [`RecordingDriver`] is a lighter in-memory double for unit tests that care
//! about which keys were sent and when.

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

/// Scripted application model and rendering.
pub mod app;
/// Channel-backed driver with redraw lag.
pub mod channel;
/// Key string decoding.
pub mod keys;
/// Recording in-memory driver.
pub mod recording;

pub use app::{
    BRANCHES, COMMITS, FILES, RepoFixture, STASH, STATUS, Screen, ScriptedApp, TodoAction,
};
pub use channel::{ChannelDriver, DriverOptions};
pub use keys::parse_key;
pub use recording::{RecordedPress, RecordingDriver, list_context, popup_context};
