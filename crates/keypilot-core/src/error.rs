use core::result::Result as CoreResult;
use std::io::Error as IoError;

use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for harness operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that abort a running scenario.
///
/// Every variant is fatal to the scenario that produced it; the harness never
/// retries beyond the bounded poll loop.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A polled condition never held within the attempt budget.
    #[error("{reason}")]
    Timeout {
        /// The last failure reason recorded before the budget ran out
        reason: String,
    },

    /// An operation was invoked while the application was in the wrong context.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The UI driver could not deliver input or answer a query.
    #[error("Driver error: {0}")]
    Driver(String),

    /// A symbolic action has no entry in the keybinding table.
    #[error("Unknown keybinding action: {0}")]
    UnknownAction(String),

    /// A key string could not be decoded.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl Error {
    /// Whether this error came from calling an operation in the wrong context.
    ///
    /// Precondition failures are caller-logic errors and are never retried;
    /// everything polled ends in [`Error::Timeout`] instead.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Whether this error came from an exhausted poll budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
