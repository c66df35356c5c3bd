//! Harness configuration.
//!
//! All timing policy is process-wide: the settle delay before each key press
//! and the poll interval/budget are read once and shared by every call.

use core::fmt::Display;
use core::str::FromStr;
use core::time::Duration;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::keybindings::KeybindingConfig;
use crate::retry::RetryPolicy;

/// Environment variable overriding [`HarnessConfig::key_delay_ms`].
pub const ENV_KEY_DELAY_MS: &str = "KEYPILOT_KEY_DELAY_MS";
/// Environment variable overriding [`RetryConfig::interval_ms`].
pub const ENV_RETRY_INTERVAL_MS: &str = "KEYPILOT_RETRY_INTERVAL_MS";
/// Environment variable overriding [`RetryConfig::max_attempts`].
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "KEYPILOT_RETRY_MAX_ATTEMPTS";

/// Complete harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Settle delay before every key press, in milliseconds
    pub key_delay_ms: u64,
    /// Poll policy for assertions and navigation
    pub retry: RetryConfig,
    /// Keybinding table
    pub keybindings: KeybindingConfig,
}

/// Poll policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Pause between poll attempts, in milliseconds
    pub interval_ms: u64,
    /// Maximum poll attempts before a condition fails
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            max_attempts: 40,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms), config.max_attempts)
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file. Missing sections use defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded harness configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if an override is not a valid number.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if an override is not a valid number.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_KEY_DELAY_MS) {
            self.key_delay_ms = parse_number(ENV_KEY_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_RETRY_INTERVAL_MS) {
            self.retry.interval_ms = parse_number(ENV_RETRY_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_RETRY_MAX_ATTEMPTS) {
            self.retry.max_attempts = parse_number(ENV_RETRY_MAX_ATTEMPTS, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Settle delay before each key press.
    pub const fn key_delay(&self) -> Duration {
        Duration::from_millis(self.key_delay_ms)
    }

    /// Poll policy derived from [`Self::retry`].
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::Config(
                "retry.max_attempts must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| Error::Config(format!("{name}='{value}' is not a valid number: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.key_delay(), Duration::ZERO);
        let policy = config.retry_policy();
        assert_eq!(policy.interval(), Duration::from_millis(50));
        assert_eq!(policy.max_attempts(), 40);
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
            key_delay_ms = 15

            [retry]
            interval_ms = 5
            max_attempts = 3

            [keybindings.universal]
            confirm = "y"
            "#
        )?;

        let config = HarnessConfig::load(file.path())?;
        assert_eq!(config.key_delay(), Duration::from_millis(15));
        assert_eq!(config.retry.interval_ms, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.keybindings.universal.confirm, "y");
        assert_eq!(config.keybindings.universal.return_key, "<esc>");
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let error = HarnessConfig::load(Path::new("/nonexistent/keypilot.toml")).unwrap_err();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let error = HarnessConfig::parse("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let error = HarnessConfig::parse("key_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(error, Error::Toml(_)));
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            (ENV_KEY_DELAY_MS, "20"),
            (ENV_RETRY_MAX_ATTEMPTS, " 7 "),
        ]);
        let config = HarnessConfig::default()
            .with_overrides(|name| vars.get(name).map(|value| (*value).to_owned()))
            .unwrap();
        assert_eq!(config.key_delay_ms, 20);
        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(config.retry.interval_ms, 50);
    }

    #[test]
    fn test_invalid_override() {
        let error = HarnessConfig::default()
            .with_overrides(|name| (name == ENV_RETRY_INTERVAL_MS).then(|| "fast".to_owned()))
            .unwrap_err();
        assert!(
            error
                .to_string()
                .contains("KEYPILOT_RETRY_INTERVAL_MS='fast' is not a valid number")
        );
    }
}
