//! Configuration types for the bridge host.

use crate::logging::{LogLevel, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Environment variable that turns on debug mode.
pub const DEBUG_ENV_VAR: &str = "WIZARDRY_DEBUG";

/// Root configuration loaded from `wizardry.toml` or `config.toml`.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Mirror logs to stderr and raise verbosity to at least `debug`.
    pub debug: bool,

    /// File logging settings.
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Creates a new empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables debug mode.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replaces the logging settings.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Applies overrides using `lookup` to read variables.
    ///
    /// `WIZARDRY_DEBUG=1` or `WIZARDRY_DEBUG=true` enables debug mode. Other
    /// values leave the loaded setting alone.
    #[must_use]
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(DEBUG_ENV_VAR).is_some_and(|value| is_truthy(&value)) {
            self.debug = true;
        }
        self
    }

    /// Returns the logging settings with debug mode folded in.
    #[must_use]
    pub fn effective_logging(&self) -> LoggingConfig {
        let mut logging = self.logging.clone();
        if self.debug {
            logging.stderr = true;
            logging.level = logging.level.at_least(LogLevel::Debug);
        }
        logging
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1") || value.trim().eq_ignore_ascii_case("true")
}
