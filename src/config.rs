//! Server configuration.

use crate::{MatchConfig, MatchError, RegistrySettings};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the live match server, loaded from TOML.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// SQLite database receiving finished matches.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Seconds a session may sit idle before eviction.
    #[serde(default = "default_idle_timeout_secs")]
    idle_timeout_secs: u64,

    /// Seconds between eviction passes.
    #[serde(default = "default_eviction_interval_secs")]
    eviction_interval_secs: u64,

    /// Buffered events per session.
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,

    /// Series length for sessions created without explicit settings.
    #[serde(default = "default_best_of")]
    default_best_of: u32,

    /// Whether sessions default to lizard/Spock rules.
    #[serde(default)]
    default_extended_mode: bool,

    /// Whether sessions are listed publicly by default.
    #[serde(default)]
    default_public: bool,
}

fn default_db_path() -> String {
    "rps_live.db".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_eviction_interval_secs() -> u64 {
    30
}

fn default_event_capacity() -> usize {
    64
}

fn default_best_of() -> u32 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            idle_timeout_secs: default_idle_timeout_secs(),
            eviction_interval_secs: default_eviction_interval_secs(),
            event_capacity: default_event_capacity(),
            default_best_of: default_best_of(),
            default_extended_mode: false,
            default_public: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the default match settings are invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or invalid match defaults.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config
            .default_match_config()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        info!(db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Returns this configuration with a different database path.
    pub fn with_db_path(mut self, db_path: String) -> Self {
        self.db_path = db_path;
        self
    }

    /// Match settings for sessions created without explicit ones.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if `default_best_of` is not odd.
    pub fn default_match_config(&self) -> Result<MatchConfig, MatchError> {
        MatchConfig::new(
            self.default_best_of,
            self.default_extended_mode,
            self.default_public,
        )
    }

    /// Registry tuning derived from this configuration.
    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            event_capacity: self.event_capacity,
        }
    }

    /// Time between eviction passes.
    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.registry_settings().idle_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_parsed() {
        let config = ServerConfig::from_toml(
            r#"
            db_path = "matches.db"
            idle_timeout_secs = 10
            default_best_of = 3
            default_extended_mode = true
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path(), "matches.db");
        assert_eq!(config.eviction_interval(), Duration::from_secs(30));
        let match_config = config.default_match_config().unwrap();
        assert_eq!(*match_config.best_of(), 3);
        assert!(*match_config.extended_mode());
    }

    #[test]
    fn test_even_best_of_rejected() {
        let err = ServerConfig::from_toml("default_best_of = 4").unwrap_err();
        assert!(err.message.contains("best_of"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(ServerConfig::from_toml("idle_timeout_secs = \"soon\"").is_err());
    }
}
