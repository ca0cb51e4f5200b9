//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for the backend URL and key (`SUPABASE_URL`, `SUPABASE_ANON_KEY`).
//!
//! # Example
//!
//! ```no_run
//! use megacopy::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;

use super::inventory::InventoryConfig;
use super::logging::LoggingConfig;
use super::realtime::RealtimeConfig;
use super::scroll::ScrollConfig;
use super::supabase::SupabaseConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Hosted backend connection.
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Push channel and reconnection settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Stock store behaviour.
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Scroll restoration timings.
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// Environment overrides are not applied; see [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config = Self::parse_unvalidated(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse_unvalidated(&content)?;
        config.supabase.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn parse_unvalidated(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.supabase.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "supabase.url" }.into());
        }
        if url::Url::parse(&self.supabase.url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "supabase.url",
                reason: format!("not a valid URL: {}", self.supabase.url),
            }
            .into());
        }
        if self.supabase.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "supabase.anon_key",
            }
            .into());
        }
        if self.supabase.table.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "supabase.table" }.into());
        }
        if self.supabase.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.realtime.heartbeat_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.realtime.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        let reconnection = &self.realtime.reconnection;
        if reconnection.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconnection.max_delay_ms < reconnection.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        if reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }
        if reconnection.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_consecutive_failures",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.inventory.change_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "change_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.inventory.conflict_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "conflict_retries",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.scroll.storage_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "scroll.storage_key",
            }
            .into());
        }
        if self.scroll.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got \"{}\"", self.logging.format),
            }
            .into());
        }

        Ok(())
    }
}
