//! Scroll tracker configuration.

use std::time::Duration;

use serde::Deserialize;

/// Timings and storage key for the scroll trackers.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    /// Session key holding the centered-product marker.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Quiet period after the last scroll event before saving.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Interval between element lookups while restoring.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Lookups retried after the first one before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_storage_key() -> String {
    "last-viewed-product".into()
}

const fn default_debounce_ms() -> u64 {
    200
}

const fn default_poll_interval_ms() -> u64 {
    100
}

const fn default_max_attempts() -> u32 {
    20
}

impl ScrollConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}
