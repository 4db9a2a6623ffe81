//! Polling configuration: refresh periods and fetch limits for the panels

use serde::Deserialize;
use std::time::Duration;

/// Refresh cadence for the metrics and history views
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Metrics view refresh period (seconds)
    pub metrics_interval_secs: u64,
    /// Event history refresh period (seconds)
    pub history_interval_secs: u64,
    /// Events fetched for charting
    pub metrics_event_limit: u32,
    /// Events fetched for the history table
    pub history_event_limit: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            metrics_interval_secs: 5,
            history_interval_secs: 10,
            metrics_event_limit: 100,
            history_event_limit: 50,
        }
    }
}

/// Polling settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FilePolling {
    pub metrics_interval_secs: Option<u64>,
    pub history_interval_secs: Option<u64>,
    pub metrics_event_limit: Option<u32>,
    pub history_event_limit: Option<u32>,
}

impl PollingConfig {
    /// Create from file config with defaults
    ///
    /// Zero intervals would spin the runtime, so they are clamped to one second.
    /// Limits are clamped to the backend's accepted range (1..=100).
    pub fn from_file(file: Option<FilePolling>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            metrics_interval_secs: file
                .metrics_interval_secs
                .unwrap_or(defaults.metrics_interval_secs)
                .max(1),
            history_interval_secs: file
                .history_interval_secs
                .unwrap_or(defaults.history_interval_secs)
                .max(1),
            metrics_event_limit: file
                .metrics_event_limit
                .unwrap_or(defaults.metrics_event_limit)
                .clamp(1, 100),
            history_event_limit: file
                .history_event_limit
                .unwrap_or(defaults.history_event_limit)
                .clamp(1, 100),
        }
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_interval_secs)
    }

    pub fn history_interval(&self) -> Duration {
        Duration::from_secs(self.history_interval_secs)
    }
}
