//! Syncer timing and alerting knobs.

use crate::error::{ProgressError, Result};
use std::time::Duration;

/// Period of the listening tick while a session is active.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(15);
/// On a metered network the server is contacted at most this often.
pub const DEFAULT_METERED_SYNC_INTERVAL: Duration = Duration::from_secs(60);
/// Syncs closer together than this are dropped.
pub const DEFAULT_MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);
/// Consecutive remote failures that raise one "sync failing" alert.
pub const DEFAULT_FAILURE_ALERT_THRESHOLD: u32 = 2;
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncerConfig {
    pub tick_interval: Duration,
    pub metered_sync_interval: Duration,
    pub min_sync_interval: Duration,
    pub failure_alert_threshold: u32,
    /// Request timeout handed to the HTTP remote client
    pub remote_timeout: Duration,
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            metered_sync_interval: DEFAULT_METERED_SYNC_INTERVAL,
            min_sync_interval: DEFAULT_MIN_SYNC_INTERVAL,
            failure_alert_threshold: DEFAULT_FAILURE_ALERT_THRESHOLD,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

impl SyncerConfig {
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_metered_sync_interval(mut self, interval: Duration) -> Self {
        self.metered_sync_interval = interval;
        self
    }

    pub fn with_failure_alert_threshold(mut self, threshold: u32) -> Self {
        self.failure_alert_threshold = threshold;
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("tick_interval", self.tick_interval),
            ("metered_sync_interval", self.metered_sync_interval),
            ("min_sync_interval", self.min_sync_interval),
            ("remote_timeout", self.remote_timeout),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| value.is_zero()) {
            return Err(ProgressError::InvalidConfig(format!(
                "{} must be greater than zero",
                name
            )));
        }

        if self.failure_alert_threshold == 0 {
            return Err(ProgressError::InvalidConfig(
                "failure_alert_threshold must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncerConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(15));
        assert_eq!(config.metered_sync_interval, Duration::from_secs(60));
        assert_eq!(config.min_sync_interval, Duration::from_secs(1));
        assert_eq!(config.failure_alert_threshold, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = SyncerConfig::default().with_tick_interval(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ProgressError::InvalidConfig(msg)) if msg.contains("tick_interval")
        ));

        let config = SyncerConfig::default().with_failure_alert_threshold(0);
        assert!(matches!(config.validate(), Err(ProgressError::InvalidConfig(_))));
    }
}
