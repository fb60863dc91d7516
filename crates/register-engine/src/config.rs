//! # Runtime Configuration
//!
//! Knobs for the orchestration layer. Read-only after startup; the binary
//! builds one from CLI arguments and hands it to the scheduler.

use std::time::Duration;

/// Configuration for the register's background behavior.
///
/// ## Example
/// ```rust
/// use register_engine::RegisterConfig;
///
/// let config = RegisterConfig::new().retention_days(3);
/// assert_eq!(config.retention_days, 3);
/// ```
#[derive(Debug, Clone)]
pub struct RegisterConfig {
    /// How many days a suspension is kept before the scheduled cleanup
    /// removes it. Default: 7.
    pub retention_days: u32,

    /// How often the cleanup task wakes to check whether the calendar day
    /// has advanced. Default: 1 hour. The cleanup itself still runs at most
    /// once per day advance; a shorter interval only tightens how soon after
    /// midnight it fires.
    pub cleanup_interval: Duration,
}

impl RegisterConfig {
    /// Creates a configuration with production defaults.
    pub fn new() -> Self {
        RegisterConfig {
            retention_days: 7,
            cleanup_interval: Duration::from_secs(60 * 60),
        }
    }

    /// Sets the retention window in days.
    pub fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Sets the scheduler tick interval.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

impl Default for RegisterConfig {
    fn default() -> Self {
        RegisterConfig::new()
    }
}
