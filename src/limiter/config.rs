//! Adaptive limiter configuration.

use std::time::Duration;

use crate::error::LimiterError;

/// Construction parameters for an [`AdaptiveLimiter`](super::AdaptiveLimiter).
///
/// Configuration is plain data: build it, inspect it, validate it, then hand
/// it to [`AdaptiveLimiter::from_config`](super::AdaptiveLimiter::from_config).
///
/// # Examples
///
/// ```rust
/// use cadence::LimiterConfig;
/// use std::time::Duration;
///
/// let config = LimiterConfig::new()
///     .with_min_interval(Duration::from_secs(600))
///     .since_success(true);
///
/// assert_eq!(config.min_interval(), Duration::from_secs(600));
/// assert!(config.validate().is_ok());
///
/// let limiter = config.build().unwrap();
/// assert_eq!(limiter.interval(), Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LimiterConfig {
    initial_interval: Duration,
    min_interval: Duration,
    since_success: bool,
    debug: bool,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            min_interval: Duration::from_secs(1),
            since_success: false,
            debug: false,
        }
    }
}

impl LimiterConfig {
    /// Default configuration: start at the minimum interval of one second.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval to use before any feedback has been received.
    ///
    /// Rounded up to a multiple of the minimum interval when the limiter is
    /// built.
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Smallest interval the limiter will recommend, and the granularity all
    /// intervals are rounded to. Must be a positive whole number of seconds.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Measure elapsed time from the last success instead of the last report.
    pub fn since_success(mut self, enabled: bool) -> Self {
        self.since_success = enabled;
        self
    }

    /// Keep the full report history and emit diagnostics at `DEBUG` level.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Get the initial interval.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Get the minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Whether elapsed time is measured from the last success.
    pub fn is_since_success(&self) -> bool {
        self.since_success
    }

    /// Whether debug mode is enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Check the configuration without building a limiter.
    pub fn validate(&self) -> Result<(), LimiterError> {
        if self.min_interval.is_zero() {
            return Err(LimiterError::InvalidConfig("min_interval must be positive"));
        }
        if self.min_interval.subsec_nanos() != 0 {
            return Err(LimiterError::InvalidConfig(
                "min_interval must be a whole number of seconds",
            ));
        }
        if i64::try_from(self.min_interval.as_secs()).is_err() {
            return Err(LimiterError::InvalidConfig("min_interval is too large"));
        }
        Ok(())
    }

    /// Validate and build the limiter.
    pub fn build(self) -> Result<super::AdaptiveLimiter, LimiterError> {
        super::AdaptiveLimiter::from_config(self)
    }
}
