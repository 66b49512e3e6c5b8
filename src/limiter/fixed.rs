//! Fixed-interval pacing.

use std::time::{Duration, Instant};

/// Enforces a fixed minimum spacing between requests.
///
/// Unlike [`AdaptiveLimiter`](super::AdaptiveLimiter) this ignores outcomes;
/// [`status`](Self::status) only stamps the request time so both limiters can
/// be driven through the same calls.
///
/// # Examples
///
/// ```rust
/// use cadence::StaticLimiter;
/// use std::time::Duration;
///
/// let mut limiter = StaticLimiter::new(Duration::from_millis(10));
///
/// // Nothing to wait for on the first call.
/// assert_eq!(limiter.throttle(), Duration::ZERO);
///
/// // The second call sleeps out the rest of the interval.
/// assert!(limiter.throttle() > Duration::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct StaticLimiter {
    interval: Option<Duration>,
    last_request: Option<Instant>,
}

impl StaticLimiter {
    /// Create a limiter spacing requests at least `interval` apart.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            last_request: None,
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self {
            interval: None,
            last_request: None,
        }
    }

    /// The configured spacing, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// When the last request was recorded.
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }

    /// Remaining wait before the next request is allowed.
    pub fn delay(&self) -> Duration {
        match (self.interval, self.last_request) {
            (Some(interval), Some(last)) => interval.saturating_sub(last.elapsed()),
            _ => Duration::ZERO,
        }
    }

    /// Sleep until the interval since the last request has passed.
    ///
    /// Returns the time slept. The very first call returns immediately and
    /// records the request time; later calls do not, use
    /// [`record_request`](Self::record_request) or [`status`](Self::status).
    pub fn throttle(&mut self) -> Duration {
        if self.last_request.is_none() {
            self.last_request = Some(Instant::now());
            return Duration::ZERO;
        }

        let delay = self.delay();
        if !delay.is_zero() {
            tracing::info!("Sleeping for {:.3} seconds.", delay.as_secs_f64());
            std::thread::sleep(delay);
        }
        delay
    }

    /// Wait asynchronously until the interval since the last request has passed.
    #[cfg(feature = "async")]
    pub async fn throttle_async(&mut self) -> Duration {
        if self.last_request.is_none() {
            self.last_request = Some(Instant::now());
            return Duration::ZERO;
        }

        let delay = self.delay();
        if !delay.is_zero() {
            tracing::info!("Sleeping for {:.3} seconds.", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Stamp the current time as the last request.
    pub fn record_request(&mut self) {
        self.last_request = Some(Instant::now());
    }

    /// Record a request. The outcome is ignored.
    pub fn status(&mut self, _success: Option<bool>) {
        self.record_request();
    }
}
