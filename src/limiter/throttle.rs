//! The contract shared by both limiters.

use std::time::Duration;

use chrono::Utc;

use super::adaptive::AdaptiveLimiter;
use super::fixed::StaticLimiter;
use crate::error::LimiterError;

/// Something a polling loop can wait on and report back to.
///
/// Lets a caller switch between fixed and adaptive pacing without branching.
/// Both methods read the system clock.
///
/// # Examples
///
/// ```rust
/// use cadence::{AdaptiveLimiter, StaticLimiter, Throttle};
/// use std::time::Duration;
///
/// fn poll_once(limiter: &mut dyn Throttle, fetch: impl FnOnce() -> bool) {
///     limiter.throttle().unwrap();
///     let found = fetch();
///     limiter.status(Some(found)).unwrap();
/// }
///
/// let mut fixed = StaticLimiter::new(Duration::from_millis(1));
/// poll_once(&mut fixed, || true);
///
/// let mut adaptive = AdaptiveLimiter::default();
/// poll_once(&mut adaptive, || true);
/// assert_eq!(adaptive.history().len(), 1);
/// ```
pub trait Throttle {
    /// Block until the next attempt is due, returning the time slept.
    fn throttle(&mut self) -> Result<Duration, LimiterError>;

    /// Report the outcome of the attempt that just finished.
    fn status(&mut self, success: Option<bool>) -> Result<(), LimiterError>;
}

impl Throttle for AdaptiveLimiter {
    fn throttle(&mut self) -> Result<Duration, LimiterError> {
        AdaptiveLimiter::throttle(self, Utc::now())
    }

    fn status(&mut self, success: Option<bool>) -> Result<(), LimiterError> {
        AdaptiveLimiter::status(self, success, Utc::now()).map(|_| ())
    }
}

impl Throttle for StaticLimiter {
    fn throttle(&mut self) -> Result<Duration, LimiterError> {
        Ok(StaticLimiter::throttle(self))
    }

    fn status(&mut self, success: Option<bool>) -> Result<(), LimiterError> {
        StaticLimiter::status(self, success);
        Ok(())
    }
}
