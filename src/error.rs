//! Error types shared by the limiters and the status history.

use chrono::{DateTime, Utc};

/// Errors returned by limiter operations.
///
/// Every variant is a usage error: the limiter never reports "no answer"
/// for a well-formed report stream. A call that fails leaves the limiter
/// state untouched.
///
/// # Examples
///
/// ```rust
/// use cadence::{AdaptiveLimiter, LimiterError};
/// use chrono::{TimeZone, Utc};
///
/// let mut limiter = AdaptiveLimiter::default();
/// let now = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 10).unwrap();
/// limiter.status(Some(false), now).unwrap();
///
/// let earlier = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 9).unwrap();
/// let err = limiter.status(Some(true), earlier).unwrap_err();
/// assert!(matches!(err, LimiterError::ClockWentBackwards { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimiterError {
    /// The supplied time precedes the reference used to measure elapsed time.
    #[error("current time {now} is prior to the last report time {reference}")]
    ClockWentBackwards {
        /// The report the elapsed time is measured from.
        reference: DateTime<Utc>,
        /// The offending timestamp.
        now: DateTime<Utc>,
    },
    /// A status was recorded with a timestamp older than the newest record.
    #[error("new status records must occur after the last stored status ({reported_at} < {last})")]
    OutOfOrder {
        /// Timestamp of the newest stored record.
        last: DateTime<Utc>,
        /// Timestamp of the rejected record.
        reported_at: DateTime<Utc>,
    },
    /// The limiter was configured with values it cannot work with.
    #[error("invalid limiter configuration: {0}")]
    InvalidConfig(&'static str),
}

impl LimiterError {
    /// Returns true for errors caused by timestamps arriving out of order.
    pub fn is_causality(&self) -> bool {
        matches!(
            self,
            Self::ClockWentBackwards { .. } | Self::OutOfOrder { .. }
        )
    }
}
