//! Per-report diagnostics and read-only limiter snapshots.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Which part of the search produced the next interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SearchKind {
    /// Returned to the interval captured when the limiter became stable.
    Stable,
    /// Bisected the gap between the failure and success bounds.
    Binary,
    /// The bounds met and one of them was discarded.
    Reset,
    /// Applied the geometric step.
    Geometric,
    /// The caller reported early, so the interval was kept.
    Persist,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stable => "stable",
            Self::Binary => "binary",
            Self::Reset => "reset",
            Self::Geometric => "geometric",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Everything the limiter decided while handling one status report.
///
/// Returned by [`AdaptiveLimiter::status`](super::AdaptiveLimiter::status)
/// and emitted as a `tracing` event. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusReport {
    /// When the status was reported.
    pub reported_at: DateTime<Utc>,
    /// The reported outcome.
    pub success: Option<bool>,
    /// Elapsed time measured for this report, if a reference existed.
    pub delta: Option<Duration>,
    /// The interval that was recommended before this report.
    pub attempted_interval: Duration,
    /// Largest elapsed time known to fail, after this report.
    pub max_failure_delta: Option<Duration>,
    /// Smallest elapsed time known to succeed, after this report.
    pub min_success_delta: Option<Duration>,
    /// The recommended interval after this report.
    pub interval: Duration,
    /// Branch of the search that fired.
    pub search: SearchKind,
    /// Geometric step after this report, in seconds.
    pub adjustment: i64,
    /// Whether the limiter considers itself stable.
    pub stable: bool,
    /// Whether fine-tuning is active.
    pub fine_tuning: bool,
}

/// Read-only view of the limiter's discovered schedule.
///
/// Useful for monitoring or alerting on a source whose publication cadence
/// drifts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimiterSnapshot {
    /// Current recommended interval.
    pub interval: Duration,
    /// Interval floor and granularity.
    pub min_interval: Duration,
    /// Smallest elapsed time known to succeed.
    pub min_success_delta: Option<Duration>,
    /// Largest elapsed time known to fail.
    pub max_failure_delta: Option<Duration>,
    /// Whether the limiter considers itself stable.
    pub stable: bool,
    /// Whether fine-tuning is active.
    pub fine_tuning: bool,
    /// Last time a status was reported.
    pub last_reported: Option<DateTime<Utc>>,
}
