//! Time-ordered record of reported outcomes.
//!
//! [`StatusHistory`] keeps a bounded window of the most recent [`Outcome`]s
//! together with the latest success and the latest failure. Those two markers
//! outlive the window, so a limiter measuring "time since last success" keeps
//! working after the success itself has been evicted.
//!
//! # Examples
//!
//! ```rust
//! use cadence::history::{Outcome, StatusHistory};
//! use chrono::{TimeZone, Utc};
//!
//! let t = |s| Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, s).unwrap();
//!
//! let mut history = StatusHistory::with_limit(1);
//! history.add(Outcome::new(t(1), Some(true))).unwrap();
//! history.add(Outcome::new(t(2), Some(false))).unwrap();
//!
//! assert_eq!(history.len(), 1);
//! assert_eq!(history.last_reported(None), Some(t(2)));
//! assert_eq!(history.last_reported(Some(true)), Some(t(1)));
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::LimiterError;

/// A single reported outcome.
///
/// `success` is `None` when the caller only reports that an attempt happened
/// without knowing whether it produced anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    /// When the outcome was reported.
    pub reported_at: DateTime<Utc>,
    /// Whether the attempt succeeded, if known.
    pub success: Option<bool>,
}

impl Outcome {
    /// Create a new outcome record.
    pub fn new(reported_at: DateTime<Utc>, success: Option<bool>) -> Self {
        Self {
            reported_at,
            success,
        }
    }
}

/// Append-only outcome history with optional retention.
#[derive(Debug, Clone, Default)]
pub struct StatusHistory {
    limit: Option<usize>,
    window: VecDeque<Outcome>,
    last_success: Option<Outcome>,
    last_failure: Option<Outcome>,
}

impl StatusHistory {
    /// Create a history that never evicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history retaining at most `limit` outcomes.
    ///
    /// A limit of zero is treated as unbounded.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: (limit > 0).then_some(limit),
            ..Self::default()
        }
    }

    /// The retention limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Append an outcome.
    ///
    /// Fails with [`LimiterError::OutOfOrder`] when `outcome` is older than the
    /// newest stored outcome. Equal timestamps are accepted.
    pub fn add(&mut self, outcome: Outcome) -> Result<(), LimiterError> {
        if let Some(last) = self.window.back() {
            if last.reported_at > outcome.reported_at {
                return Err(LimiterError::OutOfOrder {
                    last: last.reported_at,
                    reported_at: outcome.reported_at,
                });
            }
        }

        self.window.push_back(outcome);

        match outcome.success {
            Some(true) => self.last_success = Some(outcome),
            Some(false) => self.last_failure = Some(outcome),
            None => {}
        }

        if let Some(limit) = self.limit {
            while self.window.len() > limit {
                self.window.pop_front();
            }
        }

        Ok(())
    }

    /// Timestamp of the latest matching outcome.
    ///
    /// `Some(true)` and `Some(false)` look up the latest success or failure,
    /// including ones already evicted from the window. `None` returns the
    /// newest outcome still in the window.
    pub fn last_reported(&self, success: Option<bool>) -> Option<DateTime<Utc>> {
        let outcome = match success {
            Some(true) => self.last_success.as_ref(),
            Some(false) => self.last_failure.as_ref(),
            None => self.window.back(),
        };
        outcome.map(|o| o.reported_at)
    }

    /// The newest outcome in the window.
    pub fn last(&self) -> Option<&Outcome> {
        self.window.back()
    }

    /// Returns true when the newest outcomes' success flags equal `pattern`,
    /// oldest first.
    ///
    /// Only `pattern.len()` entries are read, so this is constant time for the
    /// short patterns the limiter checks.
    pub fn ends_with(&self, pattern: &[Option<bool>]) -> bool {
        self.window.len() >= pattern.len()
            && self
                .window
                .iter()
                .rev()
                .zip(pattern.iter().rev())
                .all(|(outcome, expected)| outcome.success == *expected)
    }

    /// Iterate over the retained outcomes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.window.iter()
    }

    /// Number of retained outcomes.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns true if nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
