//! Testing utilities for code built on cadence
//!
//! This module drives an [`AdaptiveLimiter`] against a synthetic source, with
//! simulated time, so the limiter's behaviour can be checked without waiting.
//!
//! - [`IntervalEmulator`]: the source succeeds whenever the recommended
//!   interval is at least an "optimal" interval
//! - [`ScheduleEmulator`]: the source publishes at a given date and the caller
//!   polls whenever the limiter's delay runs out
//!
//! # Examples
//!
//! ```rust
//! use cadence::testing::IntervalEmulator;
//! use cadence::AdaptiveLimiter;
//! use std::time::Duration;
//!
//! let mut env = IntervalEmulator::new(AdaptiveLimiter::default());
//! let attempts = env.emulate_until_success(Duration::from_secs(121)).unwrap();
//!
//! // 1, 1, 2, 4, ..., 64 fail; 128 succeeds.
//! assert_eq!(attempts, 9);
//! assert_eq!(env.limiter().success_interval(), Some(Duration::from_secs(128)));
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::error::LimiterError;
use crate::limiter::AdaptiveLimiter;

/// Attempts an emulator makes before giving up on a target.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Errors raised while emulating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmulationError {
    /// The limiter rejected a report.
    #[error(transparent)]
    Limiter(#[from] LimiterError),
    /// The target was not reached within the attempt budget.
    #[error("emulation appears to have an infinite loop ({attempts} attempts)")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// Simulated time left the representable range.
    #[error("simulated clock overflowed")]
    ClockOverflow,
}

fn advance(now: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>, EmulationError> {
    let by = TimeDelta::from_std(by).map_err(|_| EmulationError::ClockOverflow)?;
    now.checked_add_signed(by).ok_or(EmulationError::ClockOverflow)
}

fn unix_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Emulates a caller that always waits exactly the recommended interval.
#[derive(Debug, Clone)]
pub struct IntervalEmulator {
    limiter: AdaptiveLimiter,
    now: DateTime<Utc>,
    max_attempts: u32,
}

impl IntervalEmulator {
    /// Start emulating at the Unix epoch.
    pub fn new(limiter: AdaptiveLimiter) -> Self {
        Self::starting_at(limiter, unix_epoch())
    }

    /// Start emulating at `now`.
    pub fn starting_at(limiter: AdaptiveLimiter, now: DateTime<Utc>) -> Self {
        Self {
            limiter,
            now,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Change the attempt budget of [`emulate_until_success`](Self::emulate_until_success).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The emulated limiter.
    pub fn limiter(&self) -> &AdaptiveLimiter {
        &self.limiter
    }

    /// The simulated current time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Give back the limiter.
    pub fn into_inner(self) -> AdaptiveLimiter {
        self.limiter
    }

    /// Wait one interval and report whether it was at least `optimal`.
    ///
    /// With no `optimal` the outcome is reported as unknown.
    pub fn emulate(&mut self, optimal: Option<Duration>) -> Result<Option<bool>, EmulationError> {
        let interval = self.limiter.interval();
        self.now = advance(self.now, interval)?;

        let success = optimal.map(|optimal| interval >= optimal);
        self.limiter.status(success, self.now)?;
        Ok(success)
    }

    /// Emulate until an attempt succeeds, returning the number of attempts.
    pub fn emulate_until_success(&mut self, optimal: Duration) -> Result<u32, EmulationError> {
        for attempts in 1..=self.max_attempts {
            if self.emulate(Some(optimal))? == Some(true) {
                return Ok(attempts);
            }
        }
        Err(EmulationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Emulates polling a source that publishes at fixed dates.
///
/// Each attempt first sleeps out the limiter's delay, then succeeds if the
/// simulated clock has reached the target date.
#[derive(Debug, Clone)]
pub struct ScheduleEmulator {
    limiter: AdaptiveLimiter,
    now: DateTime<Utc>,
    max_attempts: u32,
}

impl ScheduleEmulator {
    /// Start emulating at `now`.
    pub fn new(limiter: AdaptiveLimiter, now: DateTime<Utc>) -> Self {
        Self {
            limiter,
            now,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Change the attempt budget of [`emulate_until_success`](Self::emulate_until_success).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The emulated limiter.
    pub fn limiter(&self) -> &AdaptiveLimiter {
        &self.limiter
    }

    /// The simulated current time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Give back the limiter.
    pub fn into_inner(self) -> AdaptiveLimiter {
        self.limiter
    }

    /// Sleep out the delay and poll for `target`.
    ///
    /// With no target the outcome is reported as unknown.
    pub fn emulate(
        &mut self,
        target: Option<DateTime<Utc>>,
    ) -> Result<Option<bool>, EmulationError> {
        let delay = self.limiter.delay(self.now)?;
        self.now = advance(self.now, delay)?;

        let success = target.map(|target| self.now >= target);
        self.limiter.status(success, self.now)?;
        Ok(success)
    }

    /// Poll until `target` is seen, returning the number of attempts.
    pub fn emulate_until_success(&mut self, target: DateTime<Utc>) -> Result<u32, EmulationError> {
        tracing::debug!(%target, "emulating until target date");
        for attempts in 1..=self.max_attempts {
            if self.emulate(Some(target))? == Some(true) {
                return Ok(attempts);
            }
        }
        Err(EmulationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
