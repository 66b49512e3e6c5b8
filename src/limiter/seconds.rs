//! Whole-second span arithmetic for the interval search.

use std::ops::Neg;
use std::time::Duration;

use chrono::TimeDelta;

/// Magnitude past which the geometric step stops doubling.
///
/// Keeps `interval + step` and its rounding comfortably inside `i64`.
const STEP_GROWTH_LIMIT: i64 = i64::MAX / 4;

/// A signed span of whole seconds.
///
/// Every operation saturates instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Seconds(i64);

impl Seconds {
    pub(crate) const ZERO: Seconds = Seconds(0);

    pub(crate) const fn new(secs: i64) -> Self {
        Self(secs)
    }

    pub(crate) const fn get(self) -> i64 {
        self.0
    }

    /// Whole seconds of `duration`, discarding the fractional part.
    pub(crate) fn from_duration(duration: Duration) -> Self {
        Self(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
    }

    /// Whole seconds of `duration`, counting a fractional second as a full one.
    pub(crate) fn from_duration_ceil(duration: Duration) -> Self {
        let partial = Self(i64::from(duration.subsec_nanos() > 0));
        Self::from_duration(duration).saturating_add(partial)
    }

    /// Whole seconds of `delta`, truncated toward zero.
    pub(crate) fn from_time_delta(delta: TimeDelta) -> Self {
        Self(delta.num_seconds())
    }

    /// Negative spans become zero.
    pub(crate) fn to_duration(self) -> Duration {
        Duration::from_secs(self.0.max(0).unsigned_abs())
    }

    pub(crate) fn saturating_add(self, rhs: Seconds) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub(crate) fn saturating_sub(self, rhs: Seconds) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub(crate) fn saturating_mul(self, factor: i64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Double the span unless it has reached the growth limit.
    pub(crate) fn grow(self) -> Self {
        if self.0.unsigned_abs() < STEP_GROWTH_LIMIT.unsigned_abs() {
            Self(self.0 * 2)
        } else {
            self
        }
    }

    /// Half of the span, rounding ties to the even neighbour.
    pub(crate) fn half(self) -> Self {
        let half = self.0 / 2;
        if self.0 % 2 != 0 && half % 2 != 0 {
            Self(half + self.0.signum())
        } else {
            Self(half)
        }
    }

    /// Round up to the next multiple of `granularity`.
    ///
    /// Zero rounds up to `granularity` itself. If the next multiple does not
    /// fit, the previous one is returned. `granularity` must be positive.
    pub(crate) fn round_up_to(self, granularity: Seconds) -> Self {
        let remainder = self.0.rem_euclid(granularity.0);
        let floor = self.0 - remainder;
        if remainder > 0 || floor == 0 {
            floor
                .checked_add(granularity.0)
                .map_or(Self(floor), Self)
        } else {
            Self(floor)
        }
    }
}

impl Neg for Seconds {
    type Output = Seconds;

    fn neg(self) -> Seconds {
        Seconds(self.0.saturating_neg())
    }
}
