//! The adaptive interval-discovery limiter.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use super::config::LimiterConfig;
use super::report::{LimiterSnapshot, SearchKind, StatusReport};
use super::seconds::Seconds;
use crate::error::LimiterError;
use crate::history::{Outcome, StatusHistory};

/// Outcomes retained outside debug mode. The stability checks read at most
/// this many.
const HISTORY_LIMIT: usize = 3;

const FAIL_FAIL: [Option<bool>; 2] = [Some(false), Some(false)];
const FAIL_PASS: [Option<bool>; 2] = [Some(false), Some(true)];
const PASS_FAIL_PASS: [Option<bool>; 3] = [Some(true), Some(false), Some(true)];

/// Learns the shortest wait after which a repeated attempt succeeds.
///
/// Feed every attempt's outcome to [`status`](Self::status) and ask
/// [`delay`](Self::delay) how long to wait before the next one. The limiter
/// starts with a geometric search (doubling its step on each failure), then
/// bisects between the largest wait known to fail and the smallest wait known
/// to succeed. Once it sees success, failure, success it considers itself
/// stable around the optimum and snaps back to the captured interval after
/// each miss.
///
/// All waits are measured in whole seconds and every recommended interval is
/// a positive multiple of the minimum interval.
///
/// # Examples
///
/// ```rust
/// use cadence::AdaptiveLimiter;
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use std::time::Duration;
///
/// let mut limiter = AdaptiveLimiter::default();
/// let mut now = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
///
/// // A source which only has something new every 5 seconds.
/// for _ in 0..6 {
///     now += TimeDelta::from_std(limiter.interval()).unwrap();
///     let success = limiter.interval() >= Duration::from_secs(5);
///     limiter.status(Some(success), now).unwrap();
/// }
///
/// assert!(limiter.min_success_delta().is_some());
/// assert!(limiter.max_failure_delta().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveLimiter {
    interval: Seconds,
    min_interval: Seconds,
    since_success: bool,
    debug: bool,
    history: StatusHistory,
    min_success_delta: Option<Seconds>,
    max_failure_delta: Option<Seconds>,
    success_interval: Option<Seconds>,
    failure_interval: Option<Seconds>,
    stable: bool,
    stable_interval: Option<Seconds>,
    fine_tuning: bool,
    adjustment: Seconds,
}

impl Default for AdaptiveLimiter {
    fn default() -> Self {
        let min_interval = Seconds::new(1);
        Self::with_parts(Seconds::ZERO, min_interval, false, false)
    }
}

impl AdaptiveLimiter {
    /// Create a limiter.
    ///
    /// `min_interval` must be a positive whole number of seconds.
    /// `initial_interval` is rounded up to a multiple of it.
    pub fn new(
        initial_interval: Duration,
        min_interval: Duration,
        since_success: bool,
        debug: bool,
    ) -> Result<Self, LimiterError> {
        LimiterConfig::new()
            .with_initial_interval(initial_interval)
            .with_min_interval(min_interval)
            .since_success(since_success)
            .debug(debug)
            .build()
    }

    /// Create a limiter from a validated configuration.
    pub fn from_config(config: LimiterConfig) -> Result<Self, LimiterError> {
        config.validate()?;
        Ok(Self::with_parts(
            Seconds::from_duration_ceil(config.initial_interval()),
            Seconds::from_duration(config.min_interval()),
            config.is_since_success(),
            config.is_debug(),
        ))
    }

    fn with_parts(initial: Seconds, min_interval: Seconds, since_success: bool, debug: bool) -> Self {
        let history = if debug {
            StatusHistory::new()
        } else {
            StatusHistory::with_limit(HISTORY_LIMIT)
        };

        Self {
            interval: initial.max(Seconds::ZERO).round_up_to(min_interval),
            min_interval,
            since_success,
            debug,
            history,
            min_success_delta: None,
            max_failure_delta: None,
            success_interval: None,
            failure_interval: None,
            stable: false,
            stable_interval: None,
            fine_tuning: false,
            adjustment: Seconds::ZERO,
        }
    }

    /// The recommended wait between attempts.
    pub fn interval(&self) -> Duration {
        self.interval.to_duration()
    }

    /// The interval floor and rounding granularity.
    pub fn min_interval(&self) -> Duration {
        self.min_interval.to_duration()
    }

    /// Whether the search has settled around the optimum.
    pub fn stable(&self) -> bool {
        self.stable
    }

    /// Whether geometric step growth is currently suppressed.
    pub fn fine_tuning(&self) -> bool {
        self.fine_tuning
    }

    /// Whether elapsed time is measured from the last success.
    pub fn since_success(&self) -> bool {
        self.since_success
    }

    /// Smallest elapsed time at which an attempt succeeded.
    pub fn min_success_delta(&self) -> Option<Duration> {
        self.min_success_delta.map(Seconds::to_duration)
    }

    /// Largest elapsed time at which an attempt failed.
    pub fn max_failure_delta(&self) -> Option<Duration> {
        self.max_failure_delta.map(Seconds::to_duration)
    }

    /// The last value that tightened the success bound.
    ///
    /// Unlike [`min_success_delta`](Self::min_success_delta) this survives
    /// the bound being discarded.
    pub fn success_interval(&self) -> Option<Duration> {
        self.success_interval.map(Seconds::to_duration)
    }

    /// The last value that widened the failure bound.
    pub fn failure_interval(&self) -> Option<Duration> {
        self.failure_interval.map(Seconds::to_duration)
    }

    /// Reported outcomes still held by the limiter.
    pub fn history(&self) -> &StatusHistory {
        &self.history
    }

    /// Capture the discovered schedule.
    pub fn snapshot(&self) -> LimiterSnapshot {
        LimiterSnapshot {
            interval: self.interval(),
            min_interval: self.min_interval(),
            min_success_delta: self.min_success_delta(),
            max_failure_delta: self.max_failure_delta(),
            stable: self.stable,
            fine_tuning: self.fine_tuning,
            last_reported: self.history.last_reported(None),
        }
    }

    /// Time elapsed since the reference report, in whole seconds.
    ///
    /// The reference is the last success when measuring since success, the
    /// last report otherwise. Returns `None` without a reference.
    pub fn waited(&self, now: DateTime<Utc>) -> Result<Option<Duration>, LimiterError> {
        Ok(self.elapsed(now)?.map(Seconds::to_duration))
    }

    /// How long to wait at `now` before the next attempt.
    ///
    /// Zero before the first report or once the interval has passed.
    pub fn delay(&self, now: DateTime<Utc>) -> Result<Duration, LimiterError> {
        let delay = match self.elapsed(now)? {
            Some(waited) => self.interval.saturating_sub(waited),
            None => Seconds::ZERO,
        };
        Ok(delay.to_duration())
    }

    /// [`delay`](Self::delay) at the current time.
    pub fn delay_now(&self) -> Result<Duration, LimiterError> {
        self.delay(Utc::now())
    }

    /// Block the calling thread until the next attempt is due.
    ///
    /// Returns the time slept.
    pub fn throttle(&self, now: DateTime<Utc>) -> Result<Duration, LimiterError> {
        let delay = self.delay(now)?;
        if !delay.is_zero() {
            tracing::info!("Sleeping for {} seconds.", delay.as_secs());
            std::thread::sleep(delay);
        }
        Ok(delay)
    }

    /// [`throttle`](Self::throttle) at the current time.
    pub fn throttle_now(&self) -> Result<Duration, LimiterError> {
        self.throttle(Utc::now())
    }

    /// Wait asynchronously until the next attempt is due.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cadence::AdaptiveLimiter;
    /// use chrono::Utc;
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let mut limiter = AdaptiveLimiter::default();
    /// let now = Utc::now();
    /// limiter.status(Some(true), now).unwrap();
    ///
    /// // A second has already passed by the time we ask.
    /// let later = now + chrono::TimeDelta::seconds(1);
    /// assert_eq!(limiter.throttle_async(later).await.unwrap(), Duration::ZERO);
    /// # });
    /// ```
    #[cfg(feature = "async")]
    pub async fn throttle_async(&self, now: DateTime<Utc>) -> Result<Duration, LimiterError> {
        let delay = self.delay(now)?;
        if !delay.is_zero() {
            tracing::info!("Sleeping for {} seconds.", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
        Ok(delay)
    }

    /// [`status`](Self::status) at the current time.
    pub fn status_now(&mut self, success: Option<bool>) -> Result<StatusReport, LimiterError> {
        self.status(success, Utc::now())
    }

    /// Report the outcome of an attempt and update the recommended interval.
    ///
    /// `success` is `None` when the outcome is unknown; for the search it
    /// counts as a miss. Fails without changing anything if `reported_at`
    /// precedes an earlier report.
    pub fn status(
        &mut self,
        success: Option<bool>,
        reported_at: DateTime<Utc>,
    ) -> Result<StatusReport, LimiterError> {
        // Measured against the history as it was before this report.
        let delta = self.elapsed(reported_at)?;
        self.history.add(Outcome::new(reported_at, success))?;

        let succeeded = success == Some(true);
        if let Some(delta) = delta {
            if succeeded {
                self.tighten_success_bound(delta);
            } else {
                self.widen_failure_bound(delta);
            }
        }

        let attempted = self.interval;
        let mut search = None;
        let mut next = None;

        if self.history.ends_with(&FAIL_FAIL) {
            self.stable = false;
        }

        // A wait twice the stable interval means the schedule has moved.
        if let (Some(delta), Some(stable_interval)) = (delta, self.stable_interval) {
            if delta >= stable_interval.saturating_mul(2) {
                self.fine_tuning = false;
            }
        }

        if succeeded && self.stable && self.history.ends_with(&FAIL_PASS) {
            self.stable_interval = Some(attempted);
        } else if succeeded && !self.stable && self.stable_interval.is_some() {
            next = self.stable_interval.take();
            search = Some(SearchKind::Stable);
        }

        if self.history.ends_with(&PASS_FAIL_PASS) {
            self.stable = true;
        }

        if next.is_none() {
            if let (Some(high), Some(low)) = (self.min_success_delta, self.max_failure_delta) {
                self.adjustment = Seconds::ZERO;

                let gap = high.saturating_sub(low);
                if gap > self.min_interval {
                    next = Some(low.saturating_add(gap.half()));
                    search = Some(SearchKind::Binary);
                } else {
                    // The bounds met; reopen the side that just got confirmed.
                    if succeeded {
                        self.max_failure_delta = None;
                        self.fine_tuning = true;
                    } else {
                        self.min_success_delta = None;
                    }
                    search = Some(SearchKind::Reset);
                }
            }
        }

        let next = match next {
            Some(next) => next,
            None => {
                let (next, kind) = self.geometric_step(delta, attempted);
                search = Some(kind);
                next
            }
        };

        self.interval = next.max(self.min_interval).round_up_to(self.min_interval);
        if next < self.min_interval {
            // Keep the step in line with what was actually applied.
            self.adjustment = attempted.saturating_sub(self.interval);
        }

        let report = StatusReport {
            reported_at,
            success,
            delta: delta.map(Seconds::to_duration),
            attempted_interval: attempted.to_duration(),
            max_failure_delta: self.max_failure_delta(),
            min_success_delta: self.min_success_delta(),
            interval: self.interval(),
            search: search.unwrap_or(SearchKind::Persist),
            adjustment: self.adjustment.get(),
            stable: self.stable,
            fine_tuning: self.fine_tuning,
        };
        self.emit(&report);

        Ok(report)
    }

    fn elapsed(&self, now: DateTime<Utc>) -> Result<Option<Seconds>, LimiterError> {
        let reference = if self.since_success {
            self.history.last_reported(Some(true))
        } else {
            self.history.last_reported(None)
        };
        let Some(reference) = reference else {
            return Ok(None);
        };

        let elapsed = now.signed_duration_since(reference);
        if elapsed < TimeDelta::zero() {
            return Err(LimiterError::ClockWentBackwards { reference, now });
        }
        Ok(Some(Seconds::from_time_delta(elapsed)))
    }

    fn tighten_success_bound(&mut self, delta: Seconds) {
        if self.min_success_delta.is_none_or(|bound| delta < bound) {
            self.min_success_delta = Some(delta);
            self.success_interval = Some(delta);
        }
    }

    fn widen_failure_bound(&mut self, delta: Seconds) {
        if self.max_failure_delta.is_none_or(|bound| delta > bound) {
            self.max_failure_delta = Some(delta);
            self.failure_interval = Some(delta);
        }
    }

    /// Pick the next step of the bootstrap search and the interval it leads to.
    fn geometric_step(&mut self, delta: Option<Seconds>, attempted: Seconds) -> (Seconds, SearchKind) {
        // A zero-length bound says nothing about the direction to search in.
        let failed_before = self.max_failure_delta.is_some_and(|d| d > Seconds::ZERO);
        let succeeded_before = self.min_success_delta.is_some_and(|d| d > Seconds::ZERO);

        let mut step = self.adjustment;
        if failed_before && step <= Seconds::ZERO {
            step = self.min_interval;
        } else if succeeded_before && step >= Seconds::ZERO {
            step = -self.min_interval;
        } else if !self.fine_tuning {
            step = step.grow();
        }

        match delta {
            // Only a caller that waited out the interval tells us anything new.
            Some(delta) if delta >= attempted => {
                self.adjustment = step;
                (attempted.saturating_add(step), SearchKind::Geometric)
            }
            _ => (attempted, SearchKind::Persist),
        }
    }

    fn emit(&self, report: &StatusReport) {
        macro_rules! diagnostic {
            ($level:ident) => {
                tracing::$level!(
                    reported_at = %report.reported_at,
                    delta = ?report.delta.map(|d| d.as_secs()),
                    attempted_interval = report.attempted_interval.as_secs(),
                    failure_interval = ?report.max_failure_delta.map(|d| d.as_secs()),
                    success_interval = ?report.min_success_delta.map(|d| d.as_secs()),
                    next_interval = report.interval.as_secs(),
                    success = ?report.success,
                    search = %report.search,
                    adjustment = report.adjustment,
                    stable = report.stable,
                    tune = report.fine_tuning,
                    "status reported"
                )
            };
        }

        if self.debug {
            diagnostic!(debug);
        } else {
            diagnostic!(trace);
        }
    }
}
