//! Scenario tests for the adaptive search.

use super::*;
use crate::testing::{IntervalEmulator, ScheduleEmulator};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::time::Duration;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn limiter(initial: u64) -> AdaptiveLimiter {
    AdaptiveLimiter::new(secs(initial), secs(1), false, false).unwrap()
}

fn discovering(initial: u64, min_interval: u64) -> AdaptiveLimiter {
    AdaptiveLimiter::new(secs(initial), secs(min_interval), true, false).unwrap()
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, day, hour, minute, 0).unwrap()
}

/// Poll each target date in turn, checking the attempts it took and that the
/// publication was never missed by a whole period.
fn run_schedule(env: &mut ScheduleEmulator, targets: &[(DateTime<Utc>, u32)], check_stable: bool) {
    let period = TimeDelta::hours(1);

    for &(target, expected) in targets {
        let attempts = env.emulate_until_success(target).unwrap();
        assert_eq!(attempts, expected, "attempts for target {target}");

        assert!(env.now() >= target);
        assert!(env.now() - target < period, "missed target {target}");

        if check_stable && env.limiter().stable() {
            assert_eq!(attempts, 2, "stable limiter for target {target}");
            assert_eq!(env.now(), target);
        }
    }
}

#[test]
fn test_basic() {
    let mut env = IntervalEmulator::new(limiter(1));
    assert_eq!(env.limiter().interval(), secs(1));

    // Find the first successful interval.
    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 9);
    assert_eq!(env.limiter().success_interval(), Some(secs(128)));

    // Bisect towards the optimum.
    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 4);
    assert_eq!(env.limiter().success_interval(), Some(secs(124)));

    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 1);
    assert_eq!(env.limiter().success_interval(), Some(secs(122)));

    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 1);
    assert_eq!(env.limiter().success_interval(), Some(secs(121)));

    // One more round to make sure the search does not loop.
    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 2);
    assert_eq!(env.limiter().success_interval(), Some(secs(121)));
}

#[test]
fn test_realistic() {
    let mut env = IntervalEmulator::new(limiter(1));

    // The first request always works since nothing was requested before.
    assert_eq!(env.emulate_until_success(secs(0)).unwrap(), 1);
    assert_eq!(env.limiter().success_interval(), None);

    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 8);
    assert_eq!(env.limiter().success_interval(), Some(secs(128)));

    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 4);
    assert_eq!(env.limiter().success_interval(), Some(secs(124)));

    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 1);
    assert_eq!(env.limiter().success_interval(), Some(secs(122)));

    assert_eq!(env.emulate_until_success(secs(121)).unwrap(), 1);
    assert_eq!(env.limiter().success_interval(), Some(secs(121)));
}

#[test]
fn test_fluctuating_honing() {
    let mut env = IntervalEmulator::new(limiter(1));

    let steps = [
        (7, 1),
        (7, 2),
        (7, 4),
        (7, 8),
        (7, 6),
        // The optimum moves while honing in.
        (9, 7),
        (9, 8),
        (9, 10),
        (9, 9),
        (9, 8),
    ];
    for (optimal, expected) in steps {
        env.emulate(Some(secs(optimal))).unwrap();
        assert_eq!(env.limiter().interval(), secs(expected));
    }
}

#[test]
fn test_fluctuating() {
    let mut env = IntervalEmulator::new(limiter(1));

    env.emulate_until_success(secs(121)).unwrap();
    assert_eq!(env.limiter().success_interval(), Some(secs(128)));

    // Just past the last successful interval.
    env.emulate_until_success(secs(129)).unwrap();
    assert_eq!(env.limiter().success_interval(), Some(secs(130)));

    // Much earlier: should work on the first attempt.
    assert_eq!(env.emulate_until_success(secs(33)).unwrap(), 1);
    assert_eq!(env.limiter().success_interval(), Some(secs(129)));
}

#[test]
fn test_decreasing() {
    let mut env = IntervalEmulator::new(limiter(8));
    assert_eq!(env.limiter().interval(), secs(8));

    for expected in [8, 7, 5, 1, 3] {
        env.emulate(Some(secs(3))).unwrap();
        assert_eq!(env.limiter().interval(), secs(expected));
    }
}

#[test]
fn test_binary_search_after_geometric_bootstrap() {
    let mut env = IntervalEmulator::new(limiter(1));

    let mut intervals = vec![];
    while env.emulate(Some(secs(121))).unwrap() != Some(true) {
        intervals.push(env.limiter().interval().as_secs());
    }
    assert_eq!(intervals, vec![1, 2, 4, 8, 16, 32, 64, 128]);

    let mut calls = 0;
    while env.limiter().interval() != secs(121) {
        env.emulate(Some(secs(121))).unwrap();
        calls += 1;
        assert!(calls <= 5, "no convergence after {calls} calls");
    }
}

#[test]
fn test_discovery() {
    // Requires the binary search, otherwise a target is skipped.
    let mut env = ScheduleEmulator::new(discovering(0, 600), at(1, 1, 0));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 2),
        (at(1, 2, 20), 6),
        (at(1, 3, 20), 2),
        (at(1, 4, 20), 2),
        (at(1, 5, 20), 2),
        (at(1, 6, 20), 2),
        (at(1, 7, 20), 2),
        (at(1, 8, 20), 2),
        (at(1, 9, 20), 2),
        (at(1, 10, 20), 2),
    ];
    run_schedule(&mut env, &targets, true);
}

#[test]
fn test_discovery_minutes() {
    let mut env = ScheduleEmulator::new(discovering(0, 60), at(1, 1, 0));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 6),
        (at(1, 2, 20), 9),
        (at(1, 3, 20), 1),
        (at(1, 4, 20), 2),
        (at(1, 5, 20), 5),
        (at(1, 6, 20), 1),
        (at(1, 7, 20), 1),
        (at(1, 8, 20), 1),
        (at(1, 9, 20), 1),
        (at(1, 10, 20), 1),
        (at(1, 11, 20), 3),
        (at(1, 12, 20), 4),
        (at(1, 13, 20), 2),
        (at(1, 14, 20), 2),
        (at(1, 15, 20), 2),
        (at(1, 16, 20), 2),
        (at(1, 17, 20), 2),
    ];
    run_schedule(&mut env, &targets, true);
}

#[test]
fn test_discovery_seconds() {
    let mut env = ScheduleEmulator::new(discovering(0, 1), at(1, 1, 0));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 12),
        (at(1, 2, 20), 20),
        (at(1, 3, 20), 17),
        (at(1, 4, 20), 15),
        (at(1, 5, 20), 9),
        (at(1, 6, 20), 6),
        (at(1, 7, 20), 1),
        (at(1, 8, 20), 1),
        (at(1, 9, 20), 1),
        (at(1, 10, 20), 1),
        (at(1, 11, 20), 6),
        (at(1, 12, 20), 3),
        (at(1, 13, 20), 2),
        (at(1, 14, 20), 2),
        (at(1, 15, 20), 2),
        (at(1, 16, 20), 2),
        (at(1, 17, 20), 2),
        (at(1, 18, 20), 2),
        (at(1, 19, 20), 2),
        (at(1, 20, 20), 2),
    ];
    run_schedule(&mut env, &targets, true);
}

#[test]
fn test_discovery_7_minutes() {
    // A period that is not a multiple of the minimum interval.
    let mut env = ScheduleEmulator::new(discovering(0, 7 * 60), at(1, 1, 0));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 3),
        (at(1, 2, 20), 4),
        (at(1, 3, 20), 1),
        (at(1, 4, 20), 1),
        (at(1, 5, 20), 4),
        (at(1, 6, 20), 1),
        (at(1, 7, 20), 3),
        (at(1, 8, 20), 1),
        (at(1, 9, 20), 3),
        (at(1, 10, 20), 1),
        (at(1, 11, 20), 3),
        (at(1, 12, 20), 2),
        (at(1, 13, 20), 1),
        (at(1, 14, 20), 3),
        (at(1, 15, 20), 1),
        (at(1, 16, 20), 3),
        (at(1, 17, 20), 1),
        (at(1, 18, 20), 3),
        (at(1, 19, 20), 2),
        (at(1, 20, 20), 1),
        (at(1, 21, 20), 3),
        (at(1, 22, 20), 1),
        (at(1, 23, 20), 3),
        (at(2, 0, 20), 1),
        (at(2, 1, 20), 3),
    ];
    run_schedule(&mut env, &targets, false);
}

#[test]
fn test_shift_earlier() {
    let mut env = ScheduleEmulator::new(discovering(3600, 600), at(1, 0, 20));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 1),
        (at(1, 2, 20), 2),
        (at(1, 3, 20), 2),
        // Publication moves 30 minutes earlier.
        (at(1, 3, 50), 1),
        (at(1, 4, 50), 1),
        (at(1, 5, 50), 4),
        (at(1, 6, 50), 1),
        (at(1, 7, 50), 2),
        (at(1, 8, 50), 2),
    ];
    run_schedule(&mut env, &targets, false);
}

#[test]
fn test_shift_later() {
    let mut env = ScheduleEmulator::new(discovering(3600, 600), at(1, 0, 20));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 1),
        (at(1, 2, 20), 2),
        (at(1, 3, 20), 2),
        // Publication moves 30 minutes later.
        (at(1, 4, 50), 5),
        (at(1, 5, 50), 1),
        (at(1, 6, 50), 2),
        (at(1, 7, 50), 2),
        (at(1, 8, 50), 2),
        (at(1, 9, 50), 2),
        (at(1, 10, 50), 2),
        (at(1, 11, 50), 2),
        (at(1, 12, 50), 2),
        (at(1, 13, 50), 2),
        (at(1, 14, 50), 2),
        (at(1, 15, 50), 2),
    ];
    run_schedule(&mut env, &targets, false);
}

#[test]
fn test_late() {
    let mut env = ScheduleEmulator::new(discovering(3600, 600), at(1, 0, 20));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 1),
        (at(1, 2, 20), 2),
        (at(1, 3, 20), 2),
        // One publication comes five minutes late.
        (at(1, 4, 25), 3),
        (at(1, 5, 20), 1),
        (at(1, 6, 20), 1),
        (at(1, 7, 20), 3),
        (at(1, 8, 20), 2),
        (at(1, 9, 20), 2),
    ];
    run_schedule(&mut env, &targets, false);
}

#[test]
fn test_skip() {
    let mut env = ScheduleEmulator::new(discovering(3600, 600), at(1, 0, 20));

    let targets = [
        (at(1, 0, 20), 1),
        (at(1, 1, 20), 1),
        (at(1, 2, 20), 2),
        (at(1, 3, 20), 2),
        // Nothing is published at 4:20.
        (at(1, 5, 20), 8),
        (at(1, 6, 20), 1),
        (at(1, 7, 20), 2),
        (at(1, 8, 20), 2),
    ];
    run_schedule(&mut env, &targets, false);
}

#[test]
fn test_schedule_shift_never_errors() {
    let mut env = ScheduleEmulator::new(discovering(3600, 600), at(1, 0, 20));

    for hour in 0..6 {
        env.emulate_until_success(at(1, hour, 20)).unwrap();
    }
    let settled = env.limiter().interval();

    assert_eq!(settled, secs(3000));
    assert!(env.limiter().stable());

    // Shift by thirty minutes and keep polling hourly.
    let mut failures = 0;
    for hour in 6..14 {
        let attempts = env.emulate_until_success(at(1, hour, 50)).unwrap();
        failures += attempts - 1;
    }

    assert!(failures >= 1);
    assert!(env.limiter().stable());
    assert_eq!(env.limiter().interval(), settled);
}
