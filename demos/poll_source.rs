//! Polling Example
//!
//! Shows an adaptive limiter discovering how often a source updates.
//! Everything runs against simulated time, so nothing actually sleeps:
//! - Discovering a fixed refresh interval
//! - Following an hourly release schedule, measured since the last success
//! - Watching the limiter's decisions through tracing
//!
//! Run with: cargo run --example poll_source

use std::time::Duration;

use cadence::testing::{IntervalEmulator, ScheduleEmulator};
use cadence::{AdaptiveLimiter, LimiterConfig, StatusReport};
use chrono::{DateTime, TimeZone, Utc};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, hour, minute, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn print_report(report: &StatusReport) {
    let outcome = match report.success {
        Some(true) => "hit",
        Some(false) => "miss",
        None => "unknown",
    };
    println!(
        "  {} {:>7} waited {:>5}s -> next {:>5}s ({})",
        report.reported_at.format("%H:%M:%S"),
        outcome,
        report.delta.map_or(0, |d| d.as_secs()),
        report.interval.as_secs(),
        report.search,
    );
}

// ==================== Fixed refresh ====================

/// Example 1: A feed that refreshes every seven minutes.
fn example_refresh_interval() {
    println!("\n=== Example 1: Refresh Interval ===");

    let optimal = Duration::from_secs(7 * 60);
    let mut env = IntervalEmulator::new(AdaptiveLimiter::default());

    for round in 1..=5 {
        match env.emulate_until_success(optimal) {
            Ok(attempts) => println!(
                "  round {}: {} attempts, interval now {}s",
                round,
                attempts,
                env.limiter().interval().as_secs()
            ),
            Err(e) => {
                println!("  round {}: {}", round, e);
                return;
            }
        }
    }
}

// ==================== Release schedule ====================

/// Example 2: Data published at ten past every hour.
fn example_release_schedule() {
    println!("\n=== Example 2: Release Schedule ===");

    let limiter = match LimiterConfig::new()
        .with_min_interval(Duration::from_secs(60))
        .since_success(true)
        .build()
    {
        Ok(limiter) => limiter,
        Err(e) => {
            println!("  invalid configuration: {}", e);
            return;
        }
    };

    let mut env = ScheduleEmulator::new(limiter, at(0, 10));
    for hour in 0..8 {
        if let Err(e) = env.emulate_until_success(at(hour, 10)) {
            println!("  {}", e);
            return;
        }
        let snapshot = env.limiter().snapshot();
        println!(
            "  {:02}:10 found at {}, interval {}s, stable: {}",
            hour,
            env.now().format("%H:%M"),
            snapshot.interval.as_secs(),
            snapshot.stable
        );
    }
}

// ==================== Decisions ====================

/// Example 3: Reading each decision from the returned reports.
fn example_reports() {
    println!("\n=== Example 3: Status Reports ===");

    let mut limiter = match AdaptiveLimiter::new(Duration::ZERO, Duration::from_secs(30), false, true)
    {
        Ok(limiter) => limiter,
        Err(e) => {
            println!("  invalid configuration: {}", e);
            return;
        }
    };

    let mut now = at(12, 0);
    for _ in 0..12 {
        now += chrono::TimeDelta::seconds(limiter.interval().as_secs() as i64);
        let found = limiter.interval() >= Duration::from_secs(200);
        match limiter.status(Some(found), now) {
            Ok(report) => print_report(&report),
            Err(e) => {
                println!("  {}", e);
                return;
            }
        }
    }
}

fn main() {
    // The limiter in example 3 runs in debug mode and logs every decision.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Cadence Polling Examples");
    println!("========================");

    example_refresh_interval();
    example_release_schedule();
    example_reports();

    println!("\n=== All examples completed ===");
}
