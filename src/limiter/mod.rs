//! Polling limiters.
//!
//! This module provides the two pacing strategies of the crate:
//!
//! - [`AdaptiveLimiter`]: learns the shortest wait after which a repeated
//!   attempt succeeds, from nothing but success/failure feedback
//! - [`StaticLimiter`]: enforces a fixed spacing and ignores feedback
//!
//! Both implement [`Throttle`], so a polling loop can take either.
//!
//! # Quick Start
//!
//! ```rust
//! use cadence::{AdaptiveLimiter, LimiterConfig};
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use std::time::Duration;
//!
//! let mut limiter = LimiterConfig::new()
//!     .with_min_interval(Duration::from_secs(60))
//!     .since_success(true)
//!     .build()
//!     .unwrap();
//!
//! let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
//! limiter.status(Some(true), start).unwrap();
//!
//! // Ten seconds later the caller still has to wait out the minute.
//! let now = start + TimeDelta::seconds(10);
//! assert_eq!(limiter.delay(now).unwrap(), Duration::from_secs(50));
//! ```
//!
//! # How the search works
//!
//! - **Geometric**: while only one side is known, the step doubles on every
//!   report that waited out the full interval (1, 2, 4, 8, ...)
//! - **Binary**: once a failing and a succeeding wait are known, the next
//!   interval is their midpoint
//! - **Reset**: when the bounds meet, the side just confirmed is reopened so
//!   the limiter can follow a drifting schedule
//! - **Stable**: after success, failure, success the limiter returns to the
//!   captured interval after each miss
//!
//! Every decision is returned as a [`StatusReport`] and emitted as a
//! `tracing` event.

mod adaptive;
mod config;
mod fixed;
mod report;
mod seconds;
mod throttle;

pub use adaptive::AdaptiveLimiter;
pub use config::LimiterConfig;
pub use fixed::StaticLimiter;
pub use report::{LimiterSnapshot, SearchKind, StatusReport};
pub use throttle::Throttle;

#[cfg(test)]
mod tests;
