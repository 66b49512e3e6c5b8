//! # Cadence
//!
//! Pacing for repeated polling of a source whose update schedule is unknown.
//!
//! A caller that keeps asking "is there anything new yet?" wants to ask as
//! rarely as possible while still noticing new data quickly. Cadence learns
//! that interval from nothing but the caller's success/failure feedback.
//!
//! ## Quick Example
//!
//! ```rust
//! use cadence::AdaptiveLimiter;
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use std::time::Duration;
//!
//! let mut limiter = AdaptiveLimiter::default();
//! let mut now = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
//!
//! // The source only has something new every two minutes.
//! for _ in 0..40 {
//!     now += TimeDelta::from_std(limiter.interval()).unwrap();
//!     let found = limiter.interval() >= Duration::from_secs(120);
//!     limiter.status(Some(found), now).unwrap();
//! }
//!
//! // It keeps probing one second either side of the target.
//! let interval = limiter.interval().as_secs();
//! assert!((119..=120).contains(&interval));
//! ```
//!
//! See [`limiter`] for how the search proceeds and [`testing`] for emulators
//! that drive a limiter against simulated time.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod history;
pub mod limiter;
pub mod testing;

// Re-exports
pub use error::LimiterError;
pub use history::{Outcome, StatusHistory};
pub use limiter::{
    AdaptiveLimiter, LimiterConfig, LimiterSnapshot, SearchKind, StaticLimiter, StatusReport,
    Throttle,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::LimiterError;
    pub use crate::limiter::{AdaptiveLimiter, LimiterConfig, StaticLimiter, Throttle};
}
