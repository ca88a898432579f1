//! Injectable time and randomness sources.
//!
//! Production code reads the wall clock and a thread-local RNG; tests swap in
//! fixed values so estimates and windows are reproducible.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of symmetric noise added to estimates.
pub trait JitterSource: Send + Sync {
    /// Return a value in `[-range / 2, range / 2]`.
    fn jitter(&self, range: f64) -> f64;
}

/// Uniform jitter drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn jitter(&self, range: f64) -> f64 {
        let half = range.abs() / 2.0;
        if half == 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(-half..=half)
    }
}

/// Always returns the same offset, clamped into the requested range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn jitter(&self, range: f64) -> f64 {
        let half = range.abs() / 2.0;
        self.0.clamp(-half, half)
    }
}

pub type SharedClock = Arc<dyn Clock>;
pub type SharedJitter = Arc<dyn JitterSource>;

/// Shared handle to the wall clock.
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
