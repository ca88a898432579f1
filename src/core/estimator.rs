//! Baseline wait estimator.
//!
//! Produces a synthetic wait time for an airport from nothing but its code and
//! the current local time: a per-tier base wait scaled by time-of-day and
//! day-of-week multipliers, plus a little jitter. The multiplier tables are
//! fixed policy, kept exactly as tuned.

use crate::core::clock::{system_clock, RandomJitter, SharedClock, SharedJitter};
use crate::store::Airport;
use chrono::{Datelike, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Estimates never drop below this many minutes.
pub const MIN_ESTIMATE_MINUTES: u32 = 2;

/// Total width of the jitter band (±2 minutes).
pub const JITTER_RANGE_MINUTES: f64 = 4.0;

/// Major hubs.
const BUSY_AIRPORTS: [&str; 20] = [
    "ATL", "LAX", "ORD", "DFW", "DEN", "JFK", "SFO", "SEA", "LAS", "MCO", "EWR", "MIA", "PHX",
    "IAH", "BOS", "MSP", "FLL", "DTW", "PHL", "LGA",
];

/// Secondary hubs.
const MEDIUM_AIRPORTS: [&str; 10] = [
    "CLT", "BWI", "SLC", "SAN", "DCA", "IAD", "TPA", "PDX", "HNL", "STL",
];

/// Traffic tier of an airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Busy,
    Medium,
    Small,
}

impl Tier {
    /// Classify an airport code. Unlisted codes are small.
    pub fn classify(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        if BUSY_AIRPORTS.contains(&code.as_str()) {
            Tier::Busy
        } else if MEDIUM_AIRPORTS.contains(&code.as_str()) {
            Tier::Medium
        } else {
            Tier::Small
        }
    }

    /// Base wait in minutes before any multiplier.
    pub fn base_wait(&self) -> f64 {
        match self {
            Tier::Busy => 18.0,
            Tier::Medium => 12.0,
            Tier::Small => 7.0,
        }
    }
}

/// Multiplier for the local hour of day (0-23).
pub fn time_of_day_multiplier(hour: u32) -> f64 {
    match hour {
        4..=5 => 0.6,
        6..=8 => 1.4,
        9..=10 => 1.1,
        11..=13 => 0.85,
        14..=16 => 1.15,
        17..=19 => 1.3,
        20..=22 => 0.7,
        _ => 0.5,
    }
}

/// Multiplier for the local day of week.
pub fn day_of_week_multiplier(day: Weekday) -> f64 {
    match day {
        Weekday::Sun => 1.25,
        Weekday::Mon => 1.15,
        Weekday::Tue => 0.9,
        Weekday::Wed => 0.9,
        Weekday::Thu => 1.0,
        Weekday::Fri => 1.3,
        Weekday::Sat => 0.85,
    }
}

/// Unjittered estimate for an airport at a given local hour and day.
pub fn baseline_minutes(code: &str, hour: u32, day: Weekday) -> f64 {
    Tier::classify(code).base_wait() * time_of_day_multiplier(hour) * day_of_week_multiplier(day)
}

/// Heuristic wait estimator reading a clock and a jitter source.
#[derive(Clone)]
pub struct Estimator {
    clock: SharedClock,
    jitter: SharedJitter,
    timezone: Tz,
}

impl Estimator {
    /// Create an estimator with explicit time and noise sources.
    pub fn new(clock: SharedClock, jitter: SharedJitter, timezone: Tz) -> Self {
        Self {
            clock,
            jitter,
            timezone,
        }
    }

    /// Estimator backed by the wall clock and a random jitter source.
    pub fn system(timezone: Tz) -> Self {
        Self::new(system_clock(), Arc::new(RandomJitter), timezone)
    }

    /// Timezone used to derive the local hour and weekday.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Estimate the current wait at an airport.
    pub fn estimate(&self, airport: &Airport) -> u32 {
        self.estimate_code(&airport.code)
    }

    /// Estimate the current wait for an airport code.
    pub fn estimate_code(&self, code: &str) -> u32 {
        let local = self.clock.now().with_timezone(&self.timezone);
        self.estimate_at(code, local.hour(), local.weekday())
    }

    /// Estimate for an explicit local hour and weekday.
    pub fn estimate_at(&self, code: &str, hour: u32, day: Weekday) -> u32 {
        let raw = baseline_minutes(code, hour, day) + self.jitter.jitter(JITTER_RANGE_MINUTES);
        let rounded = raw.round().max(MIN_ESTIMATE_MINUTES as f64);
        rounded as u32
    }
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator")
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}
