//! Core wait-time logic.
//!
//! This module contains:
//! - The heuristic estimator and its clock and jitter seams
//! - Trailing windows over reports
//! - Blending of community averages with estimates
//! - Checkpoint and line-type breakdowns
//! - The aggregator tying these to a report store

pub mod aggregator;
pub mod blend;
pub mod breakdown;
pub mod clock;
pub mod estimator;
pub mod labels;
pub mod windowing;

// Re-export commonly used types
pub use aggregator::{
    Aggregator, AggregatorSettings, AirportWithStats, NetworkSummary, SharedStore,
    DEFAULT_RECENT_LIMIT,
};
pub use blend::{blend, BlendedWait, DataSource, MIN_COMMUNITY_REPORTS};
pub use breakdown::{CheckpointStats, LineTypeStats};
pub use clock::{
    system_clock, Clock, FixedClock, FixedJitter, JitterSource, RandomJitter, SharedClock,
    SharedJitter, SystemClock,
};
pub use estimator::{Estimator, Tier, MIN_ESTIMATE_MINUTES};
pub use labels::{Freshness, WaitLevel};
pub use windowing::{TrailingWindow, WindowSummary, DEFAULT_WINDOW_HOURS};
