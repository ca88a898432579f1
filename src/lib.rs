//! Checkpoint Wait - crowd-sourced airport security wait times.
//!
//! Travellers report how long they waited at an airport security checkpoint.
//! This library turns those reports into one wait time per airport, falling
//! back on a time-of-day heuristic when reports are scarce.
//!
//! # How a wait time is chosen
//!
//! - **No recent reports**: the estimator's figure is shown, tagged `estimated`
//! - **Fewer than three**: the community average and the estimate are mixed
//!   in proportion to the report count, tagged `blended`
//! - **Three or more**: the community average is shown alone, tagged `community`
//!
//! Only reports from the trailing 24 hours are counted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Checkpoint Wait                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │ HTTP server │──▶│ Aggregator  │──▶│ ReportStore │         │
//! │  │   (axum)    │   │  (blend)    │   │  (memory)   │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │         │                 │                                  │
//! │         ▼                 ▼                                  │
//! │  ┌─────────────┐   ┌─────────────┐                           │
//! │  │ Validation  │   │  Estimator  │                           │
//! │  └─────────────┘   └─────────────┘                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use checkpoint_wait::{activity, core, store};
//! use std::sync::Arc;
//!
//! let store = Arc::new(store::MemoryStore::new());
//! store::seed_if_empty(store.as_ref(), chrono::Utc::now()).unwrap();
//!
//! let aggregator = core::Aggregator::new(
//!     store,
//!     core::Estimator::system(chrono_tz::America::New_York),
//!     core::system_clock(),
//!     core::AggregatorSettings::default(),
//!     activity::create_shared_log(),
//! );
//!
//! for airport in aggregator.airports_with_stats().unwrap() {
//!     println!("{} {} min ({:?})", airport.airport.code, airport.avg_wait_minutes, airport.data_source);
//! }
//! ```

pub mod activity;
pub mod config;
pub mod core;
pub mod store;
pub mod validation;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use activity::{ActivityLog, ActivityStats, SharedActivityLog};
pub use config::{Config, ConfigError};
pub use core::{
    Aggregator, AggregatorSettings, AirportWithStats, CheckpointStats, DataSource, Estimator,
    LineTypeStats, NetworkSummary,
};
pub use store::{Airport, LineType, MemoryStore, ReportStore, StoreError, WaitTimeReport};
pub use validation::{ReportRequest, ValidationError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
