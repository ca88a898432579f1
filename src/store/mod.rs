//! Report store for airports and crowd-submitted wait times.
//!
//! The aggregation core only reads through [`ReportStore`]; any failure here
//! is handed back to the caller untouched.

pub mod memory;
pub mod seed;
pub mod types;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use seed::{seed_if_empty, SeedSummary};
pub use types::{Airport, LineType, NewAirport, NewReport, WaitTimeReport, MAX_WAIT_MINUTES};

/// Errors raised by a report store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("airport {0} does not exist")]
    UnknownAirport(Uuid),
    #[error("airport code {0} is already registered")]
    DuplicateCode(String),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Append-only storage of airports and wait-time reports.
pub trait ReportStore: Send + Sync {
    /// All airports, ordered by code.
    fn list_airports(&self) -> StoreResult<Vec<Airport>>;

    /// Look up an airport by code, ignoring case.
    fn find_airport(&self, code: &str) -> StoreResult<Option<Airport>>;

    /// Reports for an airport with `reported_at >= since`, oldest first.
    fn reports_since(&self, airport_id: Uuid, since: DateTime<Utc>)
        -> StoreResult<Vec<WaitTimeReport>>;

    /// The `limit` most recent reports for an airport, newest first.
    fn recent_reports(&self, airport_id: Uuid, limit: usize) -> StoreResult<Vec<WaitTimeReport>>;

    /// Append a report, stamping it with an id and the current time.
    fn create_report(&self, report: NewReport) -> StoreResult<WaitTimeReport>;

    /// Append a report that already carries its id and timestamp.
    fn insert_report(&self, report: WaitTimeReport) -> StoreResult<WaitTimeReport>;

    /// Register an airport.
    fn create_airport(&self, airport: NewAirport) -> StoreResult<Airport>;

    /// Number of registered airports.
    fn airport_count(&self) -> StoreResult<usize>;
}
