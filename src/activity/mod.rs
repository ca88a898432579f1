//! Activity tracking for the wait-time service.

pub mod log;

pub use log::{
    create_shared_log, create_shared_log_with_persistence, ActivityLog, ActivityStats,
    SharedActivityLog,
};
