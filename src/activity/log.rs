//! Service activity counters.
//!
//! Tracks how many reports were accepted or rejected and how many lookups
//! and estimates were served, without keeping any report content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running activity counters for the current process.
#[derive(Debug)]
pub struct ActivityLog {
    /// Reports stored
    reports_accepted: AtomicU64,
    /// Reports refused at validation
    reports_rejected: AtomicU64,
    /// Airport lookups answered
    lookups_served: AtomicU64,
    /// Estimator invocations
    estimates_produced: AtomicU64,
    /// Process start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            reports_accepted: AtomicU64::new(0),
            reports_rejected: AtomicU64::new(0),
            lookups_served: AtomicU64::new(0),
            estimates_produced: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create an activity log that carries totals across restarts.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("Could not load previous activity stats: {e}");
        }

        log
    }

    pub fn record_report_accepted(&self) {
        self.reports_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_rejected(&self) {
        self.reports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self) {
        self.lookups_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_estimates(&self, count: u64) {
        self.estimates_produced.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ActivityStats {
        ActivityStats {
            reports_accepted: self.reports_accepted.load(Ordering::Relaxed),
            reports_rejected: self.reports_rejected.load(Ordering::Relaxed),
            lookups_served: self.lookups_served.load(Ordering::Relaxed),
            estimates_produced: self.estimates_produced.load(Ordering::Relaxed),
            session_start: self.session_start,
            uptime_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Activity:\n\
             - Reports accepted: {}\n\
             - Reports rejected: {}\n\
             - Airport lookups: {}\n\
             - Estimates produced: {}\n\
             - Uptime: {} seconds",
            stats.reports_accepted,
            stats.reports_rejected,
            stats.lookups_served,
            stats.estimates_produced,
            stats.uptime_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                reports_accepted: stats.reports_accepted,
                reports_rejected: stats.reports_rejected,
                lookups_served: stats.lookups_served,
                estimates_produced: stats.estimates_produced,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.reports_accepted
                    .store(persisted.reports_accepted, Ordering::Relaxed);
                self.reports_rejected
                    .store(persisted.reports_rejected, Ordering::Relaxed);
                self.lookups_served
                    .store(persisted.lookups_served, Ordering::Relaxed);
                self.estimates_produced
                    .store(persisted.estimates_produced, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of activity counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub reports_accepted: u64,
    pub reports_rejected: u64,
    pub lookups_served: u64,
    pub estimates_produced: u64,
    pub session_start: DateTime<Utc>,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    reports_accepted: u64,
    reports_rejected: u64,
    lookups_served: u64,
    estimates_produced: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared activity log.
pub type SharedActivityLog = Arc<ActivityLog>;

pub fn create_shared_log() -> SharedActivityLog {
    Arc::new(ActivityLog::new())
}

pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedActivityLog {
    Arc::new(ActivityLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_counting() {
        let log = ActivityLog::new();

        log.record_report_accepted();
        log.record_report_accepted();
        log.record_report_rejected();
        log.record_lookup();
        log.record_estimates(30);

        let stats = log.stats();
        assert_eq!(stats.reports_accepted, 2);
        assert_eq!(stats.reports_rejected, 1);
        assert_eq!(stats.lookups_served, 1);
        assert_eq!(stats.estimates_produced, 30);
    }

    #[test]
    fn test_summary_format() {
        let summary = ActivityLog::new().summary();
        assert!(summary.contains("Reports accepted"));
        assert!(summary.contains("Estimates produced"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("checkpoint-wait-activity-{}", uuid::Uuid::new_v4()))
            .join("activity.json");

        let log = ActivityLog::with_persistence(path.clone());
        log.record_report_accepted();
        log.record_lookup();
        log.save().unwrap();

        let reloaded = ActivityLog::with_persistence(path.clone());
        let stats = reloaded.stats();
        assert_eq!(stats.reports_accepted, 1);
        assert_eq!(stats.lookups_served, 1);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
