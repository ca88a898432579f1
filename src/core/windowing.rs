//! Trailing time windows over wait-time reports.
//!
//! Only reports inside the window (inclusive at both ends) count toward an
//! average or a report count; older reports stay in the store but are ignored.

use crate::store::WaitTimeReport;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Length of the default trailing window.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// A window of time ending at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingWindow {
    /// Earliest included instant
    pub start: DateTime<Utc>,
    /// Latest included instant
    pub end: DateTime<Utc>,
}

impl TrailingWindow {
    /// Create a window of the given length ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start: end - length,
            end,
        }
    }

    /// The default 24-hour window ending at `end`.
    pub fn last_day(end: DateTime<Utc>) -> Self {
        Self::ending_at(end, Duration::hours(DEFAULT_WINDOW_HOURS))
    }

    /// Check if a timestamp falls within this window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Reports whose timestamp falls within this window.
    pub fn filter<'a>(&self, reports: &'a [WaitTimeReport]) -> Vec<&'a WaitTimeReport> {
        reports
            .iter()
            .filter(|r| self.contains(r.reported_at))
            .collect()
    }

    /// Summarize the reports that fall within this window.
    pub fn summarize(&self, reports: &[WaitTimeReport]) -> WindowSummary {
        WindowSummary::from_reports(self.filter(reports))
    }
}

/// Count, mean and recency of a set of reports.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowSummary {
    pub report_count: usize,
    /// Mean wait in minutes, `None` when there are no reports
    pub mean_wait: Option<f64>,
    pub latest_report: Option<DateTime<Utc>>,
}

impl WindowSummary {
    pub fn from_reports<'a, I>(reports: I) -> Self
    where
        I: IntoIterator<Item = &'a WaitTimeReport>,
    {
        let mut waits = Vec::new();
        let mut latest: Option<DateTime<Utc>> = None;
        for report in reports {
            waits.push(report.wait_minutes as f64);
            latest = latest.max(Some(report.reported_at));
        }

        let mean_wait = if waits.is_empty() {
            None
        } else {
            Some(waits.iter().mean())
        };

        Self {
            report_count: waits.len(),
            mean_wait,
            latest_report: latest,
        }
    }

    /// Mean wait rounded to whole minutes.
    pub fn rounded_mean(&self) -> Option<u32> {
        self.mean_wait.map(|m| m.round() as u32)
    }
}
