//! Per-checkpoint and per-line-type rollups of community reports.
//!
//! These breakdowns never consult the estimator: it has no notion of a
//! checkpoint or a screening lane.

use crate::core::windowing::{TrailingWindow, WindowSummary};
use crate::store::{LineType, WaitTimeReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rollup for one named checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointStats {
    pub checkpoint: String,
    pub avg_wait_minutes: u32,
    pub report_count: usize,
    pub latest_report: DateTime<Utc>,
}

/// Rollup for one screening lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeStats {
    pub line_type: LineType,
    pub avg_wait_minutes: u32,
    pub report_count: usize,
}

/// Group windowed reports by checkpoint label, highest average first.
///
/// Reports with no label or a blank one are skipped. Equal averages are
/// ordered by label.
pub fn checkpoint_stats(reports: &[WaitTimeReport], window: &TrailingWindow) -> Vec<CheckpointStats> {
    let mut groups: BTreeMap<&str, Vec<&WaitTimeReport>> = BTreeMap::new();
    for report in window.filter(reports) {
        let Some(label) = report.checkpoint.as_deref().map(str::trim) else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        groups.entry(label).or_default().push(report);
    }

    let mut stats: Vec<CheckpointStats> = groups
        .into_iter()
        .filter_map(|(label, group)| {
            let summary = WindowSummary::from_reports(group);
            Some(CheckpointStats {
                checkpoint: label.to_string(),
                avg_wait_minutes: summary.rounded_mean()?,
                report_count: summary.report_count,
                latest_report: summary.latest_report?,
            })
        })
        .collect();

    // Stable sort keeps the label order from the BTreeMap for ties
    stats.sort_by(|a, b| b.avg_wait_minutes.cmp(&a.avg_wait_minutes));
    stats
}

/// Average wait per line type over windowed reports.
///
/// Only line types with at least one report are returned, in
/// [`LineType::ALL`] order.
pub fn line_type_stats(reports: &[WaitTimeReport], window: &TrailingWindow) -> Vec<LineTypeStats> {
    let windowed = window.filter(reports);

    LineType::ALL
        .iter()
        .filter_map(|&line_type| {
            let summary = WindowSummary::from_reports(
                windowed.iter().copied().filter(|r| r.line_type == line_type),
            );
            Some(LineTypeStats {
                line_type,
                avg_wait_minutes: summary.rounded_mean()?,
                report_count: summary.report_count,
            })
        })
        .collect()
}
