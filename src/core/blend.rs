//! Confidence-weighted blending of community reports with the estimator.
//!
//! With no reports the estimate stands alone; at or above the confidence
//! threshold the community average is trusted outright; in between the two
//! are interpolated linearly by report count.

use serde::{Deserialize, Serialize};

/// Reports needed before the community average is used on its own.
pub const MIN_COMMUNITY_REPORTS: usize = 3;

/// Which branch produced a displayed wait time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Community,
    Estimated,
    Blended,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Community => "community",
            DataSource::Estimated => "estimated",
            DataSource::Blended => "blended",
        }
    }
}

/// A wait time together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedWait {
    pub avg_wait_minutes: u32,
    pub data_source: DataSource,
}

/// Weight given to the community average for a report count.
///
/// Linear in `report_count`, reaching 1.0 at `min_reports`.
pub fn community_weight(report_count: usize, min_reports: usize) -> f64 {
    if min_reports == 0 || report_count >= min_reports {
        1.0
    } else {
        report_count as f64 / min_reports as f64
    }
}

/// Combine a community average with an estimate.
///
/// `community_avg` is the unrounded mean over `report_count` windowed reports.
pub fn blend(
    community_avg: Option<f64>,
    report_count: usize,
    estimate: u32,
    min_reports: usize,
) -> BlendedWait {
    let avg = match community_avg {
        Some(avg) if report_count > 0 => avg,
        _ => {
            return BlendedWait {
                avg_wait_minutes: estimate,
                data_source: DataSource::Estimated,
            }
        }
    };

    if report_count >= min_reports {
        return BlendedWait {
            avg_wait_minutes: avg.round() as u32,
            data_source: DataSource::Community,
        };
    }

    let weight = community_weight(report_count, min_reports);
    let mixed = avg * weight + estimate as f64 * (1.0 - weight);
    BlendedWait {
        avg_wait_minutes: mixed.round() as u32,
        data_source: DataSource::Blended,
    }
}
