//! Record types held by the report store.
//!
//! Airports are reference data; wait-time reports are immutable crowd
//! submissions stamped by the server at creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest wait a report may claim, in minutes.
pub const MAX_WAIT_MINUTES: u32 = 300;

/// An airport with a security checkpoint we track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub id: Uuid,
    /// Short uppercase code (IATA style, e.g. "ATL")
    pub code: String,
    pub name: String,
    pub city: String,
    /// Two-letter state/region code
    pub state: String,
    pub terminal_count: u32,
}

/// Fields needed to register an airport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAirport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub terminal_count: u32,
}

/// Screening lane a report was submitted for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    #[default]
    Standard,
    TsaPrecheck,
    Clear,
}

impl LineType {
    /// All line types in display order.
    pub const ALL: [LineType; 3] = [LineType::Standard, LineType::TsaPrecheck, LineType::Clear];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineType::Standard => "standard",
            LineType::TsaPrecheck => "tsa_precheck",
            LineType::Clear => "clear",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(LineType::Standard),
            "tsa_precheck" => Ok(LineType::TsaPrecheck),
            "clear" => Ok(LineType::Clear),
            other => Err(format!(
                "unknown line type '{other}' (expected standard, tsa_precheck or clear)"
            )),
        }
    }
}

/// A single crowd-submitted wait time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitTimeReport {
    pub id: Uuid,
    pub airport_id: Uuid,
    pub wait_minutes: u32,
    pub terminal: Option<String>,
    pub checkpoint: Option<String>,
    pub line_type: LineType,
    pub reported_at: DateTime<Utc>,
}

/// A validated report waiting for the store to assign id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub airport_id: Uuid,
    pub wait_minutes: u32,
    pub terminal: Option<String>,
    pub checkpoint: Option<String>,
    pub line_type: LineType,
}

impl NewReport {
    /// Stamp the report with a fresh id and the given creation time.
    pub fn into_report(self, reported_at: DateTime<Utc>) -> WaitTimeReport {
        WaitTimeReport {
            id: Uuid::new_v4(),
            airport_id: self.airport_id,
            wait_minutes: self.wait_minutes,
            terminal: self.terminal,
            checkpoint: self.checkpoint,
            line_type: self.line_type,
            reported_at,
        }
    }
}
