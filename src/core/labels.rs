//! Coarse classifications of wait length and report freshness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a wait is, in broad strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitLevel {
    Short,
    Moderate,
    Long,
    VeryLong,
}

impl WaitLevel {
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=10 => WaitLevel::Short,
            11..=20 => WaitLevel::Moderate,
            21..=35 => WaitLevel::Long,
            _ => WaitLevel::VeryLong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WaitLevel::Short => "Short",
            WaitLevel::Moderate => "Moderate",
            WaitLevel::Long => "Long",
            WaitLevel::VeryLong => "Very Long",
        }
    }
}

/// How recent the latest report is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Recent,
    Aging,
    Stale,
    None,
}

impl Freshness {
    /// Classify the age of `latest` as seen at `now`.
    pub fn classify(latest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(latest) = latest else {
            return Freshness::None;
        };

        match (now - latest).num_minutes() {
            m if m < 30 => Freshness::Fresh,
            m if m < 120 => Freshness::Recent,
            m if m < 360 => Freshness::Aging,
            _ => Freshness::Stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_wait_level_boundaries() {
        assert_eq!(WaitLevel::from_minutes(0), WaitLevel::Short);
        assert_eq!(WaitLevel::from_minutes(10), WaitLevel::Short);
        assert_eq!(WaitLevel::from_minutes(11), WaitLevel::Moderate);
        assert_eq!(WaitLevel::from_minutes(20), WaitLevel::Moderate);
        assert_eq!(WaitLevel::from_minutes(35), WaitLevel::Long);
        assert_eq!(WaitLevel::from_minutes(36), WaitLevel::VeryLong);
        assert_eq!(WaitLevel::VeryLong.label(), "Very Long");
    }

    #[test]
    fn test_freshness() {
        let now = Utc::now();
        assert_eq!(Freshness::classify(None, now), Freshness::None);
        assert_eq!(Freshness::classify(Some(now), now), Freshness::Fresh);
        assert_eq!(
            Freshness::classify(Some(now - Duration::minutes(30)), now),
            Freshness::Recent
        );
        assert_eq!(
            Freshness::classify(Some(now - Duration::minutes(200)), now),
            Freshness::Aging
        );
        assert_eq!(
            Freshness::classify(Some(now - Duration::hours(6)), now),
            Freshness::Stale
        );
    }
}
