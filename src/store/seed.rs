//! Reference airports and a handful of sample reports for a fresh store.

use crate::store::types::{LineType, NewAirport, NewReport};
use crate::store::{ReportStore, StoreResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Spacing between consecutive seed reports.
const SEED_REPORT_SPACING_MINUTES: i64 = 15;

/// (code, name, city, state, terminals)
const US_AIRPORTS: &[(&str, &str, &str, &str, u32)] = &[
    ("ATL", "Hartsfield-Jackson Atlanta International Airport", "Atlanta", "GA", 2),
    ("LAX", "Los Angeles International Airport", "Los Angeles", "CA", 9),
    ("ORD", "O'Hare International Airport", "Chicago", "IL", 4),
    ("DFW", "Dallas/Fort Worth International Airport", "Dallas", "TX", 5),
    ("DEN", "Denver International Airport", "Denver", "CO", 3),
    ("JFK", "John F. Kennedy International Airport", "New York", "NY", 6),
    ("SFO", "San Francisco International Airport", "San Francisco", "CA", 4),
    ("SEA", "Seattle-Tacoma International Airport", "Seattle", "WA", 2),
    ("LAS", "Harry Reid International Airport", "Las Vegas", "NV", 3),
    ("MCO", "Orlando International Airport", "Orlando", "FL", 4),
    ("EWR", "Newark Liberty International Airport", "Newark", "NJ", 3),
    ("MIA", "Miami International Airport", "Miami", "FL", 3),
    ("PHX", "Phoenix Sky Harbor International Airport", "Phoenix", "AZ", 3),
    ("IAH", "George Bush Intercontinental Airport", "Houston", "TX", 5),
    ("BOS", "Boston Logan International Airport", "Boston", "MA", 4),
    ("MSP", "Minneapolis-Saint Paul International Airport", "Minneapolis", "MN", 2),
    ("DTW", "Detroit Metropolitan Wayne County Airport", "Detroit", "MI", 2),
    ("FLL", "Fort Lauderdale-Hollywood International Airport", "Fort Lauderdale", "FL", 4),
    ("PHL", "Philadelphia International Airport", "Philadelphia", "PA", 7),
    ("CLT", "Charlotte Douglas International Airport", "Charlotte", "NC", 1),
    ("LGA", "LaGuardia Airport", "New York", "NY", 2),
    ("BWI", "Baltimore/Washington International Airport", "Baltimore", "MD", 1),
    ("SLC", "Salt Lake City International Airport", "Salt Lake City", "UT", 2),
    ("DCA", "Ronald Reagan Washington National Airport", "Washington", "DC", 3),
    ("IAD", "Washington Dulles International Airport", "Washington", "DC", 2),
    ("SAN", "San Diego International Airport", "San Diego", "CA", 2),
    ("TPA", "Tampa International Airport", "Tampa", "FL", 1),
    ("PDX", "Portland International Airport", "Portland", "OR", 1),
    ("HNL", "Daniel K. Inouye International Airport", "Honolulu", "HI", 2),
    ("AUS", "Austin-Bergstrom International Airport", "Austin", "TX", 1),
];

/// (code, wait minutes, line type, terminal, checkpoint)
const SEED_REPORTS: &[(&str, u32, LineType, &str, Option<&str>)] = &[
    ("LAX", 25, LineType::Standard, "Terminal 4", None),
    ("LAX", 8, LineType::TsaPrecheck, "Terminal 4", None),
    ("LAX", 35, LineType::Standard, "Terminal 7", None),
    ("LAX", 12, LineType::TsaPrecheck, "Terminal 7", None),
    ("JFK", 30, LineType::Standard, "Terminal 1", None),
    ("JFK", 10, LineType::TsaPrecheck, "Terminal 4", None),
    ("JFK", 5, LineType::Clear, "Terminal 4", None),
    ("ORD", 20, LineType::Standard, "Terminal 1", None),
    ("ORD", 7, LineType::TsaPrecheck, "Terminal 2", None),
    ("ORD", 40, LineType::Standard, "Terminal 3", None),
    ("ATL", 15, LineType::Standard, "North", Some("Main")),
    ("ATL", 5, LineType::TsaPrecheck, "South", None),
    ("SFO", 18, LineType::Standard, "Terminal 1", None),
    ("SFO", 6, LineType::Clear, "Terminal 1", None),
    ("DEN", 22, LineType::Standard, "Bridge", Some("South")),
    ("DEN", 10, LineType::TsaPrecheck, "Bridge", Some("North")),
    ("SEA", 15, LineType::Standard, "Central", Some("C")),
    ("SEA", 8, LineType::TsaPrecheck, "Central", Some("C")),
    ("MIA", 45, LineType::Standard, "North", None),
    ("MIA", 15, LineType::TsaPrecheck, "South", None),
    ("BOS", 12, LineType::Standard, "Terminal B", None),
    ("BOS", 3, LineType::Clear, "Terminal B", None),
    ("DFW", 28, LineType::Standard, "Terminal D", None),
    ("DFW", 9, LineType::TsaPrecheck, "Terminal A", None),
];

/// What a seeding pass inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub airports: usize,
    pub reports: usize,
}

/// Seed the store unless it already holds airports.
///
/// Sample reports are spaced 15 minutes apart with the last one at `now`.
pub fn seed_if_empty(store: &dyn ReportStore, now: DateTime<Utc>) -> StoreResult<SeedSummary> {
    if store.airport_count()? > 0 {
        tracing::info!("Store already seeded, skipping");
        return Ok(SeedSummary::default());
    }

    let mut ids: HashMap<&str, Uuid> = HashMap::new();
    for &(code, name, city, state, terminal_count) in US_AIRPORTS {
        let created = store.create_airport(NewAirport {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            terminal_count,
        })?;
        ids.insert(code, created.id);
    }

    let mut reports = 0;
    let total = SEED_REPORTS.len() as i64;
    for (i, &(code, wait_minutes, line_type, terminal, checkpoint)) in
        SEED_REPORTS.iter().enumerate()
    {
        let Some(&airport_id) = ids.get(code) else {
            continue;
        };
        let offset = Duration::minutes((total - 1 - i as i64) * SEED_REPORT_SPACING_MINUTES);
        let report = NewReport {
            airport_id,
            wait_minutes,
            terminal: Some(terminal.to_string()),
            checkpoint: checkpoint.map(str::to_string),
            line_type,
        }
        .into_report(now - offset);
        store.insert_report(report)?;
        reports += 1;
    }

    tracing::info!(airports = ids.len(), reports, "Seeded report store");

    Ok(SeedSummary {
        airports: ids.len(),
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_seed_populates_empty_store() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let summary = seed_if_empty(&store, now).unwrap();
        assert_eq!(summary.airports, 30);
        assert_eq!(summary.reports, 24);
        assert_eq!(store.airport_count().unwrap(), 30);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        let now = Utc::now();

        seed_if_empty(&store, now).unwrap();
        let second = seed_if_empty(&store, now).unwrap();
        assert_eq!(second, SeedSummary::default());
        assert_eq!(store.airport_count().unwrap(), 30);
    }

    #[test]
    fn test_seed_reports_are_spaced_and_end_now() {
        let store = MemoryStore::new();
        let now = Utc::now();
        seed_if_empty(&store, now).unwrap();

        // DFW holds the last two seed reports
        let dfw = store.find_airport("DFW").unwrap().unwrap();
        let reports = store.recent_reports(dfw.id, 10).unwrap();
        assert_eq!(reports[0].reported_at, now);
        assert_eq!(reports[1].reported_at, now - Duration::minutes(15));

        // LAX holds the first one, 23 slots back
        let lax = store.find_airport("LAX").unwrap().unwrap();
        let oldest = store.recent_reports(lax.id, 10).unwrap().pop().unwrap();
        assert_eq!(oldest.reported_at, now - Duration::minutes(23 * 15));
    }
}
