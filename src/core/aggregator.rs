//! Per-airport wait statistics.
//!
//! The aggregator reads windowed reports from a [`ReportStore`], averages them,
//! and blends the average with the [`Estimator`] so every airport always has a
//! displayable wait time. The list and single-airport paths share one
//! per-airport routine, so both apply the same blend.

use crate::activity::SharedActivityLog;
use crate::core::blend::{blend, BlendedWait, DataSource, MIN_COMMUNITY_REPORTS};
use crate::core::breakdown::{self, CheckpointStats, LineTypeStats};
use crate::core::clock::SharedClock;
use crate::core::estimator::Estimator;
use crate::core::labels::{Freshness, WaitLevel};
use crate::core::windowing::{TrailingWindow, DEFAULT_WINDOW_HOURS};
use crate::store::{Airport, NewReport, ReportStore, StoreResult, WaitTimeReport};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Reports returned by a recent-reports lookup.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Shared handle to a report store.
pub type SharedStore = Arc<dyn ReportStore>;

/// An airport together with its current wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportWithStats {
    #[serde(flatten)]
    pub airport: Airport,
    pub avg_wait_minutes: u32,
    /// Reports inside the trailing window
    pub report_count: usize,
    pub latest_report: Option<DateTime<Utc>>,
    pub data_source: DataSource,
    pub wait_level: WaitLevel,
    pub freshness: Freshness,
}

/// Network-wide rollup across all airports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub airport_count: usize,
    pub total_reports: usize,
    /// Airports with at least one windowed report
    pub active_airports: usize,
    pub overall_avg_wait_minutes: Option<u32>,
}

/// Tunables for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    pub window: Duration,
    pub min_community_reports: usize,
    pub recent_limit: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            window: Duration::hours(DEFAULT_WINDOW_HOURS),
            min_community_reports: MIN_COMMUNITY_REPORTS,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// Combines community reports with the estimator.
#[derive(Clone)]
pub struct Aggregator {
    store: SharedStore,
    estimator: Estimator,
    clock: SharedClock,
    settings: AggregatorSettings,
    activity: SharedActivityLog,
}

impl Aggregator {
    pub fn new(
        store: SharedStore,
        estimator: Estimator,
        clock: SharedClock,
        settings: AggregatorSettings,
        activity: SharedActivityLog,
    ) -> Self {
        Self {
            store,
            estimator,
            clock,
            settings,
            activity,
        }
    }

    pub fn activity(&self) -> &SharedActivityLog {
        &self.activity
    }

    fn window(&self) -> TrailingWindow {
        TrailingWindow::ending_at(self.clock.now(), self.settings.window)
    }

    fn find_airport(&self, code: &str) -> StoreResult<Option<Airport>> {
        self.store
            .find_airport(code)
            .inspect_err(|e| error!("Failed to look up airport {code}: {e}"))
    }

    fn windowed_reports(
        &self,
        airport: &Airport,
        window: &TrailingWindow,
    ) -> StoreResult<Vec<WaitTimeReport>> {
        self.store
            .reports_since(airport.id, window.start)
            .inspect_err(|e| error!("Failed to fetch reports for {}: {e}", airport.code))
    }

    /// Every airport with its blended wait, ordered by code.
    pub fn airports_with_stats(&self) -> StoreResult<Vec<AirportWithStats>> {
        let window = self.window();
        let airports = self.store.list_airports().inspect_err(|e| {
            error!("Failed to list airports: {e}");
        })?;

        let stats = airports
            .into_iter()
            .map(|airport| self.stats_for(airport, &window))
            .collect::<StoreResult<Vec<_>>>()?;

        self.activity.record_lookup();
        debug!("Computed stats for {} airports", stats.len());
        Ok(stats)
    }

    /// A single airport by code, ignoring case. `None` when unknown.
    pub fn airport_with_stats(&self, code: &str) -> StoreResult<Option<AirportWithStats>> {
        let Some(airport) = self.find_airport(code)? else {
            debug!("No airport with code {code}");
            return Ok(None);
        };

        let stats = self.stats_for(airport, &self.window())?;
        self.activity.record_lookup();
        Ok(Some(stats))
    }

    fn stats_for(&self, airport: Airport, window: &TrailingWindow) -> StoreResult<AirportWithStats> {
        let reports = self.windowed_reports(&airport, window)?;
        let summary = window.summarize(&reports);

        let BlendedWait {
            avg_wait_minutes,
            data_source,
        } = self.blend(&airport, summary.mean_wait, summary.report_count);

        Ok(AirportWithStats {
            avg_wait_minutes,
            report_count: summary.report_count,
            latest_report: summary.latest_report,
            data_source,
            wait_level: WaitLevel::from_minutes(avg_wait_minutes),
            freshness: Freshness::classify(summary.latest_report, window.end),
            airport,
        })
    }

    /// Blend a community average with a fresh estimate for `airport`.
    ///
    /// The estimator runs on every call, even when its value is discarded.
    pub fn blend(
        &self,
        airport: &Airport,
        community_avg: Option<f64>,
        report_count: usize,
    ) -> BlendedWait {
        let estimate = self.estimator.estimate(airport);
        self.activity.record_estimates(1);

        let result = blend(
            community_avg,
            report_count,
            estimate,
            self.settings.min_community_reports,
        );
        debug!(
            airport = %airport.code,
            report_count,
            estimate,
            avg = result.avg_wait_minutes,
            source = result.data_source.as_str(),
            "Blended wait"
        );
        result
    }

    /// Checkpoint breakdown for an airport. Empty when the code is unknown.
    pub fn checkpoint_stats(&self, code: &str) -> StoreResult<Vec<CheckpointStats>> {
        let Some(airport) = self.find_airport(code)? else {
            return Ok(Vec::new());
        };
        let window = self.window();
        let reports = self.windowed_reports(&airport, &window)?;
        self.activity.record_lookup();
        Ok(breakdown::checkpoint_stats(&reports, &window))
    }

    /// Line-type breakdown for an airport. Empty when the code is unknown.
    pub fn line_type_stats(&self, code: &str) -> StoreResult<Vec<LineTypeStats>> {
        let Some(airport) = self.find_airport(code)? else {
            return Ok(Vec::new());
        };
        let window = self.window();
        let reports = self.windowed_reports(&airport, &window)?;
        self.activity.record_lookup();
        Ok(breakdown::line_type_stats(&reports, &window))
    }

    /// Most recent reports for an airport, newest first.
    pub fn recent_reports(&self, code: &str) -> StoreResult<Vec<WaitTimeReport>> {
        match self.find_airport(code)? {
            Some(airport) => {
                let reports = self
                    .store
                    .recent_reports(airport.id, self.settings.recent_limit)
                    .inspect_err(|e| error!("Failed to fetch recent reports: {e}"))?;
                self.activity.record_lookup();
                Ok(reports)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Network-wide totals over the trailing window.
    pub fn summary(&self) -> StoreResult<NetworkSummary> {
        let airports = self.airports_with_stats()?;

        let total_reports = airports.iter().map(|a| a.report_count).sum();
        let active_airports = airports.iter().filter(|a| a.report_count > 0).count();
        let overall_avg_wait_minutes = if airports.is_empty() {
            None
        } else {
            let total: u64 = airports.iter().map(|a| a.avg_wait_minutes as u64).sum();
            Some((total as f64 / airports.len() as f64).round() as u32)
        };

        Ok(NetworkSummary {
            airport_count: airports.len(),
            total_reports,
            active_airports,
            overall_avg_wait_minutes,
        })
    }

    /// Store a validated report.
    pub fn submit_report(&self, report: NewReport) -> StoreResult<WaitTimeReport> {
        let stored = self
            .store
            .create_report(report)
            .inspect_err(|e| error!("Failed to store report: {e}"))?;
        self.activity.record_report_accepted();
        info!(
            report_id = %stored.id,
            wait_minutes = stored.wait_minutes,
            line_type = stored.line_type.as_str(),
            "Accepted wait time report"
        );
        Ok(stored)
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("estimator", &self.estimator)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::create_shared_log;
    use crate::core::clock::{FixedClock, FixedJitter};
    use crate::store::{LineType, MemoryStore, NewAirport, StoreError};
    use chrono::TimeZone;

    // Friday 07:30 UTC: an ATL estimate is 18 * 1.4 * 1.3 = 32.76
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 7, 30, 0).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        aggregator: Aggregator,
    }

    fn fixture() -> Fixture {
        let clock: SharedClock = Arc::new(FixedClock(now()));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        for (code, name) in [("ATL", "Hartsfield-Jackson"), ("AUS", "Austin-Bergstrom")] {
            store
                .create_airport(NewAirport {
                    code: code.to_string(),
                    name: name.to_string(),
                    city: "Somewhere".to_string(),
                    state: "GA".to_string(),
                    terminal_count: 2,
                })
                .unwrap();
        }

        let estimator = Estimator::new(clock.clone(), Arc::new(FixedJitter(0.0)), chrono_tz::UTC);
        let aggregator = Aggregator::new(
            store.clone(),
            estimator,
            clock,
            AggregatorSettings::default(),
            create_shared_log(),
        );
        Fixture { store, aggregator }
    }

    fn add_report(
        fixture: &Fixture,
        code: &str,
        wait_minutes: u32,
        checkpoint: Option<&str>,
        age: Duration,
    ) {
        let airport = fixture.store.find_airport(code).unwrap().unwrap();
        let report = NewReport {
            airport_id: airport.id,
            wait_minutes,
            terminal: None,
            checkpoint: checkpoint.map(str::to_string),
            line_type: LineType::Standard,
        }
        .into_report(now() - age);
        fixture.store.insert_report(report).unwrap();
    }

    #[test]
    fn test_no_reports_uses_estimate() {
        let fx = fixture();
        let stats = fx.aggregator.airport_with_stats("ATL").unwrap().unwrap();

        assert_eq!(stats.avg_wait_minutes, 33);
        assert_eq!(stats.data_source, DataSource::Estimated);
        assert_eq!(stats.report_count, 0);
        assert_eq!(stats.latest_report, None);
        assert_eq!(stats.freshness, Freshness::None);
    }

    #[test]
    fn test_enough_reports_use_community_average() {
        let fx = fixture();
        for wait in [20, 30, 40] {
            add_report(&fx, "ATL", wait, None, Duration::minutes(10));
        }

        let stats = fx.aggregator.airport_with_stats("atl").unwrap().unwrap();
        assert_eq!(stats.avg_wait_minutes, 30);
        assert_eq!(stats.data_source, DataSource::Community);
        assert_eq!(stats.report_count, 3);
        assert_eq!(stats.wait_level, WaitLevel::Long);
        assert_eq!(stats.freshness, Freshness::Fresh);
    }

    #[test]
    fn test_single_report_blends_with_estimate() {
        let fx = fixture();
        // AUS estimate: 7 * 1.4 * 1.3 = 12.74 -> 13
        add_report(&fx, "AUS", 31, None, Duration::minutes(45));

        let stats = fx.aggregator.airport_with_stats("AUS").unwrap().unwrap();
        // 31 / 3 + 13 * 2 / 3 = 19
        assert_eq!(stats.avg_wait_minutes, 19);
        assert_eq!(stats.data_source, DataSource::Blended);
        assert_eq!(stats.report_count, 1);
        assert_eq!(stats.freshness, Freshness::Recent);
    }

    #[test]
    fn test_old_reports_do_not_count() {
        let fx = fixture();
        add_report(&fx, "ATL", 90, None, Duration::hours(25));
        add_report(&fx, "ATL", 90, None, Duration::hours(30));
        add_report(&fx, "ATL", 90, None, Duration::days(4));

        let stats = fx.aggregator.airport_with_stats("ATL").unwrap().unwrap();
        assert_eq!(stats.report_count, 0);
        assert_eq!(stats.data_source, DataSource::Estimated);
        assert_eq!(stats.avg_wait_minutes, 33);
    }

    #[test]
    fn test_list_and_single_lookup_agree() {
        let fx = fixture();
        add_report(&fx, "ATL", 10, None, Duration::hours(1));
        add_report(&fx, "ATL", 14, None, Duration::hours(2));

        let list = fx.aggregator.airports_with_stats().unwrap();
        assert_eq!(
            list.iter().map(|a| a.airport.code.as_str()).collect::<Vec<_>>(),
            vec!["ATL", "AUS"]
        );

        let single = fx.aggregator.airport_with_stats("ATL").unwrap().unwrap();
        assert_eq!(list[0], single);
    }

    #[test]
    fn test_unknown_airport() {
        let fx = fixture();
        assert!(fx.aggregator.airport_with_stats("ZZZ").unwrap().is_none());
        assert!(fx.aggregator.checkpoint_stats("ZZZ").unwrap().is_empty());
        assert!(fx.aggregator.line_type_stats("ZZZ").unwrap().is_empty());
        assert!(fx.aggregator.recent_reports("ZZZ").unwrap().is_empty());
    }

    #[test]
    fn test_checkpoint_breakdown() {
        let fx = fixture();
        add_report(&fx, "ATL", 10, Some("North"), Duration::minutes(5));
        add_report(&fx, "ATL", 20, Some("South"), Duration::minutes(5));
        add_report(&fx, "ATL", 30, Some("South"), Duration::minutes(5));

        let stats = fx.aggregator.checkpoint_stats("ATL").unwrap();
        let rows: Vec<(&str, u32)> = stats
            .iter()
            .map(|s| (s.checkpoint.as_str(), s.avg_wait_minutes))
            .collect();
        assert_eq!(rows, vec![("South", 25), ("North", 10)]);
    }

    #[test]
    fn test_submitted_report_visible_on_next_read() {
        let fx = fixture();
        let airport = fx.store.find_airport("AUS").unwrap().unwrap();

        let stored = fx
            .aggregator
            .submit_report(NewReport {
                airport_id: airport.id,
                wait_minutes: 12,
                terminal: Some("A".to_string()),
                checkpoint: None,
                line_type: LineType::Clear,
            })
            .unwrap();
        assert_eq!(stored.reported_at, now());

        let stats = fx.aggregator.airport_with_stats("AUS").unwrap().unwrap();
        assert_eq!(stats.report_count, 1);
        assert_eq!(stats.latest_report, Some(now()));

        let recent = fx.aggregator.recent_reports("aus").unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, stored.id);
        assert_eq!(fx.aggregator.activity().stats().reports_accepted, 1);
    }

    #[test]
    fn test_submit_for_unknown_airport_fails() {
        let fx = fixture();
        let result = fx.aggregator.submit_report(NewReport {
            airport_id: uuid::Uuid::new_v4(),
            wait_minutes: 5,
            terminal: None,
            checkpoint: None,
            line_type: LineType::Standard,
        });
        assert!(matches!(result, Err(StoreError::UnknownAirport(_))));
        assert_eq!(fx.aggregator.activity().stats().reports_accepted, 0);
    }

    #[test]
    fn test_summary() {
        let fx = fixture();
        for wait in [20, 30, 40] {
            add_report(&fx, "ATL", wait, None, Duration::minutes(10));
        }

        let summary = fx.aggregator.summary().unwrap();
        // ATL community 30, AUS estimate 13
        assert_eq!(
            summary,
            NetworkSummary {
                airport_count: 2,
                total_reports: 3,
                active_airports: 1,
                overall_avg_wait_minutes: Some(22),
            }
        );
    }

    #[test]
    fn test_summary_without_airports() {
        let clock: SharedClock = Arc::new(FixedClock(now()));
        let aggregator = Aggregator::new(
            Arc::new(MemoryStore::with_clock(clock.clone())),
            Estimator::new(clock.clone(), Arc::new(FixedJitter(0.0)), chrono_tz::UTC),
            clock,
            AggregatorSettings::default(),
            create_shared_log(),
        );

        let summary = aggregator.summary().unwrap();
        assert_eq!(summary.airport_count, 0);
        assert_eq!(summary.overall_avg_wait_minutes, None);
    }

    #[test]
    fn test_estimator_runs_for_every_blend() {
        let fx = fixture();
        for wait in [20, 30, 40] {
            add_report(&fx, "ATL", wait, None, Duration::minutes(10));
        }
        fx.aggregator.airports_with_stats().unwrap();
        assert_eq!(fx.aggregator.activity().stats().estimates_produced, 2);
    }

    #[test]
    fn test_stats_serialize_flat_camel_case() {
        let fx = fixture();
        let stats = fx.aggregator.airport_with_stats("ATL").unwrap().unwrap();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["code"], "ATL");
        assert_eq!(json["avgWaitMinutes"], 33);
        assert_eq!(json["dataSource"], "estimated");
        assert_eq!(json["waitLevel"], "long");
        assert!(json["latestReport"].is_null());
    }

    /// Store that fails every call.
    struct BrokenStore;

    impl ReportStore for BrokenStore {
        fn list_airports(&self) -> StoreResult<Vec<Airport>> {
            Err(StoreError::Poisoned)
        }

        fn find_airport(&self, _code: &str) -> StoreResult<Option<Airport>> {
            Err(StoreError::Poisoned)
        }

        fn reports_since(
            &self,
            _airport_id: uuid::Uuid,
            _since: DateTime<Utc>,
        ) -> StoreResult<Vec<WaitTimeReport>> {
            Err(StoreError::Poisoned)
        }

        fn recent_reports(
            &self,
            _airport_id: uuid::Uuid,
            _limit: usize,
        ) -> StoreResult<Vec<WaitTimeReport>> {
            Err(StoreError::Poisoned)
        }

        fn create_report(&self, _report: NewReport) -> StoreResult<WaitTimeReport> {
            Err(StoreError::Poisoned)
        }

        fn insert_report(&self, _report: WaitTimeReport) -> StoreResult<WaitTimeReport> {
            Err(StoreError::Poisoned)
        }

        fn create_airport(&self, _airport: NewAirport) -> StoreResult<Airport> {
            Err(StoreError::Poisoned)
        }

        fn airport_count(&self) -> StoreResult<usize> {
            Err(StoreError::Poisoned)
        }
    }

    /// Store whose airport lookups succeed but whose report reads fail.
    struct UnreadableReports(MemoryStore);

    impl ReportStore for UnreadableReports {
        fn list_airports(&self) -> StoreResult<Vec<Airport>> {
            self.0.list_airports()
        }

        fn find_airport(&self, code: &str) -> StoreResult<Option<Airport>> {
            self.0.find_airport(code)
        }

        fn reports_since(
            &self,
            _airport_id: uuid::Uuid,
            _since: DateTime<Utc>,
        ) -> StoreResult<Vec<WaitTimeReport>> {
            Err(StoreError::Persistence("disk unavailable".to_string()))
        }

        fn recent_reports(
            &self,
            _airport_id: uuid::Uuid,
            _limit: usize,
        ) -> StoreResult<Vec<WaitTimeReport>> {
            Err(StoreError::Persistence("disk unavailable".to_string()))
        }

        fn create_report(&self, report: NewReport) -> StoreResult<WaitTimeReport> {
            self.0.create_report(report)
        }

        fn insert_report(&self, report: WaitTimeReport) -> StoreResult<WaitTimeReport> {
            self.0.insert_report(report)
        }

        fn create_airport(&self, airport: NewAirport) -> StoreResult<Airport> {
            self.0.create_airport(airport)
        }

        fn airport_count(&self) -> StoreResult<usize> {
            self.0.airport_count()
        }
    }

    fn aggregator_over(store: SharedStore) -> Aggregator {
        let clock: SharedClock = Arc::new(FixedClock(now()));
        Aggregator::new(
            store,
            Estimator::new(clock.clone(), Arc::new(FixedJitter(0.0)), chrono_tz::UTC),
            clock,
            AggregatorSettings::default(),
            create_shared_log(),
        )
    }

    #[test]
    fn test_store_failures_propagate() {
        let aggregator = aggregator_over(Arc::new(BrokenStore));

        assert!(matches!(
            aggregator.airports_with_stats(),
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(
            aggregator.airport_with_stats("ATL"),
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(
            aggregator.checkpoint_stats("ATL"),
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(
            aggregator.line_type_stats("ATL"),
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(aggregator.summary(), Err(StoreError::Poisoned)));

        let stats = aggregator.activity().stats();
        assert_eq!(stats.lookups_served, 0);
        assert_eq!(stats.estimates_produced, 0);
    }

    #[test]
    fn test_report_read_failure_does_not_fall_back_to_estimate() {
        let store = MemoryStore::new();
        store
            .create_airport(NewAirport {
                code: "ATL".to_string(),
                name: "Hartsfield-Jackson".to_string(),
                city: "Atlanta".to_string(),
                state: "GA".to_string(),
                terminal_count: 2,
            })
            .unwrap();
        let aggregator = aggregator_over(Arc::new(UnreadableReports(store)));

        assert!(matches!(
            aggregator.airport_with_stats("ATL"),
            Err(StoreError::Persistence(_))
        ));
        assert!(matches!(
            aggregator.airports_with_stats(),
            Err(StoreError::Persistence(_))
        ));
        assert!(matches!(
            aggregator.checkpoint_stats("ATL"),
            Err(StoreError::Persistence(_))
        ));
        assert!(matches!(
            aggregator.recent_reports("ATL"),
            Err(StoreError::Persistence(_))
        ));
        assert_eq!(aggregator.activity().stats().estimates_produced, 0);
    }

    #[test]
    fn test_breakdowns_count_as_lookups() {
        let fx = fixture();
        fx.aggregator.checkpoint_stats("ATL").unwrap();
        fx.aggregator.line_type_stats("ATL").unwrap();
        fx.aggregator.recent_reports("ATL").unwrap();
        fx.aggregator.checkpoint_stats("ZZZ").unwrap();

        assert_eq!(fx.aggregator.activity().stats().lookups_served, 3);
    }
}
