//! In-process report store.
//!
//! Keeps airports and reports in memory behind a read-write lock. When a
//! persistence path is configured the whole store is written out as JSON
//! after every write and reloaded on startup.

use crate::core::clock::{system_clock, SharedClock};
use crate::store::types::{Airport, NewAirport, NewReport, WaitTimeReport};
use crate::store::{ReportStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    airports: Vec<Airport>,
    reports: Vec<WaitTimeReport>,
}

/// Report store held entirely in memory.
pub struct MemoryStore {
    data: RwLock<StoreData>,
    clock: SharedClock,
    persist_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store stamping reports with the wall clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create an empty store stamping reports with the given clock.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            clock,
            persist_path: None,
        }
    }

    /// Create a store backed by a JSON file, loading it if present.
    pub fn with_persistence(path: PathBuf, clock: SharedClock) -> StoreResult<Self> {
        let mut store = Self::with_clock(clock);
        store.persist_path = Some(path);
        store.load()?;
        Ok(store)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreData>> {
        self.data.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreData>> {
        self.data.write().map_err(|_| StoreError::Poisoned)
    }

    fn load(&mut self) -> StoreResult<()> {
        let Some(ref path) = self.persist_path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        let data: StoreData = serde_json::from_str(&content)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        tracing::info!(
            airports = data.airports.len(),
            reports = data.reports.len(),
            "Loaded report store from {:?}",
            path
        );
        *self.write()? = data;
        Ok(())
    }

    fn save(&self, data: &StoreData) -> StoreResult<()> {
        let Some(ref path) = self.persist_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Persistence(e.to_string()))?;
        }
        let json =
            serde_json::to_string(data).map_err(|e| StoreError::Persistence(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| StoreError::Persistence(e.to_string()))
    }

    fn append(&self, report: WaitTimeReport) -> StoreResult<WaitTimeReport> {
        let mut data = self.write()?;
        if !data.airports.iter().any(|a| a.id == report.airport_id) {
            return Err(StoreError::UnknownAirport(report.airport_id));
        }
        data.reports.push(report.clone());
        if let Err(e) = self.save(&data) {
            data.reports.pop();
            return Err(e);
        }
        Ok(report)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportStore for MemoryStore {
    fn list_airports(&self) -> StoreResult<Vec<Airport>> {
        let mut airports = self.read()?.airports.clone();
        airports.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(airports)
    }

    fn find_airport(&self, code: &str) -> StoreResult<Option<Airport>> {
        let code = code.trim().to_uppercase();
        Ok(self.read()?.airports.iter().find(|a| a.code == code).cloned())
    }

    fn reports_since(
        &self,
        airport_id: Uuid,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<WaitTimeReport>> {
        let mut reports: Vec<WaitTimeReport> = self
            .read()?
            .reports
            .iter()
            .filter(|r| r.airport_id == airport_id && r.reported_at >= since)
            .cloned()
            .collect();
        reports.sort_by_key(|r| r.reported_at);
        Ok(reports)
    }

    fn recent_reports(&self, airport_id: Uuid, limit: usize) -> StoreResult<Vec<WaitTimeReport>> {
        let mut reports: Vec<WaitTimeReport> = self
            .read()?
            .reports
            .iter()
            .filter(|r| r.airport_id == airport_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
        reports.truncate(limit);
        Ok(reports)
    }

    fn create_report(&self, report: NewReport) -> StoreResult<WaitTimeReport> {
        self.append(report.into_report(self.clock.now()))
    }

    fn insert_report(&self, report: WaitTimeReport) -> StoreResult<WaitTimeReport> {
        self.append(report)
    }

    fn create_airport(&self, airport: NewAirport) -> StoreResult<Airport> {
        let code = airport.code.trim().to_uppercase();
        let mut data = self.write()?;
        if data.airports.iter().any(|a| a.code == code) {
            return Err(StoreError::DuplicateCode(code));
        }

        let created = Airport {
            id: Uuid::new_v4(),
            code,
            name: airport.name,
            city: airport.city,
            state: airport.state,
            terminal_count: airport.terminal_count,
        };
        data.airports.push(created.clone());
        if let Err(e) = self.save(&data) {
            data.airports.pop();
            return Err(e);
        }
        Ok(created)
    }

    fn airport_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.airports.len())
    }
}
