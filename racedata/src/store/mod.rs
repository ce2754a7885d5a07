use crate::date::parse_race_timestamp;
use crate::entity::{Driver, RaceResult};
use crate::error::{RaceDataError, Result};
use crate::loader::{ensure_exists, read_csv};
use crate::row::Row;
use chrono::{Datelike, NaiveDateTime};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Columns every row must carry, non-empty, for the store to accept it.
pub const REQUIRED_COLUMNS: [&str; 5] = ["race_id", "date", "circuit", "driver", "team"];

/// A typed, date-ordered collection of race results.
///
/// Loads are all-or-nothing: every row of a call is parsed and validated
/// before anything is appended, so a failed load leaves the store untouched.
#[derive(Debug, Default)]
pub struct RaceDataStore {
    results: Vec<RaceResult>,
    drivers: HashMap<String, Arc<Driver>>,
}

/// A row that passed validation but has not been committed yet.
struct PendingResult {
    race_id: String,
    date: NaiveDateTime,
    circuit: String,
    driver: Driver,
}

impl RaceDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load results from a CSV file with `race_id,date,circuit,driver,team`
    /// columns (others are ignored). Returns the number of rows this call added.
    pub fn load_race_data(&mut self, csv_path: impl AsRef<Path>) -> Result<usize> {
        let path = csv_path.as_ref();
        ensure_exists(path)?;
        let rows = read_csv(path)?;
        let loaded = self.load_rows(&rows)?;
        log::debug!("Loaded {loaded} results from {}", path.display());
        Ok(loaded)
    }

    /// Load results from rows already in memory, with the same rules as
    /// [`RaceDataStore::load_race_data`].
    pub fn load_rows(&mut self, rows: &[Row]) -> Result<usize> {
        let pending = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(row, i + 1))
            .collect::<Result<Vec<_>>>()?;

        let loaded = pending.len();
        for p in pending {
            self.commit(p);
        }
        self.results.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(loaded)
    }

    fn commit(&mut self, pending: PendingResult) {
        let team = pending.driver.team.clone();
        let driver = self
            .drivers
            .entry(pending.driver.driver_id.clone())
            .or_insert_with(|| Arc::new(pending.driver))
            .clone();

        self.results.push(RaceResult {
            race_id: pending.race_id,
            season: pending.date.year(),
            date: pending.date,
            circuit: pending.circuit,
            driver,
            team,
            position: None,
            points: 0.0,
        });
    }

    /// All results, oldest first.
    pub fn results(&self) -> &[RaceResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up a driver by identifier.
    pub fn driver(&self, driver_id: &str) -> Option<&Arc<Driver>> {
        self.drivers.get(driver_id)
    }

    /// Driver identifier to driver, for report building.
    pub fn driver_index(&self) -> &HashMap<String, Arc<Driver>> {
        &self.drivers
    }

    /// Every known driver, ordered by display name.
    pub fn drivers(&self) -> Vec<&Driver> {
        let mut drivers: Vec<&Driver> = self.drivers.values().map(|d| d.as_ref()).collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.driver_id.cmp(&b.driver_id)));
        drivers
    }

    /// Distinct team names across all results, sorted.
    pub fn teams(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| r.team.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Results whose driver identifier or display name equals `name_or_id`
    /// (case-insensitive), optionally limited to one season. Oldest first.
    pub fn search_driver_results(&self, name_or_id: &str, season: Option<i32>) -> Vec<&RaceResult> {
        self.select(|r| r.driver.matches(name_or_id), season)
    }

    /// Results for one team (case-insensitive exact match), optionally limited
    /// to one season. Oldest first.
    pub fn filter_by_team(&self, team: &str, season: Option<i32>) -> Vec<&RaceResult> {
        let wanted = team.trim().to_lowercase();
        self.select(|r| r.team.to_lowercase() == wanted, season)
    }

    /// The full collection sorted by date. Does not change the stored order.
    pub fn sort_races_by_date(&self, ascending: bool) -> Vec<&RaceResult> {
        let mut out: Vec<&RaceResult> = self.results.iter().collect();
        if ascending {
            out.sort_by(|a, b| a.date.cmp(&b.date));
        } else {
            out.sort_by(|a, b| b.date.cmp(&a.date));
        }
        out
    }

    fn select<F>(&self, pred: F, season: Option<i32>) -> Vec<&RaceResult>
    where
        F: Fn(&RaceResult) -> bool,
    {
        let mut out: Vec<&RaceResult> = self
            .results
            .iter()
            .filter(|r| season.map_or(true, |s| r.season == s))
            .filter(|r| pred(r))
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date));
        out
    }
}

fn parse_row(row: &Row, index: usize) -> Result<PendingResult> {
    for column in REQUIRED_COLUMNS {
        if row.trimmed(column).is_empty() {
            return Err(RaceDataError::missing_field(column, Some(index)));
        }
    }

    let date_str = row.trimmed("date");
    let date = parse_race_timestamp(&date_str)
        .ok_or_else(|| RaceDataError::invalid_date(&date_str, Some(index)))?;

    // No driver-id column: the display name doubles as the identifier.
    let driver_name = row.trimmed("driver");
    let driver = Driver::from_record(&Row::from([
        ("driver_id", driver_name.as_str()),
        ("driver_name", driver_name.as_str()),
        ("team", row.trimmed("team").as_str()),
    ]))
    .map_err(|e| match e {
        RaceDataError::MissingField { field, .. } => RaceDataError::missing_field(&field, Some(index)),
        other => other,
    })?;

    Ok(PendingResult {
        race_id: row.trimmed("race_id"),
        date,
        circuit: row.trimmed("circuit"),
        driver,
    })
}
