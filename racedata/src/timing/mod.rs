// Finish-time analytics over the timing-sheet schema
// (`Driver Name`, `Finish Time`, `Race Date`). This schema is separate from
// the `driver`/`team`/`date` rows used by the query engine and the store.

use crate::date::parse_race_date;
use crate::error::{RaceDataError, Result};
use crate::loader::{ensure_exists, load_csv_rows};
use crate::row::Row;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DRIVER_NAME: &str = "Driver Name";
pub const TEAM: &str = "Team";
pub const FINISH_TIME: &str = "Finish Time";
pub const RACE_DATE: &str = "Race Date";

/// Read one finish time per line. Lines that are not numbers are skipped.
pub fn load_finish_times(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let times: Vec<f64> = std::fs::read_to_string(path)?
        .lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .collect();

    if times.is_empty() {
        return Err(RaceDataError::NoData(format!(
            "no valid finish times found in {}",
            path.display()
        )));
    }
    Ok(times)
}

/// Mean of the given finish times.
pub fn calculate_average_finish(times: &[f64]) -> Result<f64> {
    if times.is_empty() {
        return Err(RaceDataError::NoData("no times provided".into()));
    }
    Ok(times.iter().sum::<f64>() / times.len() as f64)
}

pub fn average_finish_from_file(path: impl AsRef<Path>) -> Result<f64> {
    let times = load_finish_times(path)?;
    calculate_average_finish(&times)
}

/// `(name, time)` for every row with a driver name and a non-negative
/// numeric finish time. Other rows are skipped.
pub fn validate_timing_rows(rows: &[Row]) -> Vec<(String, f64)> {
    rows.iter()
        .filter_map(|row| {
            let name = row.trimmed(DRIVER_NAME);
            if name.is_empty() {
                return None;
            }
            let time = row.trimmed(FINISH_TIME).parse::<f64>().ok()?;
            (time >= 0.0).then_some((name, time))
        })
        .collect()
}

/// Sort timing rows by `Race Date`, oldest first unless `descending`.
pub fn sort_rows_by_race_date(rows: &[Row], descending: bool) -> Result<Vec<Row>> {
    let mut keyed = rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<(NaiveDate, Row)> {
            let text = row.trimmed(RACE_DATE);
            if text.is_empty() {
                return Err(RaceDataError::missing_field(RACE_DATE, Some(i + 1)));
            }
            let date = parse_race_date(&text)
                .ok_or_else(|| RaceDataError::invalid_date(&text, Some(i + 1)))?;
            Ok((date, row.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    if descending {
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// One driver's side of a [`DriverComparison`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverAverage {
    pub driver: String,
    /// `None` when the driver has no numeric finish times
    pub average_finish: Option<f64>,
    /// Every row for the driver, timed or not
    pub races: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverComparison {
    pub first: DriverAverage,
    pub second: DriverAverage,
    /// The driver with the lower average; ties go to `second`
    pub winner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPerformance {
    pub team: String,
    /// Rounded to two decimal places
    pub average_finish: f64,
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub finish_time: f64,
}

/// Analytics over a loaded timing sheet. Never empty.
#[derive(Debug, Clone)]
pub struct TimingAnalytics {
    source: Option<PathBuf>,
    rows: Vec<Row>,
}

impl TimingAnalytics {
    /// Load a timing-sheet CSV. Fails with `NotFound` for a missing file and
    /// `NoData` when it has no records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rows = load_csv_rows(path)?;
        let mut analytics = Self::from_rows(rows).map_err(|_| {
            RaceDataError::NoData(format!("no race data found in {}", path.display()))
        })?;
        analytics.source = Some(path.to_path_buf());
        log::debug!("Opened timing sheet {}", path.display());
        Ok(analytics)
    }

    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        if rows.is_empty() {
            return Err(RaceDataError::NoData("no race data provided".into()));
        }
        Ok(TimingAnalytics { source: None, rows })
    }

    pub fn data_source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows whose `Driver Name` equals `driver_name` (case-insensitive).
    pub fn search_driver_results(&self, driver_name: &str) -> Vec<Row> {
        self.rows
            .iter()
            .filter(|row| same_name(row, DRIVER_NAME, driver_name))
            .cloned()
            .collect()
    }

    /// Rows whose `Team` equals `team` (case-insensitive).
    pub fn filter_by_team(&self, team: &str) -> Vec<Row> {
        self.rows
            .iter()
            .filter(|row| same_name(row, TEAM, team))
            .cloned()
            .collect()
    }

    pub fn compare_drivers(&self, first: &str, second: &str) -> DriverComparison {
        let first = self.driver_average(first);
        let second = self.driver_average(second);

        let winner = match (first.average_finish, second.average_finish) {
            (Some(a), Some(b)) if a < b => Some(first.driver.clone()),
            (Some(_), Some(_)) => Some(second.driver.clone()),
            _ => None,
        };

        DriverComparison {
            first,
            second,
            winner,
        }
    }

    /// Average finish and entry count per team, best average first.
    /// Rows without a numeric finish time are not counted.
    pub fn team_performance_summary(&self) -> Vec<TeamPerformance> {
        let mut summary: Vec<TeamPerformance> = self
            .times_by(TEAM)
            .into_iter()
            .map(|(team, times)| TeamPerformance {
                team,
                average_finish: round2(mean(&times)),
                entries: times.len(),
            })
            .collect();
        summary.sort_by(|a, b| a.average_finish.total_cmp(&b.average_finish));
        summary
    }

    /// The `top_n` drivers with the lowest average finish time.
    pub fn top_drivers(&self, top_n: usize) -> Vec<(String, f64)> {
        let mut averages: Vec<(String, f64)> = self
            .times_by(DRIVER_NAME)
            .into_iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, times)| {
                let avg = mean(&times);
                (name, avg)
            })
            .collect();
        averages.sort_by(|a, b| a.1.total_cmp(&b.1));
        averages.truncate(top_n);
        averages
    }

    /// `(Race Date, Finish Time)` for one driver, oldest first.
    pub fn performance_trends(&self, driver_name: &str) -> Result<Vec<TrendPoint>> {
        let mut points = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            if !same_name(row, DRIVER_NAME, driver_name) {
                continue;
            }
            let Some(finish_time) = finish_time(row) else {
                continue;
            };
            let text = row.trimmed(RACE_DATE);
            if text.is_empty() {
                return Err(RaceDataError::missing_field(RACE_DATE, Some(i + 1)));
            }
            let date = parse_race_date(&text)
                .ok_or_else(|| RaceDataError::invalid_date(&text, Some(i + 1)))?;
            points.push(TrendPoint { date, finish_time });
        }
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn driver_average(&self, driver_name: &str) -> DriverAverage {
        let rows: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| same_name(row, DRIVER_NAME, driver_name))
            .collect();
        let times: Vec<f64> = rows.iter().filter_map(|row| finish_time(row)).collect();

        DriverAverage {
            driver: driver_name.to_string(),
            average_finish: calculate_average_finish(&times).ok(),
            races: rows.len(),
        }
    }

    /// Numeric finish times grouped by the trimmed value of `key`, in
    /// first-seen order.
    fn times_by(&self, key: &str) -> Vec<(String, Vec<f64>)> {
        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in &self.rows {
            let Some(time) = finish_time(row) else {
                continue;
            };
            let name = row.trimmed(key);
            let slot = *index.entry(name.clone()).or_insert_with(|| {
                groups.push((name, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(time);
        }
        groups
    }
}

impl fmt::Display for TimingAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimingAnalytics with {} race records", self.rows.len())
    }
}

fn same_name(row: &Row, key: &str, wanted: &str) -> bool {
    row.trimmed(key).to_lowercase() == wanted.trim().to_lowercase()
}

fn finish_time(row: &Row) -> Option<f64> {
    row.trimmed(FINISH_TIME).parse::<f64>().ok()
}

fn mean(times: &[f64]) -> f64 {
    times.iter().sum::<f64>() / times.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_average_from_file_skips_noise() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("times.txt");
        std::fs::write(&path, "10\nDNF\n 20 \n\n").unwrap();

        assert_eq!(load_finish_times(&path).unwrap(), vec![10.0, 20.0]);
        assert_eq!(average_finish_from_file(&path).unwrap(), 15.0);
    }

    #[test]
    fn test_file_without_numbers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("times.txt");
        std::fs::write(&path, "DNF\n").unwrap();

        assert!(matches!(load_finish_times(&path).unwrap_err(), RaceDataError::NoData(_)));
        assert!(matches!(
            load_finish_times(tmp.path().join("missing.txt")).unwrap_err(),
            RaceDataError::NotFound { .. }
        ));
    }

    #[test]
    fn test_average_of_nothing() {
        assert!(calculate_average_finish(&[]).is_err());
        assert_eq!(calculate_average_finish(&[83.0, 84.0, 82.0]).unwrap(), 83.0);
    }

    #[test]
    fn test_validate_timing_rows() {
        let rows = vec![
            Row::from([(DRIVER_NAME, "A"), (FINISH_TIME, "83.5")]),
            Row::from([(DRIVER_NAME, " "), (FINISH_TIME, "80")]),
            Row::from([(DRIVER_NAME, "B"), (FINISH_TIME, "-1")]),
            Row::from([(DRIVER_NAME, "C"), (FINISH_TIME, "fast")]),
        ];
        assert_eq!(validate_timing_rows(&rows), vec![("A".to_string(), 83.5)]);
    }

    #[test]
    fn test_sort_by_race_date() {
        let rows = vec![
            Row::from([(DRIVER_NAME, "A"), (RACE_DATE, "2024-01-02")]),
            Row::from([(DRIVER_NAME, "B"), (RACE_DATE, "2024-01-01")]),
        ];
        let sorted = sort_rows_by_race_date(&rows, false).unwrap();
        assert_eq!(sorted[0].text(DRIVER_NAME), "B");

        let sorted = sort_rows_by_race_date(&rows, true).unwrap();
        assert_eq!(sorted[0].text(DRIVER_NAME), "A");
    }

    #[test]
    fn test_sort_by_race_date_errors() {
        let missing = vec![Row::from([(DRIVER_NAME, "A")])];
        assert!(matches!(
            sort_rows_by_race_date(&missing, false).unwrap_err(),
            RaceDataError::MissingField { .. }
        ));

        let bad = vec![Row::from([(RACE_DATE, "01-02-2024")])];
        assert!(matches!(
            sort_rows_by_race_date(&bad, false).unwrap_err(),
            RaceDataError::InvalidDate { .. }
        ));
    }

    const SHEET: &str = "Driver Name,Team,Finish Time,Race Date\n\
                         Alice,Alpha,90.0,2024-03-01\n\
                         Bob,Beta,84.0,2024-01-10\n\
                         Alice,Alpha,80.0,2024-01-15\n\
                         Carol,Alpha,100.5,2024-02-01\n\
                         Bob,beta,DNF,2024-02-20\n";

    fn sheet() -> (TempDir, TimingAnalytics) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("timing.csv");
        std::fs::write(&path, SHEET).unwrap();
        let analytics = TimingAnalytics::open(&path).unwrap();
        (tmp, analytics)
    }

    #[test]
    fn test_open_timing_sheet() {
        let (tmp, analytics) = sheet();
        assert_eq!(analytics.rows().len(), 5);
        assert_eq!(analytics.data_source(), Some(tmp.path().join("timing.csv").as_path()));
        assert_eq!(analytics.to_string(), "TimingAnalytics with 5 race records");
    }

    #[test]
    fn test_open_rejects_missing_and_empty() {
        let tmp = TempDir::new().unwrap();
        let err = TimingAnalytics::open(tmp.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, RaceDataError::NotFound { .. }));

        let path = tmp.path().join("empty.csv");
        std::fs::write(&path, "Driver Name,Team,Finish Time,Race Date\n").unwrap();
        let err = TimingAnalytics::open(&path).unwrap_err();
        assert!(matches!(err, RaceDataError::NoData(_)));
    }

    #[test]
    fn test_timing_search_and_team_filter_are_exact() {
        let (_tmp, analytics) = sheet();
        assert_eq!(analytics.search_driver_results("ALICE").len(), 2);
        assert!(analytics.search_driver_results("Ali").is_empty());
        assert_eq!(analytics.filter_by_team("beta").len(), 2);
        assert!(analytics.filter_by_team("Alp").is_empty());
    }

    #[test]
    fn test_compare_drivers() {
        let (_tmp, analytics) = sheet();
        let cmp = analytics.compare_drivers("Alice", "Bob");
        assert_eq!(
            cmp.first,
            DriverAverage {
                driver: "Alice".into(),
                average_finish: Some(85.0),
                races: 2,
            }
        );
        assert_eq!(cmp.second.average_finish, Some(84.0));
        assert_eq!(cmp.second.races, 2);
        assert_eq!(cmp.winner.as_deref(), Some("Bob"));

        let cmp = analytics.compare_drivers("Alice", "Zed");
        assert_eq!(cmp.second.races, 0);
        assert_eq!(cmp.winner, None);
    }

    #[test]
    fn test_team_performance_summary() {
        let (_tmp, analytics) = sheet();
        assert_eq!(
            analytics.team_performance_summary(),
            vec![
                TeamPerformance { team: "Beta".into(), average_finish: 84.0, entries: 1 },
                TeamPerformance { team: "Alpha".into(), average_finish: 90.17, entries: 3 },
            ]
        );
    }

    #[test]
    fn test_top_drivers() {
        let (_tmp, analytics) = sheet();
        assert_eq!(
            analytics.top_drivers(2),
            vec![("Bob".to_string(), 84.0), ("Alice".to_string(), 85.0)]
        );
        assert_eq!(analytics.top_drivers(10).len(), 3);
    }

    #[test]
    fn test_performance_trends() {
        let (_tmp, analytics) = sheet();
        let trend = analytics.performance_trends("alice").unwrap();
        let points: Vec<_> = trend.iter().map(|p| (p.date.to_string(), p.finish_time)).collect();
        assert_eq!(
            points,
            vec![("2024-01-15".to_string(), 80.0), ("2024-03-01".to_string(), 90.0)]
        );
    }

    #[test]
    fn test_performance_trends_bad_date() {
        let analytics = TimingAnalytics::from_rows(vec![Row::from([
            (DRIVER_NAME, "A"),
            (FINISH_TIME, "80"),
            (RACE_DATE, "March 1st"),
        ])])
        .unwrap();
        assert!(matches!(
            analytics.performance_trends("A").unwrap_err(),
            RaceDataError::InvalidDate { row: Some(1), .. }
        ));
        assert!(TimingAnalytics::from_rows(Vec::new()).is_err());
    }
}
