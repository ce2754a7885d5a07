// Typed race entities built from validated rows

use crate::error::{RaceDataError, Result};
use crate::row::Row;
use crate::validation::is_blank;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A validated driver. `driver_id`, `name` and `team` are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Driver {
    pub driver_id: String,
    pub name: String,
    pub team: String,
    pub nationality: Option<String>,
}

impl Driver {
    /// Build a driver from a record carrying `driver_id`, `driver_name` and
    /// `team` (plus an optional `nationality`). Values are trimmed.
    pub fn from_record(record: &Row) -> Result<Self> {
        for field in ["driver_id", "driver_name", "team"] {
            if is_blank(record, field) {
                return Err(RaceDataError::missing_field(field, None));
            }
        }

        let nationality = Some(record.trimmed("nationality")).filter(|n| !n.is_empty());

        Ok(Driver {
            driver_id: record.trimmed("driver_id"),
            name: record.trimmed("driver_name"),
            team: record.trimmed("team"),
            nationality,
        })
    }

    /// Case-insensitive exact match against either the identifier or the display name.
    pub fn matches(&self, name_or_id: &str) -> bool {
        let key = name_or_id.trim().to_lowercase();
        self.driver_id.to_lowercase() == key || self.name.to_lowercase() == key
    }
}

/// One driver's entry in one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResult {
    pub race_id: String,
    pub date: NaiveDateTime,
    pub circuit: String,
    /// Calendar year of `date`
    pub season: i32,
    pub driver: Arc<Driver>,
    /// Team at the time of this race
    pub team: String,
    /// `None` when the finishing position is unknown (DNF)
    pub position: Option<u32>,
    pub points: f64,
}

impl RaceResult {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn is_dnf(&self) -> bool {
        self.position.is_none()
    }
}

/// A car's result in one race, with its fastest lap in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapResult {
    pub race_name: String,
    pub position: Option<u32>,
    pub lap_time: f64,
    pub points: f64,
}

/// Core metadata of a [`Car`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarDetails {
    pub team: String,
    pub driver: Arc<Driver>,
    pub engine_maker: String,
    pub model_year: i32,
}

/// A team's car for one season and the results it has collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    model_year: i32,
    team: String,
    engine_maker: String,
    driver: Arc<Driver>,
    results: Vec<LapResult>,
}

impl Car {
    pub fn new(
        model_year: i32,
        team: impl Into<String>,
        engine_maker: impl Into<String>,
        driver: Arc<Driver>,
    ) -> Self {
        Car {
            model_year,
            team: team.into(),
            engine_maker: engine_maker.into(),
            driver,
            results: Vec::new(),
        }
    }

    pub fn details(&self) -> CarDetails {
        CarDetails {
            team: self.team.clone(),
            driver: Arc::clone(&self.driver),
            engine_maker: self.engine_maker.clone(),
            model_year: self.model_year,
        }
    }

    pub fn add_result(&mut self, result: LapResult) {
        self.results.push(result);
    }

    /// Results in insertion order.
    pub fn results(&self) -> &[LapResult] {
        &self.results
    }

    /// The result with the lowest lap time; the earliest one wins a tie.
    pub fn best_lap(&self) -> Option<&LapResult> {
        self.results
            .iter()
            .reduce(|best, r| if r.lap_time < best.lap_time { r } else { best })
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) - Driver: {}",
            self.model_year, self.team, self.engine_maker, self.driver.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_driver_from_record() {
        let row = Row::from([
            ("driver_id", " ham "),
            ("driver_name", "Lewis Hamilton"),
            ("team", "Mercedes"),
            ("nationality", "GBR"),
        ]);
        let driver = Driver::from_record(&row).unwrap();
        assert_eq!(
            driver,
            Driver {
                driver_id: "ham".into(),
                name: "Lewis Hamilton".into(),
                team: "Mercedes".into(),
                nationality: Some("GBR".into()),
            }
        );
    }

    #[test]
    fn test_driver_requires_fields_in_order() {
        let row = Row::from([("driver_name", "Lewis Hamilton")]);
        let err = Driver::from_record(&row).unwrap_err();
        assert!(matches!(err, RaceDataError::MissingField { ref field, .. } if field == "driver_id"));

        let row = Row::from([("driver_id", "ham"), ("driver_name", "Lewis"), ("team", " ")]);
        let err = Driver::from_record(&row).unwrap_err();
        assert!(matches!(err, RaceDataError::MissingField { ref field, .. } if field == "team"));
    }

    #[test]
    fn test_driver_matches_id_or_name() {
        let driver = Driver {
            driver_id: "VER".into(),
            name: "Max Verstappen".into(),
            team: "Red Bull".into(),
            nationality: None,
        };
        assert!(driver.matches("ver"));
        assert!(driver.matches(" max verstappen "));
        assert!(!driver.matches("max"));
    }

    fn lap(race: &str, position: u32, lap_time: f64, points: f64) -> LapResult {
        LapResult {
            race_name: race.into(),
            position: Some(position),
            lap_time,
            points,
        }
    }

    #[test]
    fn test_car_details_and_display() {
        let driver = Arc::new(Driver {
            driver_id: "LEC".into(),
            name: "Charles Leclerc".into(),
            team: "Ferrari".into(),
            nationality: None,
        });
        let car = Car::new(2025, "Ferrari", "Ferrari", Arc::clone(&driver));

        let details = car.details();
        assert_eq!(details.team, "Ferrari");
        assert_eq!(details.model_year, 2025);
        assert_eq!(details.driver, driver);
        assert_eq!(car.to_string(), "2025 Ferrari (Ferrari) - Driver: Charles Leclerc");
        assert!(car.results().is_empty());
        assert_eq!(car.best_lap(), None);
    }

    #[test]
    fn test_car_best_lap() {
        let driver = Arc::new(Driver {
            driver_id: "LEC".into(),
            name: "Charles Leclerc".into(),
            team: "Ferrari".into(),
            nationality: None,
        });
        let mut car = Car::new(2025, "Ferrari", "Ferrari", driver);
        car.add_result(lap("Monaco GP", 1, 73.254, 25.0));
        car.add_result(lap("Italian GP", 3, 71.982, 15.0));
        car.add_result(lap("Dutch GP", 2, 71.982, 18.0));

        assert_eq!(car.results().len(), 3);
        assert_eq!(car.results()[0].position, Some(1));
        assert_eq!(car.best_lap().map(|r| r.race_name.as_str()), Some("Italian GP"));
    }
}
