use crate::error::{RaceDataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Racing series with a per-series lap multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceSeries {
    #[serde(rename = "f1")]
    Formula1,
    Nascar,
    IndyCar,
}

impl RaceSeries {
    pub fn multiplier(self) -> f64 {
        match self {
            RaceSeries::Formula1 => 2.5,
            RaceSeries::Nascar => 1.2,
            RaceSeries::IndyCar => 1.8,
        }
    }
}

impl fmt::Display for RaceSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RaceSeries::Formula1 => "F1",
            RaceSeries::Nascar => "NASCAR",
            RaceSeries::IndyCar => "IndyCar",
        })
    }
}

impl FromStr for RaceSeries {
    type Err = RaceDataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f1" | "formula1" => Ok(RaceSeries::Formula1),
            "nascar" => Ok(RaceSeries::Nascar),
            "indycar" => Ok(RaceSeries::IndyCar),
            other => Err(RaceDataError::WrongType(format!(
                "unknown race series '{other}' (expected f1, nascar or indycar)"
            ))),
        }
    }
}

/// Anything that can produce a performance score.
pub trait PerformanceScore {
    fn performance_score(&self) -> f64;

    fn label(&self) -> String;
}

/// A race in a given series; scores `laps * series multiplier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRace {
    pub name: String,
    pub laps: u32,
    pub series: RaceSeries,
}

impl SeriesRace {
    pub fn new(name: impl Into<String>, laps: u32, series: RaceSeries) -> Self {
        SeriesRace {
            name: name.into(),
            laps,
            series,
        }
    }
}

impl PerformanceScore for SeriesRace {
    fn performance_score(&self) -> f64 {
        f64::from(self.laps) * self.series.multiplier()
    }

    fn label(&self) -> String {
        self.series.to_string()
    }
}

impl FromStr for SeriesRace {
    type Err = RaceDataError;

    /// Parses `series:name:laps`, e.g. `f1:Monaco:78`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let (Some(series), Some(name), Some(laps)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RaceDataError::WrongType(format!(
                "expected series:name:laps, got '{s}'"
            )));
        };
        let laps = laps.trim().parse::<u32>().map_err(|_| {
            RaceDataError::WrongType(format!("laps must be a whole number, got '{laps}'"))
        })?;
        Ok(SeriesRace::new(name.trim(), laps, series.parse()?))
    }
}

/// Holds a set of scorable races.
#[derive(Default)]
pub struct RaceManager {
    races: Vec<Box<dyn PerformanceScore>>,
}

impl RaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_race(&mut self, race: impl PerformanceScore + 'static) {
        self.races.push(Box::new(race));
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    pub fn total_score(&self) -> f64 {
        self.races.iter().map(|r| r.performance_score()).sum()
    }

    /// One `"{label} - score: {score}"` line per race, in insertion order.
    pub fn summaries(&self) -> Vec<String> {
        self.races
            .iter()
            .map(|r| format!("{} - score: {}", r.label(), r.performance_score()))
            .collect()
    }
}
