// Record loader - rows from .csv/.json files or in-memory lists, with date normalization

use crate::date::parse_race_date;
use crate::error::{RaceDataError, Result};
use crate::row::{rows_from_json, FieldValue, Row};
use std::path::{Path, PathBuf};

/// Where `load_race_data` reads rows from.
#[derive(Debug, Clone)]
pub enum RaceSource {
    /// A `.csv` or `.json` file
    Path(PathBuf),
    /// Rows already in memory; used as-is
    Rows(Vec<Row>),
    /// A dynamic JSON value that must be a list of objects
    Json(serde_json::Value),
}

impl From<&str> for RaceSource {
    fn from(path: &str) -> Self {
        RaceSource::Path(PathBuf::from(path))
    }
}

impl From<&Path> for RaceSource {
    fn from(path: &Path) -> Self {
        RaceSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for RaceSource {
    fn from(path: PathBuf) -> Self {
        RaceSource::Path(path)
    }
}

impl From<Vec<Row>> for RaceSource {
    fn from(rows: Vec<Row>) -> Self {
        RaceSource::Rows(rows)
    }
}

impl From<serde_json::Value> for RaceSource {
    fn from(value: serde_json::Value) -> Self {
        RaceSource::Json(value)
    }
}

/// Supported on-disk formats, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// Load race rows and normalize every non-empty `date` field to a calendar date.
///
/// Fails fast: the first unparseable date aborts the whole load. Rows whose
/// `date` is already a parsed date are left alone, so re-loading normalized
/// output is a no-op.
pub fn load_race_data(source: impl Into<RaceSource>) -> Result<Vec<Row>> {
    let mut rows = match source.into() {
        RaceSource::Path(path) => read_rows(&path)?,
        RaceSource::Rows(rows) => rows,
        RaceSource::Json(value) => rows_from_json(value)?,
    };

    for (i, row) in rows.iter_mut().enumerate() {
        normalize_date(row, i + 1)?;
    }

    log::debug!("Loaded {} race rows", rows.len());
    Ok(rows)
}

/// Read a delimited-text file into rows without any normalization.
pub fn load_csv_rows(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let path = path.as_ref();
    ensure_exists(path)?;
    read_csv(path)
}

fn read_rows(path: &Path) -> Result<Vec<Row>> {
    ensure_exists(path)?;
    match SourceFormat::from_path(path) {
        Some(SourceFormat::Csv) => read_csv(path),
        Some(SourceFormat::Json) => {
            let content = std::fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&content)?;
            rows_from_json(value)
        }
        None => Err(RaceDataError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RaceDataError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Header line names the fields. Short records get null for the missing
/// trailing columns; cells beyond the header are dropped.
pub(crate) fn read_csv(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            log::warn!(
                "{}: record {} has {} cells but the header names {}; extra cells dropped",
                path.display(),
                i + 1,
                record.len(),
                headers.len()
            );
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let value = record
                    .get(col)
                    .map(FieldValue::from)
                    .unwrap_or(FieldValue::Null);
                (name, value)
            })
            .collect();
        rows.push(row);
    }

    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn normalize_date(row: &mut Row, index: usize) -> Result<()> {
    let Some(value) = row.get_mut("date") else {
        return Ok(());
    };
    if value.is_empty() || value.as_date().is_some() {
        return Ok(());
    }

    let text = value.to_string();
    let parsed = parse_race_date(&text).ok_or_else(|| RaceDataError::invalid_date(&text, Some(index)))?;
    *value = FieldValue::Date(parsed);
    Ok(())
}
