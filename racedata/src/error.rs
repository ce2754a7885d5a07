use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaceDataError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported format: {} (only .csv or .json files are supported)", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Wrong argument type: {0}")]
    WrongType(String),

    #[error("Missing required field '{field}'{}", row_suffix(.row))]
    MissingField { field: String, row: Option<usize> },

    #[error("Invalid date format: '{value}'{}", row_suffix(.row))]
    InvalidDate { value: String, row: Option<usize> },

    #[error("File {} already exists and overwrite is false", .path.display())]
    DuplicateTarget { path: PathBuf },

    #[error("No data: {0}")]
    NoData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(n) => format!(" in row {n}"),
        None => String::new(),
    }
}

impl RaceDataError {
    pub(crate) fn missing_field(field: &str, row: Option<usize>) -> Self {
        RaceDataError::MissingField {
            field: field.to_string(),
            row,
        }
    }

    pub(crate) fn invalid_date(value: impl Into<String>, row: Option<usize>) -> Self {
        RaceDataError::InvalidDate {
            value: value.into(),
            row,
        }
    }
}

pub type Result<T> = std::result::Result<T, RaceDataError>;
