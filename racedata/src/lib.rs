pub mod config;
pub mod date;
pub mod entity;
pub mod error;
pub mod loader;
pub mod query;
pub mod report;
pub mod row;
pub mod series;
pub mod store;
pub mod timing;
pub mod validation;

pub use config::RaceDataConfig;
pub use entity::{Car, Driver, LapResult, RaceResult};
pub use error::{RaceDataError, Result};
pub use loader::{load_csv_rows, load_race_data, RaceSource};
pub use query::{filter_by_team, search_driver_results, sort_races_by_date};
pub use row::{FieldValue, Row};
pub use store::RaceDataStore;
pub use validation::validate_driver_record;
