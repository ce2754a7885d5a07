use crate::error::{RaceDataError, Result};
use crate::row::Row;

/// Fields every loose race row must carry, checked in this order.
pub const REQUIRED_DRIVER_FIELDS: [&str; 2] = ["driver", "team"];

/// Validate that a row has non-empty `driver` and `team` fields.
/// Fails with `MissingField` naming the first field that is absent or blank.
pub fn validate_driver_record(record: &Row) -> Result<()> {
    for field in REQUIRED_DRIVER_FIELDS {
        if is_blank(record, field) {
            return Err(RaceDataError::missing_field(field, None));
        }
    }
    Ok(())
}

/// Validate every row, reporting the first failure with its 1-based row index.
pub fn validate_all(records: &[Row]) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        if let Err(RaceDataError::MissingField { field, .. }) = validate_driver_record(record) {
            return Err(RaceDataError::missing_field(&field, Some(i + 1)));
        }
    }
    Ok(())
}

pub(crate) fn is_blank(record: &Row, field: &str) -> bool {
    !record.contains_key(field) || record.trimmed(field).is_empty()
}
