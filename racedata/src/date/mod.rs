// Race date parsing - the fixed YYYY-MM-DD form and the wider ISO-8601 forms

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// The only textual date format accepted at row boundaries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Timestamps with a trailing `Z` or `+HH:MM`/`+HHMM`/`+HH` offset.
const OFFSET_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Parse a date in exactly `YYYY-MM-DD` form (4-digit year, 2-digit month and day).
pub fn parse_race_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

/// Parse either a bare `YYYY-MM-DD` date (midnight) or an ISO-8601 timestamp.
///
/// Accepts hour, minute, second and fractional-second precision, with a `T`
/// or space separator and an optional `Z` or UTC offset. Timestamps carrying
/// an offset keep their wall-clock time; the offset is dropped.
pub fn parse_race_timestamp(input: &str) -> Option<NaiveDateTime> {
    if input.len() == 10 {
        return parse_race_date(input).and_then(|d| d.and_hms_opt(0, 0, 0));
    }

    if parse_race_date(input.get(..10)?).is_none() {
        return None;
    }

    match expand_hour_only(input) {
        Some(expanded) => parse_time_of_day(&expanded),
        None => parse_time_of_day(input),
    }
}

fn parse_time_of_day(input: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            OFFSET_TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// `YYYY-MM-DDTHH[offset]` becomes `YYYY-MM-DDTHH:00[offset]`.
fn expand_hour_only(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    if bytes.len() < 13
        || !matches!(bytes[10], b'T' | b' ')
        || !bytes[11..13].iter().all(u8::is_ascii_digit)
        || bytes.get(13) == Some(&b':')
    {
        return None;
    }
    Some(format!("{}:00{}", &input[..13], &input[13..]))
}
