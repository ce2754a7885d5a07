// Query engine - driver search, team filter and date sort over loose rows.
// None of these mutate their input; each returns a new Vec.

use crate::date::parse_race_date;
use crate::error::{RaceDataError, Result};
use crate::row::{FieldValue, Row};
use chrono::NaiveDate;

/// Case-insensitive substring match on the `driver` field.
/// Rows without a driver read as "" and only match an empty query.
pub fn search_driver_results(data: &[Row], driver_name: &str) -> Vec<Row> {
    let needle = driver_name.to_lowercase();
    data.iter()
        .filter(|row| row.text("driver").to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Case-insensitive exact match on the trimmed `team` field.
pub fn filter_by_team(data: &[Row], team_name: &str) -> Vec<Row> {
    let wanted = team_name.trim().to_lowercase();
    data.iter()
        .filter(|row| row.trimmed("team").to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Sort rows by `date`, oldest first unless `descending`.
///
/// Each date may be an already-parsed date or a `YYYY-MM-DD` string; the
/// returned rows carry the parsed form. Ties keep their input order. Any
/// unresolvable date fails the whole sort.
pub fn sort_races_by_date(data: &[Row], descending: bool) -> Result<Vec<Row>> {
    let mut keyed = data
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<(NaiveDate, Row)> {
            let date = resolve_date(row, i + 1)?;
            let mut row = row.clone();
            row.insert("date", date);
            Ok((date, row))
        })
        .collect::<Result<Vec<_>>>()?;

    if descending {
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

fn resolve_date(row: &Row, index: usize) -> Result<NaiveDate> {
    match row.get("date") {
        Some(FieldValue::Date(d)) => Ok(*d),
        Some(FieldValue::Text(s)) => {
            parse_race_date(s).ok_or_else(|| RaceDataError::invalid_date(s.as_str(), Some(index)))
        }
        Some(other) => Err(RaceDataError::invalid_date(other.to_string(), Some(index))),
        None => Err(RaceDataError::invalid_date("", Some(index))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_race_data;
    use pretty_assertions::assert_eq;

    fn grid() -> Vec<Row> {
        vec![
            Row::from([("driver", "Max Verstappen"), ("team", "Red Bull"), ("date", "2024-03-02"), ("race_id", "1")]),
            Row::from([("driver", "Lewis Hamilton"), ("team", "mercedes"), ("date", "2024-02-20"), ("race_id", "2")]),
            Row::from([("driver", "George Russell"), ("team", "Mercedes AMG"), ("date", "2024-03-02"), ("race_id", "3")]),
            Row::from([("team", " Mercedes "), ("date", "2024-01-15"), ("race_id", "4")]),
        ]
    }

    fn ids(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.text("race_id")).collect()
    }

    #[test]
    fn test_search_is_substring_and_case_insensitive() {
        let found = search_driver_results(&grid(), "max");
        assert_eq!(ids(&found), vec!["1"]);

        let found = search_driver_results(&grid(), "HAM");
        assert_eq!(ids(&found), vec!["2"]);
    }

    #[test]
    fn test_search_missing_driver_only_matches_empty_query() {
        assert_eq!(ids(&search_driver_results(&grid(), "")), vec!["1", "2", "3", "4"]);
        assert!(search_driver_results(&grid(), "zzz").is_empty());
    }

    #[test]
    fn test_filter_by_team_is_exact() {
        let found = filter_by_team(&grid(), "Mercedes");
        assert_eq!(ids(&found), vec!["2", "4"]);
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let data = grid();
        let before = data.clone();
        let _ = search_driver_results(&data, "max");
        let _ = filter_by_team(&data, "Mercedes");
        let _ = sort_races_by_date(&data, true).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn test_sort_ascending_is_stable() {
        let sorted = sort_races_by_date(&grid(), false).unwrap();
        assert_eq!(ids(&sorted), vec!["4", "2", "1", "3"]);
        assert!(sorted.iter().all(|r| r.get("date").and_then(|d| d.as_date()).is_some()));
    }

    #[test]
    fn test_sort_descending_keeps_tie_order() {
        let sorted = sort_races_by_date(&grid(), true).unwrap();
        assert_eq!(ids(&sorted), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn test_sort_mixes_parsed_and_text_dates() {
        let mut data = load_race_data(vec![Row::from([("date", "2024-05-05"), ("race_id", "a")])]).unwrap();
        data.push(Row::from([("date", "2024-05-04"), ("race_id", "b")]));

        let sorted = sort_races_by_date(&data, false).unwrap();
        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_after_load_is_monotonic() {
        let loaded = load_race_data(grid()).unwrap();
        let asc = sort_races_by_date(&loaded, false).unwrap();
        let dates: Vec<_> = asc.iter().filter_map(|r| r.get("date").and_then(|d| d.as_date())).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));

        let desc = sort_races_by_date(&loaded, true).unwrap();
        let dates: Vec<_> = desc.iter().filter_map(|r| r.get("date").and_then(|d| d.as_date())).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_rejects_bad_date() {
        let mut data = grid();
        data.push(Row::from([("date", "not-a-date"), ("race_id", "5")]));

        match sort_races_by_date(&data, false).unwrap_err() {
            RaceDataError::InvalidDate { value, row } => {
                assert_eq!(value, "not-a-date");
                assert_eq!(row, Some(5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sort_rejects_missing_date() {
        let err = sort_races_by_date(&[Row::from([("race_id", "1")])], false).unwrap_err();
        assert!(matches!(err, RaceDataError::InvalidDate { row: Some(1), .. }));
    }
}
