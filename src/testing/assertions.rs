//! Assertions over parsed records.

use crate::record::{KnownColumn, LogRecord};

/// Assert that `records` carry exactly `expected` URI paths, in order.
///
/// # Panics
///
/// Panics with both sequences on any difference.
pub fn assert_uri_paths(records: &[LogRecord], expected: &[&str]) {
    let actual: Vec<&str> = records
        .iter()
        .map(|r| r.uri_path.as_deref().unwrap_or("<none>"))
        .collect();
    assert_eq!(
        actual, expected,
        "URI path mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that no known column is a key of the record's open field map.
///
/// # Panics
///
/// Panics naming the first leaked column.
pub fn assert_no_known_fields(record: &LogRecord) {
    for column in KnownColumn::ALL {
        assert!(
            !record.fields.contains_key(column.name()),
            "known column `{}` leaked into open fields: {:?}",
            column.name(),
            record.fields
        );
    }
}

/// Assert that the open field map has exactly these keys, in order.
///
/// # Panics
///
/// Panics with both key lists on any difference.
pub fn assert_field_keys(record: &LogRecord, expected: &[&str]) {
    let actual: Vec<&str> = record.fields.keys().collect();
    assert_eq!(
        actual, expected,
        "open field keys mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}
