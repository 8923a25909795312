//! Locale-invariant coercion of raw column values into typed fields.
//!
//! None of these helpers consult the process locale: integers use Rust's
//! `FromStr`, timestamps a fixed chrono pattern.

use crate::error::CoercionError;
use chrono::NaiveDateTime;

/// Fixed layout of the combined `date` + `time` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// yyyy-MM-dd HH:mm:ss
const TIMESTAMP_LEN: usize = 19;

pub fn parse_i32(column: &'static str, raw: &str) -> Result<i32, CoercionError> {
    raw.parse::<i32>().map_err(|_| CoercionError::Integer {
        column,
        value: raw.to_string(),
        width: 32,
    })
}

pub fn parse_i64(column: &'static str, raw: &str) -> Result<i64, CoercionError> {
    raw.parse::<i64>().map_err(|_| CoercionError::Integer {
        column,
        value: raw.to_string(),
        width: 64,
    })
}

/// Join `date` and `time` with one space and parse the result.
pub fn parse_timestamp(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<NaiveDateTime, CoercionError> {
    let (Some(date), Some(time)) = (date, time) else {
        return Err(CoercionError::MissingTimestamp);
    };
    let combined = format!("{date} {time}");
    // chrono accepts unpadded fields; the log format does not
    if combined.len() != TIMESTAMP_LEN {
        return Err(CoercionError::Timestamp(combined));
    }
    NaiveDateTime::parse_from_str(&combined, TIMESTAMP_FORMAT)
        .map_err(|_| CoercionError::Timestamp(combined))
}
