//! Row-to-entry parsing helpers.
//!
//! Handles the dual datetime format issue (`SQLite`'s `datetime('now')` vs
//! Rust's `to_rfc3339()`) and the integer encoding of SoT values.

use chrono::{DateTime, Utc};
use wf_core::{Daystamp, SotEntry};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Decode the stored 0/1 integer.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for anything other than 0 or 1.
pub fn value_from_int(raw: i64) -> Result<bool, DatabaseError> {
    match raw {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DatabaseError::InvalidState(format!(
            "SoT value {other} outside {{0, 1}}"
        ))),
    }
}

/// Convert a `records` row (`daystamp, value, updated_at`) into an entry.
///
/// # Errors
///
/// Returns `DatabaseError` if a column is missing or holds invalid data.
pub fn row_to_entry(row: &libsql::Row) -> Result<SotEntry, DatabaseError> {
    let raw_day = row.get::<String>(0)?;
    let daystamp: Daystamp = raw_day
        .parse()
        .map_err(|e| DatabaseError::InvalidState(format!("{e}")))?;
    Ok(SotEntry {
        daystamp,
        value: value_from_int(row.get::<i64>(1)?)?,
        updated_at: parse_datetime(&row.get::<String>(2)?)?,
    })
}
