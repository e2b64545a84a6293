//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual
//! datetime format (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};
use keel_core::month::Month;

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

/// Parse a `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` on malformed dates.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// Parse an optional `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is malformed.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_date(s)?)),
        _ => Ok(None),
    }
}

/// Parse a `YYYY-MM` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` on malformed months.
pub fn parse_month(s: &str) -> Result<Month, DatabaseError> {
    s.parse()
        .map_err(|e| DatabaseError::Query(format!("Failed to parse month: {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all keel-core enums, which use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER column into a `u32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the value is negative or too large.
pub fn get_u32(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u32::try_from(raw)
        .map_err(|_| DatabaseError::Query(format!("column {idx}: {raw} out of range for u32")))
}

/// Read an INTEGER column holding 0–100 or 1–5 into a `u8`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the value does not fit.
pub fn get_u8(row: &libsql::Row, idx: i32) -> Result<u8, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u8::try_from(raw)
        .map_err(|_| DatabaseError::Query(format!("column {idx}: {raw} out of range for u8")))
}

/// Read an INTEGER 0/1 flag.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Optional text parameter: `NULL` for `None`.
#[must_use]
pub fn opt_text(value: Option<&str>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |v| libsql::Value::Text(v.to_string()))
}

/// Optional real parameter: `NULL` for `None`.
#[must_use]
pub const fn opt_real(value: Option<f64>) -> libsql::Value {
    match value {
        Some(v) => libsql::Value::Real(v),
        None => libsql::Value::Null,
    }
}

/// Optional date parameter as `YYYY-MM-DD`.
#[must_use]
pub fn opt_date(value: Option<NaiveDate>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |d| libsql::Value::Text(d.to_string()))
}

/// Quote each whitespace-separated term so user input cannot inject FTS5 syntax.
///
/// `"q3 roadmap"` becomes `"q3" "roadmap"` (implicit AND). Returns `None`
/// when the query has no terms.
#[must_use]
pub fn fts_query(raw: &str) -> Option<String> {
    let terms: Vec<String> = raw
        .split_whitespace()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}
