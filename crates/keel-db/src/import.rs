//! Reading bulk import files into JSON records.
//!
//! Two formats are accepted: JSON Lines (one object per line) and CSV with a
//! header row. Both produce one [`ImportRecord`] per input row, numbered by
//! the line it starts on, so rejections point back at the file. Schema and
//! field validation happen later, in the repository that owns the rows.

use std::path::Path;

use serde_json::{Map, Value};
use serde_jsonlines::json_lines;

use crate::error::DatabaseError;

/// File format of an import, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    JsonLines,
    Csv,
}

impl ImportFormat {
    /// `.csv` reads as CSV; anything else as JSON Lines.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::JsonLines,
        }
    }
}

/// One input row: either a JSON object or the reason it could not be read.
#[derive(Debug)]
pub struct ImportRecord {
    pub line: u32,
    pub value: Result<Value, String>,
}

/// Columns whose cells are read as numbers rather than text.
const NUMERIC_COLUMNS: &[&str] = &["value", "probability", "score", "amount", "budget", "progress"];

/// Read every record of `path`.
///
/// # Errors
///
/// Returns `DatabaseError::Other` when the file cannot be opened or, for CSV,
/// its header row cannot be read. Problems with individual rows are
/// returned as failed records instead.
pub fn read_records(path: &Path, format: ImportFormat) -> Result<Vec<ImportRecord>, DatabaseError> {
    match format {
        ImportFormat::JsonLines => read_json_lines(path),
        ImportFormat::Csv => read_csv(path),
    }
}

fn cannot_read(path: &Path, error: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Other(anyhow::anyhow!("cannot read {}: {error}", path.display()))
}

fn line_number(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn read_json_lines(path: &Path) -> Result<Vec<ImportRecord>, DatabaseError> {
    let lines = json_lines::<Value, _>(path).map_err(|e| cannot_read(path, e))?;
    Ok(lines
        .enumerate()
        .map(|(idx, line)| ImportRecord {
            line: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            value: line.map_err(|e| e.to_string()),
        })
        .collect())
}

fn read_csv(path: &Path) -> Result<Vec<ImportRecord>, DatabaseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| cannot_read(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| cannot_read(path, e))?
        .iter()
        .map(str::to_ascii_lowercase)
        .collect();

    let mut records = Vec::new();
    let mut fallback_line: u64 = 1;
    for row in reader.records() {
        fallback_line += 1;
        let record = match row {
            Ok(row) => {
                let line = row.position().map_or(fallback_line, |p| p.line());
                ImportRecord {
                    line: line_number(line),
                    value: csv_object(&headers, &row),
                }
            }
            Err(error) => {
                let line = error.position().map_or(fallback_line, |p| p.line());
                ImportRecord {
                    line: line_number(line),
                    value: Err(error.to_string()),
                }
            }
        };
        records.push(record);
    }
    Ok(records)
}

/// Blank cells are left out so optional fields fall back to their defaults.
fn csv_object(headers: &[String], row: &csv::StringRecord) -> Result<Value, String> {
    let mut object = Map::new();
    for (header, cell) in headers.iter().zip(row.iter()) {
        if cell.is_empty() {
            continue;
        }
        let value = if NUMERIC_COLUMNS.contains(&header.as_str()) {
            let number: f64 = cell
                .parse()
                .map_err(|_| format!("{header} must be a number, got '{cell}'"))?;
            numeric_value(number)
        } else {
            Value::String(cell.to_string())
        };
        object.insert(header.clone(), value);
    }
    Ok(Value::Object(object))
}

/// Whole numbers become JSON integers so integer fields deserialize.
#[allow(clippy::cast_possible_truncation)]
fn numeric_value(number: f64) -> Value {
    if number.fract().abs() < f64::EPSILON && number.abs() < 9.0e15 {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}
