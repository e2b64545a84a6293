use anyhow::Context;
use chrono::NaiveDate;
use keel_core::month::Month;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

pub fn parse_optional_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|value| parse_enum(value, field)).transpose()
}

/// `YYYY-MM`.
pub fn parse_month(raw: &str) -> anyhow::Result<Month> {
    raw.parse::<Month>().map_err(anyhow::Error::from)
}

pub fn parse_optional_month(raw: Option<&str>) -> anyhow::Result<Option<Month>> {
    raw.map(parse_month).transpose()
}

/// The given month, or the current one.
pub fn month_or_current(raw: Option<&str>) -> anyhow::Result<Month> {
    Ok(parse_optional_month(raw)?.unwrap_or_else(Month::current))
}

/// `YYYY-MM-DD`.
pub fn parse_date(raw: &str, field: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid {field} '{raw}': expected YYYY-MM-DD"))
}

pub fn parse_optional_date(raw: Option<&str>, field: &str) -> anyhow::Result<Option<NaiveDate>> {
    raw.map(|value| parse_date(value, field)).transpose()
}

/// An optional text flag where an empty value clears the column.
pub fn clearable(raw: Option<&str>) -> Option<Option<String>> {
    raw.map(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// `None` for a blank flag value; used where an empty value clears a date.
pub fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
