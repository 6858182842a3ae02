//! Column conversions for the SQLite backend, which stores UUIDs,
//! timestamps and dates as TEXT.

use super::DbError;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Serialization(e.to_string()))
}

pub(crate) fn parse_optional_uuid(s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Serialization(e.to_string()))
}

pub(crate) fn parse_optional_timestamp(
    s: Option<String>,
) -> Result<Option<DateTime<Utc>>, DbError> {
    s.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| DbError::Serialization(e.to_string()))
}

pub(crate) fn parse_optional_date(s: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    s.as_deref().map(parse_date).transpose()
}

/// Parses a stored enum value, reporting the column on failure.
pub(crate) fn parse_enum<T>(
    value: &str,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, DbError> {
    parse(value).ok_or_else(|| {
        DbError::Serialization(format!("invalid value '{}' in column {}", value, column))
    })
}

pub(crate) fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
