use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Stored form of `visit_logs.timestamp`: ISO-8601, local clock, microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
/// Stored form of `visit_logs.date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Accepts timestamps with or without a fractional part, which covers rows
/// written by older writers that dropped a zero microsecond field.
pub fn parse_timestamp(value: &str, field: &str) -> Result<NaiveDateTime> {
    value
        .parse::<NaiveDateTime>()
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|err| anyhow!("failed to parse {field} '{value}': {err}"))
}
