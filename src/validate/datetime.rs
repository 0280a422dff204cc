//! ISO-8601 datetime validation
//!
//! Accepted forms:
//! - `2024-01-15T10:30:00Z` (UTC designator)
//! - `2024-01-15T10:30:00.123456Z` (fractional seconds)
//! - `2024-01-15T10:30:00+0100` / `+01:00` (numeric offset)
//! - `2024-01-15T10:30:00` (naive, no offset)
//!
//! Bare dates (`2024-01-15`) and non-date text are rejected: the ingestion
//! contract wants instants, not days.

use chrono::{DateTime, NaiveDateTime};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse an ISO-8601 datetime, discarding any zone offset.
///
/// Returns the naive local timestamp, which is what calendar bucketing
/// (e.g. quarter reports) works over.
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    None
}

/// Whether a string is a valid ISO-8601 datetime
pub fn is_iso_datetime(value: &str) -> bool {
    parse_iso_datetime(value).is_some()
}
