//! Flexible timestamp parsing.
//!
//! Search bounds may be given in several common layouts; the backend expects
//! them as `YYYY-MM-DDTHH:MM:SS` in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

/// Layout the backend expects for search bounds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%d %H%M%S",
    "%Y%m%d_%H%M",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parse a timestamp in any of the accepted layouts.
///
/// Offsets (RFC 3339) are converted to UTC. Sub-second precision is dropped.
/// Returns `None` when no layout matches.
pub fn parse_flexible_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            raw.strip_suffix('Z')
                .and_then(|s| parse_naive(s.trim_end()))
        })
        .or_else(|| parse_naive(raw))?;

    parsed.with_nanosecond(0)
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Format a timestamp the way the backend expects it.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}
