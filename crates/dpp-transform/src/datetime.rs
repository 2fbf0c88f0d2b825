//! Datetime parsing for the `datetime` transform.
//!
//! Source systems disagree on date formats; parsing tries a fixed list of
//! common ones in order instead of guessing from locale. Date-only inputs
//! promote to midnight so every parse yields a full timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Default rendering, ISO 8601 without sub-second precision.
pub const ISO_8601: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse with an explicit format. A date-only format yields midnight.
pub fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Parse without a known format by trying common renderings in order.
pub fn parse_auto(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Offset-carrying timestamps keep their written clock time.
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.naive_local());
    }
    try_datetime_formats(trimmed).or_else(|| {
        try_date_formats(trimmed).map(|date| date.and_time(NaiveTime::MIN))
    })
}

fn try_datetime_formats(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%d-%b-%Y %H:%M:%S", // 15-Jan-2024 10:30:00
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn try_date_formats(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y", // 15-Jan-2024
        "%d/%m/%Y",
        "%d.%m.%Y",
        "%Y%m%d",
        "%b %d, %Y", // Jan 15, 2024
        "%d %b %Y",
    ];
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}
