//! Time-of-day and date parsing for free-form timestamp text.
//!
//! Confirmation timestamps arrive as date-time text in whatever layout the
//! exporting tool produced. Only the wall-clock time (or the calendar date) is
//! kept. Text that matches none of the accepted layouts is treated as missing,
//! never as an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Date-time layouts without a UTC offset, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Date-time layouts carrying a UTC offset (RFC 3339 is tried first).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.naive_local());
        }
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn parse_bare_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parse the time-of-day out of free-form date-time text.
///
/// Offsets keep the wall-clock time as written. Date-only text maps to
/// midnight. Returns `None` for empty or unparseable text.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(dt) = parse_datetime(text) {
        return Some(dt.time());
    }
    if let Some(t) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
    {
        return Some(t);
    }
    parse_bare_date(text).map(|_| NaiveTime::MIN)
}

/// Parse the calendar date out of date or date-time text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_bare_date(text).or_else(|| parse_datetime(text).map(|dt| dt.date()))
}

/// `HH:MM` rendering used for range bounds in option lists.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
