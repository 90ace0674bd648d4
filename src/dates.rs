//! Date normalization for shelf text and feed timestamps.
//!
//! Shelf pages print dates as `Feb 08, 2023` or `Feb 2023` (day implied as
//! the 1st). Feeds carry RFC 2822 timestamps, occasionally RFC 3339 ones.

use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static LEAP_SECOND_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2}):6[01](\D|$)").expect("valid leap second regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("empty date")]
    Empty,

    #[error("unrecognized date '{0}'")]
    Unrecognized(String),
}

/// Parse a shelf date: `Mon DD, YYYY`, or `Mon YYYY` with the day set to 1.
pub fn parse_shelf_date(text: &str) -> Result<NaiveDate, DateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DateError::Empty);
    }

    let parsed = if text.contains(',') {
        NaiveDate::parse_from_str(text, "%b %d, %Y")
    } else {
        NaiveDate::parse_from_str(&format!("1 {text}"), "%d %b %Y")
    };

    parsed.map_err(|_| DateError::Unrecognized(text.to_string()))
}

/// Parse a wire timestamp, clamping leap seconds (60, 61) to 59.
pub fn parse_wire_timestamp(text: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DateError::Empty);
    }

    let clamped = LEAP_SECOND_REGEX.replace(text, "${1}:59${2}");

    DateTime::parse_from_rfc2822(&clamped)
        .or_else(|_| DateTime::parse_from_rfc3339(&clamped))
        .map_err(|_| DateError::Unrecognized(text.to_string()))
}

/// Calendar date of a wire timestamp in its own offset.
pub fn parse_wire_date(text: &str) -> Result<NaiveDate, DateError> {
    parse_wire_timestamp(text).map(|ts| ts.date_naive())
}

/// Lenient variant for feeds: anything unparseable is simply absent.
pub fn wire_date_or_absent(text: Option<&str>) -> Option<NaiveDate> {
    text.and_then(|t| parse_wire_date(t).ok())
}
