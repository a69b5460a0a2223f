//! Calendar-day helpers used at the input boundary and by the engine.
//!
//! Everything downstream of this module works on `NaiveDate`: time of day and
//! offsets are dropped once, here, so differences are always whole days.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};

const ISO_DATE: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMPS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("date is empty")]
    Empty,
    #[error("unrecognised date '{0}', expected YYYY-MM-DD")]
    Invalid(String),
}

/// Parse a user-supplied date, dropping any time-of-day component.
///
/// Timestamps with an offset keep the calendar day as seen in that offset.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DateParseError::Empty);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, ISO_DATE) {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(strip_time(&dt));
    }
    NAIVE_TIMESTAMPS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| DateParseError::Invalid(s.to_string()))
}

/// Normalise an instant to its calendar day in its own timezone.
pub fn strip_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// `date + days`, or `None` if the result leaves chrono's calendar.
pub fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// `Jan 01, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "-".to_string())
}
