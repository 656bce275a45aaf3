//! Calendar-date helpers shared by service rules and the demo runner.
//!
//! # Responsibility
//! - Parse and format `YYYY-MM-DD` date values.
//! - Answer window/remaining-day questions used by due-date rules.

use chrono::{Duration, Local, NaiveDate};

/// Canonical storage format for date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Returns the local date `days` days from now.
pub fn future_date(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

/// Parses a `YYYY-MM-DD` string. Returns `None` for any other shape.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Returns whether `date` lies in `[start, end]` inclusive.
pub fn is_in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

/// Days from `reference` until `due`; negative when `due` is in the past.
pub fn days_remaining(due: NaiveDate, reference: NaiveDate) -> i64 {
    (due - reference).num_days()
}
