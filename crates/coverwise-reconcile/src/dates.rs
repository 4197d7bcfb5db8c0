//! Date parsing, ages, and policy tenure.

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// Accepted date layouts, tried in order. The first that parses wins.
pub const DATE_FORMATS: [&str; 5] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d-%b-%Y", "%d %b %Y"];

/// Rendered tenure when the inception date cannot be read.
pub const UNKNOWN_TENURE: &str = "Unknown";

/// Parse a date printed on a policy document.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Completed years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (birth.month(), birth.day());
    today.year() - birth.year() - i32::from(before_birthday)
}

/// Whole years and months a policy has been in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tenure {
    pub years: i32,
    pub months: i32,
}

impl fmt::Display for Tenure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Years {} Months", self.years, self.months)
    }
}

/// Tenure from `start` to `today` in whole months.
///
/// A month counts only once `today` reaches the start's day-of-month, so
/// 12-May-2020 to 10-Jan-2024 is 3 years 7 months, not the 8 a plain
/// calendar-month difference gives. A start date in the future yields zero
/// rather than a negative tenure.
pub fn tenure_between(start: NaiveDate, today: NaiveDate) -> Tenure {
    if start > today {
        return Tenure::default();
    }

    let mut years = today.year() - start.year();
    let mut months = today.month() as i32 - start.month() as i32;
    if today.day() < start.day() {
        months -= 1;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    Tenure { years, months }
}

/// Tenure rendered for display, or [`UNKNOWN_TENURE`] when `start` does not parse.
pub fn describe_tenure(start: &str, today: NaiveDate) -> String {
    parse_date(start)
        .map(|start| tenure_between(start, today).to_string())
        .unwrap_or_else(|| UNKNOWN_TENURE.to_string())
}
