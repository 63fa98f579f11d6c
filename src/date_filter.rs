//! Review date recognition and range filtering.
//!
//! Platforms print dates in many shapes ("March 15, 2023", "2023-03-15",
//! "03/15/2023", "2 days ago"). Recognition walks an ordered list of formats
//! and keeps the first match; everything here is pure, with "today" passed in
//! for relative phrases.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

/// Date-only formats, tried in order. Slashed dates are read month-first when
/// ambiguous; dashed ones day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Formats carrying a time of day; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
];

lazy_static! {
    static ref LEADING_LABEL: Regex =
        Regex::new(r"(?i)^(?:reviewed|posted|published|updated|submitted|written)(?:\s+on)?\s*:?\s*")
            .expect("Invalid date label regex");

    static ref RELATIVE_DATE: Regex = Regex::new(
        r"(?i)^(a|an|one|\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago$"
    )
    .expect("Invalid relative date regex");
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Outcome of checking one review date against the range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateVerdict {
    InRange(NaiveDate),
    BeforeRange(NaiveDate),
    AfterRange(NaiveDate),
    /// No known format matched; the review must be dropped.
    Unrecognized,
}

/// Parse and classify a raw date against `range`.
pub fn check_date(raw: &str, range: &DateRange, today: NaiveDate) -> DateVerdict {
    match parse_review_date(raw, today) {
        Some(date) if date < range.start => DateVerdict::BeforeRange(date),
        Some(date) if date > range.end => DateVerdict::AfterRange(date),
        Some(date) => DateVerdict::InRange(date),
        None => DateVerdict::Unrecognized,
    }
}

/// Recognize a review date in any of the supported formats.
pub fn parse_review_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(raw);
    if text.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(&text) {
        return Some(datetime.date_naive());
    }

    parse_relative(&text, today)
}

fn normalize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    LEADING_LABEL.replace(&collapsed, "").trim().to_string()
}

fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text.to_lowercase().as_str() {
        "today" | "just now" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => {}
    }

    let caps = RELATIVE_DATE.captures(text)?;
    let amount: u32 = match caps[1].to_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        digits => digits.parse().ok()?,
    };

    match caps[2].to_lowercase().as_str() {
        "second" | "minute" | "hour" => Some(today),
        "day" => today.checked_sub_days(Days::new(amount.into())),
        "week" => today.checked_sub_days(Days::new(u64::from(amount) * 7)),
        "month" => today.checked_sub_months(Months::new(amount)),
        "year" => today.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}
