//! Date Normalizer: turns free-form resume dates into calendar months.
//!
//! Unparsable input never fails: it degrades to `ResumeDate::Unknown`.
//! "Present"-style end dates map to `ResumeDate::Ongoing`, which is not a
//! calendar value and only resolves against a caller-supplied reference date.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Words that mark a position as still held. Compared case-insensitively
/// against the whole trimmed input.
const ONGOING_MARKERS: &[&str] = &[
    "present",
    "current",
    "currently",
    "now",
    "ongoing",
    "today",
    "to date",
    "to present",
];

const MONTH_NAMES: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3,9})\.?,?\s+(\d{4})$").expect("valid regex"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").expect("valid regex"));
static ISO_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("valid regex"));
static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"));
static MONTH_SLASH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/](\d{4})$").expect("valid regex"));
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("valid regex"));

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` for months outside 1..=12 or implausible years.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (MIN_YEAR..=MAX_YEAR).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Signed number of whole months from `self` to `later`.
    pub fn months_until(self, later: YearMonth) -> i32 {
        (later.year - self.year) * 12 + (later.month as i32 - self.month as i32)
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Result of normalizing a resume date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDate {
    Month(YearMonth),
    /// The position has no end date.
    Ongoing,
    Unknown,
}

impl ResumeDate {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ResumeDate::Unknown)
    }

    pub fn month(&self) -> Option<YearMonth> {
        match self {
            ResumeDate::Month(ym) => Some(*ym),
            _ => None,
        }
    }
}

/// Parses a free-form date such as "May 2018", "Jan 2024", "2020", "2019-03-15" or "Present".
pub fn parse(text: &str) -> ResumeDate {
    let cleaned = text.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("null") {
        return ResumeDate::Unknown;
    }

    let lowered = cleaned.to_lowercase();
    if ONGOING_MARKERS.contains(&lowered.as_str()) {
        return ResumeDate::Ongoing;
    }

    parse_calendar(cleaned)
        .map(ResumeDate::Month)
        .unwrap_or(ResumeDate::Unknown)
}

/// True iff the end date marks a position that is still held.
pub fn is_current(end: ResumeDate) -> bool {
    matches!(end, ResumeDate::Ongoing)
}

/// Parses a full calendar date when the input carries a day component.
pub fn parse_full_date(text: &str) -> Option<NaiveDate> {
    let cleaned = text.trim();
    if let Some(caps) = ISO_DATE.captures(cleaned) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }
    if let Some(caps) = US_DATE.captures(cleaned) {
        return NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        );
    }
    None
}

fn parse_calendar(cleaned: &str) -> Option<YearMonth> {
    if let Some(caps) = MONTH_YEAR.captures(cleaned) {
        let month = month_from_name(&caps[1])?;
        return YearMonth::new(caps[2].parse().ok()?, month);
    }
    if let Some(date) = parse_full_date(cleaned) {
        return YearMonth::new(date.year(), date.month());
    }
    if let Some(caps) = ISO_MONTH.captures(cleaned) {
        return YearMonth::new(caps[1].parse().ok()?, caps[2].parse().ok()?);
    }
    if let Some(caps) = MONTH_SLASH_YEAR.captures(cleaned) {
        return YearMonth::new(caps[2].parse().ok()?, caps[1].parse().ok()?);
    }
    if let Some(caps) = YEAR_ONLY.captures(cleaned) {
        return YearMonth::new(caps[1].parse().ok()?, 1);
    }
    None
}

/// Accepts full month names and their three-letter abbreviations ("Sept" too).
fn month_from_name(name: &str) -> Option<u32> {
    let lowered = name.to_lowercase();
    if lowered == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|full| *full == lowered || (lowered.len() == 3 && full.starts_with(&lowered)))
        .map(|idx| idx as u32 + 1)
}
