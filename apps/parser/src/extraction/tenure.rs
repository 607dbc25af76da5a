use chrono::NaiveDate;

use crate::extraction::dates::{ResumeDate, YearMonth};

/// Elapsed years between `start` and `end`, measured in whole months.
///
/// An ongoing end resolves to `reference_date`. Unknown starts, unknown ends
/// and reversed ranges all yield 0.0; the result is never negative.
pub fn tenure_years(start: ResumeDate, end: ResumeDate, reference_date: NaiveDate) -> f64 {
    resolve_tenure(start, end, reference_date).unwrap_or(0.0)
}

/// Same as [`tenure_years`] but distinguishes "could not compute" (`None`)
/// from a genuine zero-length tenure.
pub fn resolve_tenure(start: ResumeDate, end: ResumeDate, reference_date: NaiveDate) -> Option<f64> {
    let start = start.month()?;
    let end = match end {
        ResumeDate::Month(ym) => ym,
        ResumeDate::Ongoing => YearMonth::from_date(reference_date),
        ResumeDate::Unknown => return None,
    };

    let months = start.months_until(end);
    if months < 0 {
        return None;
    }
    Some(months as f64 / 12.0)
}
