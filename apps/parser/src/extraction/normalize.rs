//! Column normalization applied right before a record is persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::extraction::catalogue::{Catalogue, LINKEDIN, TOP_SKILLS};
use crate::extraction::dates::{self, ResumeDate};
use crate::extraction::fields::{ExtractedFields, FieldValue};
use crate::extraction::location::strip_null_tokens;

const GENERIC_HANDLES: &[&str] = &["user", "profile", "linkedin", "my", "page", "me", "in", "pub"];

static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/([\w\-.%]+)/?$")
        .expect("valid regex")
});
static OTHER_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/(?:pub|profile|company)/([\w\-.%/]+?)/?$")
        .expect("valid regex")
});
static BARE_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\-.%]+$").expect("valid regex"));

/// Canonicalizes a LinkedIn profile reference.
///
/// Profile URLs and bare handles become `https://www.linkedin.com/in/<handle>`.
/// Public-profile and company URLs are kept as given. Generic or unrecognized
/// values become `Absent`.
pub fn normalize_linkedin_url(value: &FieldValue) -> FieldValue {
    let raw = match value.as_str() {
        Some(raw) => raw.trim(),
        None => return FieldValue::Absent,
    };

    if let Some(caps) = PROFILE_URL.captures(raw) {
        return handle_url(&caps[1], raw);
    }
    if let Some(caps) = OTHER_URL.captures(raw) {
        if is_generic(&caps[1]) {
            warn!("Rejected generic LinkedIn URL '{raw}'");
            return FieldValue::Absent;
        }
        return FieldValue::Present(raw.to_string());
    }
    if BARE_HANDLE.is_match(raw) && !raw.to_lowercase().contains("linkedin.com") {
        return handle_url(raw, raw);
    }

    warn!("Invalid LinkedIn URL '{raw}'");
    FieldValue::Absent
}

fn handle_url(handle: &str, raw: &str) -> FieldValue {
    if is_generic(handle) {
        warn!("Rejected generic LinkedIn handle in '{raw}'");
        return FieldValue::Absent;
    }
    FieldValue::Present(format!("https://www.linkedin.com/in/{handle}"))
}

fn is_generic(identifier: &str) -> bool {
    identifier.len() < 4 || GENERIC_HANDLES.contains(&identifier.to_lowercase().as_str())
}

/// Normalizes a date column to `YYYY-MM-DD`.
///
/// Dates with a day keep it; month precision maps to the first of the month.
/// Ongoing markers and unparsable text become `Absent`: the column type has no
/// way to store "present".
pub fn normalize_date_column(value: &FieldValue) -> FieldValue {
    let raw = match value.as_str() {
        Some(raw) => raw,
        None => return FieldValue::Absent,
    };

    if let Some(date) = dates::parse_full_date(raw) {
        return FieldValue::Present(date.format("%Y-%m-%d").to_string());
    }
    match dates::parse(raw) {
        ResumeDate::Month(ym) => ym
            .first_day()
            .map(|d| FieldValue::Present(d.format("%Y-%m-%d").to_string()))
            .unwrap_or_default(),
        ResumeDate::Ongoing => FieldValue::Absent,
        ResumeDate::Unknown => {
            warn!("Could not parse date value '{raw}'");
            FieldValue::Absent
        }
    }
}

/// Strips `NULL` fragments from every location column in place.
pub fn clean_locations(fields: &mut ExtractedFields, catalogue: &Catalogue) {
    for column in catalogue.location_columns() {
        if let Some(raw) = fields.value(column).as_str() {
            let cleaned = FieldValue::from_raw(&strip_null_tokens(raw));
            fields.set(column, cleaned);
        }
    }
}

/// Fills `Skill1`..`Skill10` from the comma-separated `TopSkills` answer.
/// Extra skills are dropped and missing ones are left absent.
pub fn split_top_skills(fields: &mut ExtractedFields, catalogue: &Catalogue) {
    let skills: Vec<FieldValue> = fields
        .value(TOP_SKILLS)
        .as_str()
        .map(|raw| {
            raw.split(',')
                .map(FieldValue::from_raw)
                .filter(FieldValue::is_present)
                .collect()
        })
        .unwrap_or_default();

    let mut skills = skills.into_iter();
    for column in catalogue.skill_columns() {
        fields.set(column, skills.next().unwrap_or_default());
    }
}

/// Applies every storage-side normalization: locations, date columns, LinkedIn.
pub fn prepare_for_storage(fields: &mut ExtractedFields, catalogue: &Catalogue) {
    clean_locations(fields, catalogue);
    for column in catalogue.date_columns() {
        let normalized = normalize_date_column(fields.value(column));
        fields.set(column, normalized);
    }
    let linkedin = normalize_linkedin_url(fields.value(LINKEDIN));
    fields.set(LINKEDIN, linkedin);
}
