use std::borrow::Cow;

use crate::extraction::catalogue::{Catalogue, FieldGroup};

pub const TRUNCATION_MARKER: &str = "\n\n... [content truncated due to length] ...\n\n";
pub const RESUME_REMOVED: &str = "Resume text was too large and had to be removed.";

pub const RESUME_EXTRACTION_SYSTEM: &str = "You are a precise resume analyst. \
    Answer every question about the candidate on its own line, in the exact form \
    `- <question>: <answer>`. Copy each question text verbatim. \
    If the resume does not contain the answer, write NULL. \
    Do NOT add commentary, headings of your own, or markdown formatting.";

const LOCATION_RULES: &str = "\
Location rules:
- US locations: `City, ST` (or `ST` alone); always use 2-letter state abbreviations.
- International locations: `City, Country` (or `Country` alone). NEVER append NULL to a location.
- Use NULL only if the job entry has no location at all.
Date rules:
- Use YYYY-MM-DD where the day is known, otherwise `Mon YYYY` or `YYYY`.
- Use Present for positions that are still held.";

pub const RESUME_EXTRACTION_PROMPT_TEMPLATE: &str = "\
Read the resume below and answer the questions that follow it.

RESUME:
{resume_text}

{location_rules}

QUESTIONS:
{questions}";

fn group_heading(group: FieldGroup) -> &'static str {
    match group {
        FieldGroup::PersonalInformation => "PERSONAL INFORMATION:",
        FieldGroup::JobTitles => "JOB TITLES:",
        FieldGroup::WorkHistory => "WORK HISTORY:",
        FieldGroup::Industry => "INDUSTRY:",
        FieldGroup::Technical => "TECHNICAL PROFILE:",
        FieldGroup::Metrics => "EXPERIENCE (numerical answers only):",
    }
}

/// Builds the user prompt. Questions are the catalogue's prompt labels, so the
/// extractor's first rule for every field matches what the model is asked.
pub fn build_extraction_prompt(resume_text: &str, catalogue: &Catalogue) -> String {
    let mut questions = String::new();
    for group in FieldGroup::ALL {
        questions.push_str(group_heading(group));
        questions.push('\n');
        for spec in catalogue.specs().iter() {
            if catalogue.group_of(spec.name()) != Some(group) {
                continue;
            }
            if let Some(label) = spec.prompt_label() {
                questions.push_str("- ");
                questions.push_str(label);
                questions.push_str(":\n");
            }
        }
        questions.push('\n');
    }

    RESUME_EXTRACTION_PROMPT_TEMPLATE
        .replace("{location_rules}", LOCATION_RULES)
        .replace("{questions}", questions.trim_end())
        .replace("{resume_text}", resume_text)
}

/// Caps a resume at `max_chars` characters by cutting out the middle, keeping
/// the head (contact details, recent jobs) and the tail (education, skills).
/// When the cap cannot even hold the marker the text is replaced outright.
pub fn truncate_middle(text: &str, max_chars: usize) -> Cow<'_, str> {
    let total = text.chars().count();
    if total <= max_chars {
        return Cow::Borrowed(text);
    }
    let marker_chars = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_chars {
        return Cow::Borrowed(RESUME_REMOVED);
    }

    let keep = max_chars - marker_chars;
    let tail = keep / 2;
    let head = keep - tail;
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };

    let mut truncated = String::with_capacity(text.len().min(max_chars * 4));
    truncated.push_str(&text[..byte_at(head)]);
    truncated.push_str(TRUNCATION_MARKER);
    truncated.push_str(&text[byte_at(total - tail)..]);
    Cow::Owned(truncated)
}
