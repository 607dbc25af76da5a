//! Field Extractor: pulls `<Label>: <value>` answers out of an LLM response.
//!
//! Each canonical field owns an ordered list of `MatchRule`s. Rules are tried
//! in order and the first rule that matches decides the field's value, even
//! when that value turns out to be empty or `NULL`.

use std::collections::HashSet;

use regex::Regex;
use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

/// Literal token the persistence schema uses for "no value".
pub const NULL_TOKEN: &str = "NULL";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Field specs are empty")]
    EmptySpecs,

    #[error("Duplicate canonical field: {0}")]
    DuplicateField(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A single extracted value. `Absent` becomes the literal `"NULL"` only at the
/// serialization boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    Present(String),
    #[default]
    Absent,
}

impl FieldValue {
    /// Trims `raw`; empty strings and `NULL` (any case) become `Absent`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NULL_TOKEN) {
            FieldValue::Absent
        } else {
            FieldValue::Present(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Present(s) => Some(s),
            FieldValue::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    /// The value as the persistence layer stores it.
    pub fn as_persisted(&self) -> &str {
        self.as_str().unwrap_or(NULL_TOKEN)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_persisted())
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(FieldValue::from_raw).unwrap_or_default())
    }
}

/// One way of locating a field's value. Capture group 1 is the value.
#[derive(Debug, Clone)]
pub struct MatchRule {
    regex: Regex,
}

impl MatchRule {
    /// Matches `<label>: <value>` at the start of a line, allowing leading
    /// whitespace and a `-`, `*` or `•` bullet. The label is matched literally
    /// and case-sensitively.
    pub fn label(label: &str) -> Self {
        let pattern = format!(
            r"(?m)^[ \t]*(?:[-*•][ \t]*)?{}[ \t]*:[ \t]*(.*)$",
            regex::escape(label)
        );
        Self {
            regex: Regex::new(&pattern).expect("escaped label is a valid pattern"),
        }
    }

    /// A raw regular expression searched anywhere in the response.
    pub fn pattern(pattern: &str) -> Result<Self, ExtractError> {
        let regex = Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if regex.captures_len() < 2 {
            return Err(ExtractError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern needs a capture group for the value".to_string(),
            });
        }
        Ok(Self { regex })
    }

    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// A canonical field and its rules in priority order.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    rules: Vec<MatchRule>,
    prompt_label: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            prompt_label: None,
        }
    }

    /// Adds a label rule. The first label added is the one the extraction
    /// prompt asks for.
    pub fn label(mut self, label: &str) -> Self {
        if self.prompt_label.is_none() {
            self.prompt_label = Some(label.to_string());
        }
        self.rules.push(MatchRule::label(label));
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Result<Self, ExtractError> {
        self.rules.push(MatchRule::pattern(pattern)?);
        Ok(self)
    }

    pub fn with_patterns(name: impl Into<String>, patterns: &[&str]) -> Result<Self, ExtractError> {
        patterns
            .iter()
            .try_fold(FieldSpec::new(name), |spec, p| spec.pattern(p))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn prompt_label(&self) -> Option<&str> {
        self.prompt_label.as_deref()
    }

    fn resolve(&self, text: &str) -> FieldValue {
        for rule in &self.rules {
            if let Some(raw) = rule.capture(text) {
                debug!(field = %self.name, rule = rule.as_str(), "field matched");
                return FieldValue::from_raw(raw);
            }
        }
        FieldValue::Absent
    }
}

/// Ordered, duplicate-free list of field specs.
#[derive(Debug, Clone, Default)]
pub struct FieldSpecs {
    specs: Vec<FieldSpec>,
}

impl FieldSpecs {
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, ExtractError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(ExtractError::DuplicateField(spec.name.clone()));
            }
        }
        Ok(Self { specs })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.specs.iter().find(|s| s.name == name)
    }
}

/// Extraction output: one entry per canonical field, in spec order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    entries: Vec<(String, FieldValue)>,
}

impl ExtractedFields {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Looks up a field, treating unknown names as absent.
    pub fn value(&self, name: &str) -> &FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.get(name).unwrap_or(&ABSENT)
    }

    /// Replaces an existing entry in place or appends a new one.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_present()).count()
    }
}

impl FromIterator<(String, FieldValue)> for ExtractedFields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut fields = ExtractedFields::default();
        for (name, value) in iter {
            fields.set(&name, value);
        }
        fields
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Extracts every field in `specs` from `response_text`.
///
/// Missing fields become `FieldValue::Absent`. Fails only when `specs` is empty.
pub fn extract(response_text: &str, specs: &FieldSpecs) -> Result<ExtractedFields, ExtractError> {
    if specs.is_empty() {
        return Err(ExtractError::EmptySpecs);
    }

    let entries = specs
        .iter()
        .map(|spec| (spec.name.clone(), spec.resolve(response_text)))
        .collect();

    Ok(ExtractedFields { entries })
}
