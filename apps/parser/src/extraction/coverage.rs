use serde::Serialize;

use crate::extraction::catalogue::{Catalogue, FieldGroup};
use crate::extraction::fields::ExtractedFields;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCoverage {
    pub group: FieldGroup,
    pub total: usize,
    pub filled: usize,
    pub filled_fields: Vec<String>,
}

/// How much of an LLM response the extractor could use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_fields: usize,
    pub filled_fields: usize,
    pub absent_fields: usize,
    /// Percentage of fields with a value, 0–100.
    pub extraction_rate: f64,
    pub groups: Vec<GroupCoverage>,
}

pub fn compute_coverage(fields: &ExtractedFields, catalogue: &Catalogue) -> CoverageReport {
    let total_fields = fields.len();
    let filled_fields = fields.present_count();

    let groups = FieldGroup::ALL
        .iter()
        .map(|group| {
            let members: Vec<_> = fields
                .iter()
                .filter(|(name, _)| catalogue.group_of(name) == Some(*group))
                .collect();
            GroupCoverage {
                group: *group,
                total: members.len(),
                filled: members.iter().filter(|(_, v)| v.is_present()).count(),
                filled_fields: members
                    .iter()
                    .filter(|(_, v)| v.is_present())
                    .map(|(name, _)| name.to_string())
                    .collect(),
            }
        })
        .filter(|g| g.total > 0)
        .collect();

    let extraction_rate = if fields.is_empty() {
        0.0
    } else {
        filled_fields as f64 / total_fields as f64 * 100.0
    };

    CoverageReport {
        total_fields,
        filled_fields,
        absent_fields: total_fields - filled_fields,
        extraction_rate,
        groups,
    }
}
