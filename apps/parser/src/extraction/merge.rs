use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::extraction::catalogue::{AVG_TENURE, LENGTH_IN_US, YEARS_OF_EXPERIENCE};
use crate::extraction::experience::ExperienceMetrics;
use crate::extraction::fields::{ExtractedFields, FieldValue};

/// How computed metrics interact with the values the LLM answered itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// A strictly positive computed value replaces whatever was extracted.
    #[default]
    PreferComputed,
    /// The LLM's own answer is kept; computed values only fill absent fields.
    PreferExtracted,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefer_computed" | "computed" => Ok(MergePolicy::PreferComputed),
            "prefer_extracted" | "extracted" => Ok(MergePolicy::PreferExtracted),
            other => Err(format!("unknown merge policy '{other}'")),
        }
    }
}

/// Folds `YearsofExperience`, `AvgTenure` and `LengthinUS` into `fields`.
///
/// A zero metric never clobbers a stored value. Returns the columns written.
pub fn merge_metrics(
    fields: &mut ExtractedFields,
    metrics: &ExperienceMetrics,
    policy: MergePolicy,
) -> Vec<String> {
    let candidates = [
        (YEARS_OF_EXPERIENCE, metrics.total_experience),
        (AVG_TENURE, metrics.avg_tenure),
        (LENGTH_IN_US, metrics.us_experience),
    ];

    let mut updated = Vec::new();
    for (column, computed) in candidates {
        if computed <= 0.0 {
            continue;
        }
        if policy == MergePolicy::PreferExtracted && fields.value(column).is_present() {
            info!(
                "Keeping extracted {column}={}",
                fields.value(column).as_persisted()
            );
            continue;
        }
        let formatted = format!("{computed:.1}");
        info!(
            "Setting {column}={formatted} (confidence {:.2})",
            metrics.confidence
        );
        fields.set(column, FieldValue::Present(formatted));
        updated.push(column.to_string());
    }
    updated
}
