//! Axum route handlers for the stateless extraction API.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::catalogue::FieldGroup;
use crate::extraction::coverage::{compute_coverage, CoverageReport};
use crate::extraction::experience::{self, EmploymentRecord, ExperienceMetrics};
use crate::extraction::fields::{extract, ExtractedFields};
use crate::extraction::normalize::split_top_skills;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub response_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub fields: ExtractedFields,
    pub coverage: CoverageReport,
}

#[derive(Debug, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub jobs: Vec<JobInput>,
    /// Defaults to today (UTC).
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CatalogueField {
    pub name: String,
    pub group: Option<FieldGroup>,
    pub label: Option<String>,
    /// Zero for columns derived from another field rather than extracted.
    pub rule_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/extract
///
/// Runs the field extractor over an LLM answer without touching storage.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.response_text.trim().is_empty() {
        return Err(AppError::Validation(
            "response_text cannot be empty".to_string(),
        ));
    }

    let mut fields = extract(&request.response_text, state.catalogue.specs())?;
    split_top_skills(&mut fields, state.catalogue);
    let coverage = compute_coverage(&fields, state.catalogue);

    Ok(Json(ExtractResponse { fields, coverage }))
}

/// POST /api/v1/metrics
///
/// Computes experience metrics for an explicit job list.
pub async fn handle_metrics(
    Json(request): Json<MetricsRequest>,
) -> Result<Json<ExperienceMetrics>, AppError> {
    let reference_date = request
        .reference_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let jobs: Vec<EmploymentRecord> = request
        .jobs
        .iter()
        .map(|job| {
            EmploymentRecord::new(&job.company, &job.start, &job.end, job.location.as_deref())
        })
        .collect();

    Ok(Json(experience::compute(&jobs, reference_date)))
}

/// GET /api/v1/catalogue
pub async fn handle_catalogue(State(state): State<AppState>) -> Json<Vec<CatalogueField>> {
    let fields = state
        .catalogue
        .specs()
        .iter()
        .map(|spec| CatalogueField {
            name: spec.name().to_string(),
            group: state.catalogue.group_of(spec.name()),
            label: spec.prompt_label().map(String::from),
            rule_count: spec.rules().len(),
        })
        .collect();
    Json(fields)
}
