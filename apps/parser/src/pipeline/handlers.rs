//! Axum route handlers for processing and maintenance jobs.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::AppError;
use crate::pipeline::maintenance::{fix_location_entries, LocationFixReport};
use crate::pipeline::{BatchSummary, ProcessOutcome};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    /// Date tenure of ongoing jobs is measured against. Defaults to today (UTC).
    pub reference_date: Option<NaiveDate>,
}

fn reference_date(request: Option<Json<ProcessRequest>>) -> NaiveDate {
    request
        .and_then(|Json(r)| r.reference_date)
        .unwrap_or_else(|| Utc::now().date_naive())
}

/// POST /api/v1/resumes/:userid/process
pub async fn handle_process_user(
    State(state): State<AppState>,
    Path(userid): Path<i64>,
    request: Option<Json<ProcessRequest>>,
) -> Result<Json<ProcessOutcome>, AppError> {
    let outcome = state
        .processor
        .process_user(userid, reference_date(request))
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/resumes/batch
///
/// Processes the next batch of pending resumes. Individual failures are
/// reported in the summary rather than failing the request.
pub async fn handle_process_batch(
    State(state): State<AppState>,
    request: Option<Json<ProcessRequest>>,
) -> Result<Json<BatchSummary>, AppError> {
    let summary = Arc::clone(&state.processor)
        .process_batch(reference_date(request))
        .await?;
    Ok(Json(summary))
}

/// POST /api/v1/maintenance/locations/fix
pub async fn handle_fix_locations(
    State(state): State<AppState>,
) -> Result<Json<LocationFixReport>, AppError> {
    let report = fix_location_entries(state.processor.store().as_ref(), state.catalogue).await?;
    Ok(Json(report))
}
