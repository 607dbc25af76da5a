//! Resume processing pipeline.
//!
//! One resume: prompt → LLM → extract → clean → metrics → merge → normalize →
//! persist. Batches run the same steps with a bounded number of workers.

pub mod handlers;
pub mod maintenance;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::extraction::catalogue::Catalogue;
use crate::extraction::coverage::{compute_coverage, CoverageReport};
use crate::extraction::experience::{self, EmploymentRecord, ExperienceMetrics};
use crate::extraction::fields::{extract, ExtractError, ExtractedFields};
use crate::extraction::merge::{merge_metrics, MergePolicy};
use crate::extraction::normalize::{clean_locations, prepare_for_storage, split_top_skills};
use crate::extraction::prompts::{build_extraction_prompt, truncate_middle, RESUME_EXTRACTION_SYSTEM};
use crate::llm_client::{Completion, LlmError};
use crate::records::{write_with_retry, RecordStore, ResumeText, StoreError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Resume for user {0} is empty")]
    EmptyResume(i64),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessorSettings {
    pub merge_policy: MergePolicy,
    pub update_max_retries: u32,
    pub max_workers: usize,
    pub batch_size: usize,
    /// Longer resumes lose their middle before reaching the LLM.
    pub max_resume_chars: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::default(),
            update_max_retries: 3,
            max_workers: 8,
            batch_size: 50,
            max_resume_chars: 480_000,
        }
    }
}

/// A record ready to persist, plus what went into it.
#[derive(Debug, Clone)]
pub struct BuiltRecord {
    pub fields: ExtractedFields,
    pub metrics: ExperienceMetrics,
    pub merged_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub userid: i64,
    pub coverage: CoverageReport,
    pub metrics: ExperienceMetrics,
    pub merged_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub userid: i64,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: Vec<i64>,
    pub failed: Vec<BatchFailure>,
}

/// Turns an LLM answer into the record that gets stored. Pure: no I/O and
/// the reference date is supplied by the caller.
pub fn build_record(
    response_text: &str,
    catalogue: &Catalogue,
    reference_date: NaiveDate,
    policy: MergePolicy,
) -> Result<BuiltRecord, ExtractError> {
    let mut fields = extract(response_text, catalogue.specs())?;
    clean_locations(&mut fields, catalogue);
    split_top_skills(&mut fields, catalogue);

    let jobs = EmploymentRecord::from_fields(&fields, catalogue);
    let metrics = experience::compute(&jobs, reference_date);
    let merged_columns = merge_metrics(&mut fields, &metrics, policy);

    prepare_for_storage(&mut fields, catalogue);

    Ok(BuiltRecord {
        fields,
        metrics,
        merged_columns,
    })
}

pub struct ResumeProcessor {
    llm: Arc<dyn Completion>,
    store: Arc<dyn RecordStore>,
    catalogue: &'static Catalogue,
    settings: ProcessorSettings,
}

impl ResumeProcessor {
    pub fn new(
        llm: Arc<dyn Completion>,
        store: Arc<dyn RecordStore>,
        catalogue: &'static Catalogue,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            llm,
            store,
            catalogue,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Fetches, processes and stores one user's resume.
    pub async fn process_user(
        &self,
        userid: i64,
        reference_date: NaiveDate,
    ) -> Result<ProcessOutcome, PipelineError> {
        let resume = self.store.fetch_resume(userid).await?;
        self.process_resume(resume, reference_date).await
    }

    pub async fn process_resume(
        &self,
        resume: ResumeText,
        reference_date: NaiveDate,
    ) -> Result<ProcessOutcome, PipelineError> {
        let userid = resume.userid;
        if resume.text.trim().is_empty() {
            return Err(PipelineError::EmptyResume(userid));
        }

        info!("Processing user {userid} ({} chars)", resume.text.len());
        let text = truncate_middle(&resume.text, self.settings.max_resume_chars);
        if text.len() < resume.text.len() {
            warn!(
                "Resume for user {userid} truncated from {} to {} bytes",
                resume.text.len(),
                text.len()
            );
        }
        let prompt = build_extraction_prompt(&text, self.catalogue);
        let response = self.llm.complete(&prompt, RESUME_EXTRACTION_SYSTEM).await?;

        let record = build_record(
            &response,
            self.catalogue,
            reference_date,
            self.settings.merge_policy,
        )?;
        let coverage = compute_coverage(&record.fields, self.catalogue);
        if coverage.filled_fields == 0 {
            warn!("No fields extracted for user {userid}");
        }

        write_with_retry(
            self.store.as_ref(),
            userid,
            &record.fields,
            self.settings.update_max_retries,
        )
        .await?;

        info!(
            "User {userid} done: {}/{} fields, {:.1} years experience",
            coverage.filled_fields, coverage.total_fields, record.metrics.total_experience
        );

        Ok(ProcessOutcome {
            userid,
            coverage,
            metrics: record.metrics,
            merged_columns: record.merged_columns,
        })
    }

    /// Processes up to `batch_size` pending resumes with at most
    /// `max_workers` in flight. A failed resume never aborts the batch; it is
    /// marked failed in the store so later batches move past it.
    pub async fn process_batch(
        self: Arc<Self>,
        reference_date: NaiveDate,
    ) -> Result<BatchSummary, PipelineError> {
        let pending = self.store.pending_resumes(self.settings.batch_size).await?;
        let mut summary = BatchSummary {
            attempted: pending.len(),
            ..Default::default()
        };
        if pending.is_empty() {
            info!("No pending resumes");
            return Ok(summary);
        }

        info!(
            "Processing batch of {} resumes with {} workers",
            pending.len(),
            self.settings.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.max_workers.max(1)));
        let mut tasks = JoinSet::new();
        let mut task_users = HashMap::new();
        for resume in pending {
            let userid = resume.userid;
            let processor = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return Err(e.to_string()),
                };
                processor
                    .process_resume(resume, reference_date)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            });
            task_users.insert(handle.id(), userid);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(e) => {
                    error!("Batch worker panicked: {e}");
                    (e.id(), Err(format!("worker panicked: {e}")))
                }
            };
            let Some(userid) = task_users.remove(&id) else {
                error!("Batch worker {id} has no user");
                continue;
            };
            match result {
                Ok(()) => summary.succeeded.push(userid),
                Err(message) => {
                    warn!("User {userid} failed: {message}");
                    if let Err(e) = self.store.mark_failed(userid, &message).await {
                        error!("Could not record failure for user {userid}: {e}");
                    }
                    summary.failed.push(BatchFailure {
                        userid,
                        error: message,
                    });
                }
            }
        }

        summary.succeeded.sort_unstable();
        summary.failed.sort_by_key(|f| f.userid);
        info!(
            "Batch complete: {} succeeded, {} failed",
            summary.succeeded.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}
