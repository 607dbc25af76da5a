//! Candidate record persistence.
//!
//! The pipeline only talks to `RecordStore`; `PgRecordStore` is the production
//! backend and `MemoryRecordStore` backs the tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::extraction::fields::{ExtractedFields, FieldValue};

pub use postgres::PgRecordStore;

/// Postgres SQLSTATEs worth retrying: serialization failure, deadlock,
/// admin shutdown, too many connections.
const TRANSIENT_SQLSTATES: &[&str] = &["40001", "40P01", "57P01", "53300"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No resume found for user {0}")]
    NotFound(i64),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Transient store failure: {0}")]
    Transient(String),
}

impl StoreError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transient(_) => true,
            StoreError::Database(sqlx::Error::Io(_)) => true,
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            StoreError::Database(sqlx::Error::Database(db)) => db
                .code()
                .map(|code| TRANSIENT_SQLSTATES.iter().any(|c| code == *c))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// A resume waiting to be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeText {
    pub userid: i64,
    pub text: String,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches the resume text for one user.
    async fn fetch_resume(&self, userid: i64) -> Result<ResumeText, StoreError>;

    /// Resumes with no processed candidate record and no recorded failure,
    /// newest first.
    async fn pending_resumes(&self, limit: usize) -> Result<Vec<ResumeText>, StoreError>;

    /// Inserts or updates the candidate record. Absent values never overwrite
    /// a stored value.
    async fn write_record(&self, userid: i64, fields: &ExtractedFields) -> Result<(), StoreError>;

    /// Records a failed processing attempt so later batches skip the resume.
    /// A successful write clears it.
    async fn mark_failed(&self, userid: i64, error: &str) -> Result<(), StoreError>;

    /// Every stored non-null value of `column`, as `(userid, value)`.
    async fn column_values(&self, column: &str) -> Result<Vec<(i64, String)>, StoreError>;

    /// Overwrites one column of one record.
    async fn update_column(
        &self,
        userid: i64,
        column: &str,
        value: &FieldValue,
    ) -> Result<(), StoreError>;
}

/// Writes a record, retrying transient failures with exponential backoff
/// (500ms, 1s, 2s, ...). Permanent failures are returned immediately.
pub async fn write_with_retry(
    store: &dyn RecordStore,
    userid: i64,
    fields: &ExtractedFields,
    max_retries: u32,
) -> Result<(), StoreError> {
    let mut attempt = 0;
    loop {
        match store.write_record(userid, fields).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = Duration::from_millis(500 * (1 << attempt));
                attempt += 1;
                warn!(
                    "Write for user {} failed ({}), retry {}/{} after {}ms",
                    userid,
                    e,
                    attempt,
                    max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
