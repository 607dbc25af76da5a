//! Postgres-backed `RecordStore`.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE resumes (
//!     userid         BIGINT PRIMARY KEY,
//!     resume_text    TEXT NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     last_failed_at TIMESTAMPTZ,
//!     last_error     TEXT
//! );
//!
//! CREATE TABLE ai_candidates (
//!     userid         BIGINT PRIMARY KEY REFERENCES resumes (userid),
//!     "FirstName"    TEXT,
//!     -- ... one TEXT column per catalogue field ...
//!     last_processed TIMESTAMPTZ
//! );
//! ```
//!
//! Field columns hold either a value or the literal `NULL` token. A resume
//! with `last_failed_at` set is left out of batches until it is processed
//! successfully on demand.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::extraction::catalogue::{default_catalogue, Catalogue};
use crate::extraction::fields::{ExtractedFields, FieldValue, NULL_TOKEN};
use crate::records::{RecordStore, ResumeText, StoreError};

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    catalogue: &'static Catalogue,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            catalogue: default_catalogue(),
        }
    }

    /// Column names are interpolated into SQL, so only catalogue names pass.
    fn quoted_column(&self, column: &str) -> Result<String, StoreError> {
        if self.catalogue.is_known_column(column) {
            Ok(format!("\"{column}\""))
        } else {
            Err(StoreError::UnknownColumn(column.to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_resume(&self, userid: i64) -> Result<ResumeText, StoreError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT userid, resume_text FROM resumes WHERE userid = $1")
                .bind(userid)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(userid, text)| ResumeText { userid, text })
            .ok_or(StoreError::NotFound(userid))
    }

    async fn pending_resumes(&self, limit: usize) -> Result<Vec<ResumeText>, StoreError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT r.userid, r.resume_text
            FROM resumes r
            LEFT JOIN ai_candidates c ON c.userid = r.userid
            WHERE c.last_processed IS NULL
              AND r.last_failed_at IS NULL
              AND btrim(r.resume_text) <> ''
            ORDER BY r.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(userid, text)| ResumeText { userid, text })
            .collect())
    }

    async fn write_record(&self, userid: i64, fields: &ExtractedFields) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        let columns = fields
            .iter()
            .map(|(name, _)| self.quoted_column(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO ai_candidates (userid");
        for column in &columns {
            builder.push(", ").push(column);
        }
        builder.push(", last_processed) VALUES (").push_bind(userid);
        for (_, value) in fields.iter() {
            builder.push(", ").push_bind(value.as_persisted().to_string());
        }
        builder.push(", NOW()) ON CONFLICT (userid) DO UPDATE SET last_processed = EXCLUDED.last_processed");
        for column in &columns {
            // An incoming NULL token keeps whatever is already stored.
            builder.push(format!(
                ", {column} = CASE WHEN EXCLUDED.{column} = '{NULL_TOKEN}' \
                 THEN COALESCE(ai_candidates.{column}, EXCLUDED.{column}) \
                 ELSE EXCLUDED.{column} END"
            ));
        }

        let result = builder.build().execute(&self.pool).await?;
        info!(
            "Wrote {} fields for user {} ({} row affected)",
            columns.len(),
            userid,
            result.rows_affected()
        );

        sqlx::query(
            "UPDATE resumes SET last_failed_at = NULL, last_error = NULL \
             WHERE userid = $1 AND last_failed_at IS NOT NULL",
        )
        .bind(userid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed(&self, userid: i64, error: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE resumes SET last_failed_at = NOW(), last_error = $2 WHERE userid = $1",
        )
        .bind(userid)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(userid));
        }
        Ok(())
    }

    async fn column_values(&self, column: &str) -> Result<Vec<(i64, String)>, StoreError> {
        let quoted = self.quoted_column(column)?;
        let rows: Vec<(i64, String)> = sqlx::query_as(&format!(
            "SELECT userid, {quoted} FROM ai_candidates \
             WHERE {quoted} IS NOT NULL AND {quoted} <> $1 ORDER BY userid"
        ))
        .bind(NULL_TOKEN)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_column(
        &self,
        userid: i64,
        column: &str,
        value: &FieldValue,
    ) -> Result<(), StoreError> {
        let quoted = self.quoted_column(column)?;
        let result = sqlx::query(&format!(
            "UPDATE ai_candidates SET {quoted} = $1 WHERE userid = $2"
        ))
        .bind(value.as_persisted())
        .bind(userid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(userid));
        }
        Ok(())
    }
}
