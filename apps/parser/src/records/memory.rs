use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::extraction::catalogue::default_catalogue;
use crate::extraction::fields::{ExtractedFields, FieldValue};
use crate::records::{RecordStore, ResumeText, StoreError};

/// In-process store with the same merge semantics as the Postgres backend,
/// plus failure injection for retry tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    resumes: Mutex<BTreeMap<i64, String>>,
    records: Mutex<BTreeMap<i64, ExtractedFields>>,
    failed: Mutex<BTreeMap<i64, String>>,
    failures_left: AtomicU32,
    write_attempts: AtomicU32,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_resume(&self, userid: i64, text: &str) {
        self.resumes.lock().unwrap().insert(userid, text.to_string());
    }

    pub fn insert_record(&self, userid: i64, fields: ExtractedFields) {
        self.records.lock().unwrap().insert(userid, fields);
    }

    pub fn record(&self, userid: i64) -> Option<ExtractedFields> {
        self.records.lock().unwrap().get(&userid).cloned()
    }

    /// The last recorded processing error for a user, if any.
    pub fn failure(&self, userid: i64) -> Option<String> {
        self.failed.lock().unwrap().get(&userid).cloned()
    }

    /// The next `n` writes fail with a transient error.
    pub fn fail_next_writes(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn check_column(column: &str) -> Result<(), StoreError> {
        if default_catalogue().is_known_column(column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn(column.to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_resume(&self, userid: i64) -> Result<ResumeText, StoreError> {
        self.resumes
            .lock()
            .unwrap()
            .get(&userid)
            .map(|text| ResumeText {
                userid,
                text: text.clone(),
            })
            .ok_or(StoreError::NotFound(userid))
    }

    /// Higher userids stand in for newer resumes.
    async fn pending_resumes(&self, limit: usize) -> Result<Vec<ResumeText>, StoreError> {
        let records = self.records.lock().unwrap();
        let failed = self.failed.lock().unwrap();
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(userid, text)| {
                !records.contains_key(*userid)
                    && !failed.contains_key(*userid)
                    && !text.trim().is_empty()
            })
            .take(limit)
            .map(|(userid, text)| ResumeText {
                userid: *userid,
                text: text.clone(),
            })
            .collect())
    }

    async fn write_record(&self, userid: i64, fields: &ExtractedFields) -> Result<(), StoreError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Transient("injected failure".into()));
        }
        for (column, _) in fields.iter() {
            Self::check_column(column)?;
        }

        let mut records = self.records.lock().unwrap();
        let stored = records.entry(userid).or_default();
        for (column, value) in fields.iter() {
            if value.is_present() || stored.get(column).is_none() {
                stored.set(column, value.clone());
            }
        }
        self.failed.lock().unwrap().remove(&userid);
        Ok(())
    }

    async fn mark_failed(&self, userid: i64, error: &str) -> Result<(), StoreError> {
        if !self.resumes.lock().unwrap().contains_key(&userid) {
            return Err(StoreError::NotFound(userid));
        }
        self.failed.lock().unwrap().insert(userid, error.to_string());
        Ok(())
    }

    async fn column_values(&self, column: &str) -> Result<Vec<(i64, String)>, StoreError> {
        Self::check_column(column)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(userid, fields)| {
                fields
                    .value(column)
                    .as_str()
                    .map(|v| (*userid, v.to_string()))
            })
            .collect())
    }

    async fn update_column(
        &self,
        userid: i64,
        column: &str,
        value: &FieldValue,
    ) -> Result<(), StoreError> {
        Self::check_column(column)?;
        let mut records = self.records.lock().unwrap();
        let stored = records
            .get_mut(&userid)
            .ok_or(StoreError::NotFound(userid))?;
        stored.set(column, value.clone());
        Ok(())
    }
}
