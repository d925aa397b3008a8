//! The write-only audit collaborator.

use crate::audit::types::AuditRecord;
use std::sync::Mutex;

/// Errors from an audit sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The record could not be encoded.
    #[error("failed to serialize audit record: {0}")]
    Serialize(String),

    /// The backing store rejected or lost the write.
    #[error("failed to write audit record: {0}")]
    Write(String),

    /// The sink is not accepting records.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only destination for audit records.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<(), SinkError>;
}

/// Keeps records in memory (tests, embedding, short-lived sessions).
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}
