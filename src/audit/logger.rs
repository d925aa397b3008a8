//! Audit log writer — append-only JSONL files.
//!
//! Writes to `{log_dir}/{session_id}.jsonl`, one JSON object per line.
//! Flushes after every record so a crash loses nothing already decided.

use crate::audit::sink::{AuditSink, SinkError};
use crate::audit::types::AuditRecord;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Append-only audit logger that writes JSONL files.
pub struct AuditLogger {
    /// Path to the log file
    log_path: PathBuf,
    /// Open file handle (kept open for the session lifetime)
    file: Mutex<File>,
    /// Number of records written this session
    entry_count: AtomicUsize,
}

impl AuditLogger {
    /// Create a logger for a session in the given directory
    /// (default: `~/.cliffgate/logs`).
    pub fn new(session_id: &str, log_dir: Option<&Path>) -> Result<Self> {
        let log_dir = match log_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::log_directory()?,
        };
        fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        Self::with_path(log_dir.join(format!("{}.jsonl", session_id)))
    }

    /// Create a logger writing to a specific file.
    pub fn with_path(path: impl AsRef<Path>) -> Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            log_path,
            file: Mutex::new(file),
            entry_count: AtomicUsize::new(0),
        })
    }

    /// Serialize a record and append it to the file.
    pub fn log(&self, record: &AuditRecord) -> Result<(), SinkError> {
        let json =
            serde_json::to_string(record).map_err(|e| SinkError::Serialize(e.to_string()))?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| SinkError::Unavailable("audit log lock poisoned".to_string()))?;
        writeln!(file, "{}", json).map_err(|e| SinkError::Write(e.to_string()))?;
        file.flush().map_err(|e| SinkError::Write(e.to_string()))?;

        self.entry_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Get the path to the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Get the number of records written this session.
    pub fn entry_count(&self) -> usize {
        self.entry_count.load(Ordering::SeqCst)
    }

    /// Get the default log directory (~/.cliffgate/logs/).
    pub fn log_directory() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".cliffgate").join("logs"))
    }
}

impl AuditSink for AuditLogger {
    fn append(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.log(record)
    }
}
