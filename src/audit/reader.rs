//! Audit log reader — filter and display session logs.
//!
//! Reads JSONL log files and provides filtering, summarization,
//! and pretty-printing for the `cliffgate log` command.

use crate::approval::types::{ReviewPath, Verdict};
use crate::audit::types::*;
use crate::card::escape_controls;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and queries audit log files.
pub struct AuditReader {
    log_dir: PathBuf,
}

impl AuditReader {
    /// Create a reader using the default log directory.
    pub fn new() -> Result<Self> {
        let log_dir = crate::audit::logger::AuditLogger::log_directory()?;
        Ok(Self { log_dir })
    }

    /// Create a reader for a specific directory.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            log_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Read all records from a session log file.
    pub fn read_session(&self, session_id: &str) -> Result<Vec<AuditRecord>> {
        let path = self.log_dir.join(format!("{}.jsonl", session_id));
        self.read_file(&path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<AuditRecord>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse audit record at line {}", i + 1))
            })
            .collect()
    }

    /// Read records from the most recent session.
    pub fn read_latest_session(&self) -> Result<Vec<AuditRecord>> {
        match self.find_latest_session()? {
            Some(path) => self.read_file(&path),
            None => Ok(Vec::new()),
        }
    }

    fn find_latest_session(&self) -> Result<Option<PathBuf>> {
        if !self.log_dir.exists() {
            return Ok(None);
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |e| e == "jsonl"))
            .collect();

        // Most recently modified first
        entries.sort_by(|a, b| {
            let a_time = fs::metadata(a).and_then(|m| m.modified()).ok();
            let b_time = fs::metadata(b).and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        Ok(entries.into_iter().next())
    }

    /// List all available session IDs.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        if !self.log_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions: Vec<String> = fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "jsonl"))
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
            })
            .collect();

        sessions.sort();
        Ok(sessions)
    }

    /// Filter records based on criteria.
    pub fn filter_entries(records: &[AuditRecord], filter: &LogFilter) -> Vec<AuditRecord> {
        records
            .iter()
            .filter(|r| filter.verdict.map_or(true, |v| r.verdict == v))
            .filter(|r| filter.review_path.map_or(true, |p| r.review_path == p))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Generate a summary for a set of records.
    pub fn summarize(records: &[AuditRecord]) -> SessionSummary {
        let mut summary = SessionSummary::default();

        if let Some(first) = records.first() {
            summary.session_id = first.session_id.clone();
            summary.start_time = Some(first.timestamp);
        }
        if let Some(last) = records.last() {
            summary.end_time = Some(last.timestamp);
        }

        summary.total = records.len();
        for record in records {
            match record.verdict {
                Verdict::Approved => {
                    summary.approved += 1;
                    if record.review_path == ReviewPath::Auto {
                        summary.auto_approved += 1;
                    }
                }
                Verdict::Rejected => summary.rejected += 1,
            }
        }

        summary
    }

    /// Pretty-print a record for terminal display.
    pub fn format_entry(record: &AuditRecord) -> String {
        let timestamp = record.timestamp.format("%H:%M:%S").to_string();
        let verdict = match (record.verdict, record.review_path) {
            (Verdict::Approved, ReviewPath::Auto) => "AUTO".green().to_string(),
            (Verdict::Approved, _) => "APPROVED".yellow().to_string(),
            (Verdict::Rejected, _) => "REJECTED".red().to_string(),
        };

        let mut line = format!(
            "[{}] {} {} [{}]",
            timestamp.dimmed(),
            verdict,
            escape_controls(&record.description).bold(),
            record.risk
        );

        if !record.targets.is_empty() {
            line.push_str(&format!(" -> {}", escape_controls(&record.targets.join(", "))));
        }
        if record.review_path != ReviewPath::Auto {
            line.push_str(&format!(" ({})", record.review_path.to_string().dimmed()));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLogger;
    use crate::card::{ActionType, RiskTier};
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(verdict: Verdict, path: ReviewPath) -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now(),
            session_id: "s1".to_string(),
            action_type: if path == ReviewPath::Auto {
                ActionType::Green
            } else {
                ActionType::Red
            },
            description: "something".to_string(),
            risk: RiskTier::Low,
            verdict,
            review_path: path,
            targets: vec![],
            review_duration_ms: None,
        }
    }

    fn sample() -> Vec<AuditRecord> {
        vec![
            record(Verdict::Approved, ReviewPath::Auto),
            record(Verdict::Approved, ReviewPath::Interactive),
            record(Verdict::Rejected, ReviewPath::Fallback),
            record(Verdict::Rejected, ReviewPath::Interactive),
        ]
    }

    #[test]
    fn test_summarize() {
        let summary = AuditReader::summarize(&sample());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.approved, 2);
        assert_eq!(summary.auto_approved, 1);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.session_id, "s1");
    }

    #[test]
    fn test_filter_by_verdict_and_path() {
        let records = sample();
        let filter = LogFilter {
            verdict: Some(Verdict::Rejected),
            ..Default::default()
        };
        assert_eq!(AuditReader::filter_entries(&records, &filter).len(), 2);

        let filter = LogFilter {
            review_path: Some(ReviewPath::Interactive),
            limit: Some(1),
            ..Default::default()
        };
        let filtered = AuditReader::filter_entries(&records, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].verdict, Verdict::Approved);
    }

    #[test]
    fn test_read_and_list_sessions() {
        let tmp = TempDir::new().unwrap();
        let logger = AuditLogger::new("session-a", Some(tmp.path())).unwrap();
        for r in sample() {
            logger.log(&r).unwrap();
        }

        let reader = AuditReader::with_dir(tmp.path());
        assert_eq!(reader.list_sessions().unwrap(), vec!["session-a".to_string()]);
        assert_eq!(reader.read_session("session-a").unwrap().len(), 4);
        assert_eq!(reader.read_latest_session().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let reader = AuditReader::with_dir(tmp.path().join("missing"));
        assert!(reader.list_sessions().unwrap().is_empty());
        assert!(reader.read_latest_session().unwrap().is_empty());
    }

    #[test]
    fn test_format_entry_escapes_controls() {
        let mut r = record(Verdict::Approved, ReviewPath::Auto);
        r.description = "ls\x1b[2J".to_string();
        r.targets = vec!["a\rb".to_string()];
        let line = AuditReader::format_entry(&r);
        assert!(!line.contains("\x1b[2J"));
        assert!(!line.contains('\r'));
        assert!(line.contains("ls\\u{1b}[2J"));
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bad.jsonl"), "\nnot json\n").unwrap();
        let err = AuditReader::with_dir(tmp.path()).read_session("bad").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
