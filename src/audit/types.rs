//! Types for the audit trail.
//!
//! Every resolved request produces exactly one record, auto-approvals
//! included.

use crate::approval::types::{ReviewPath, Verdict};
use crate::card::{ActionType, RiskTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the decision was made
    pub timestamp: DateTime<Utc>,

    /// Session identifier (UUID unless the caller chose one)
    pub session_id: String,

    pub action_type: ActionType,

    /// The action description as submitted
    pub description: String,

    /// Risk tier exactly as the classifier supplied it
    pub risk: RiskTier,

    pub verdict: Verdict,

    /// Which interface produced the verdict
    pub review_path: ReviewPath,

    /// Change targets in presentation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// How long the operator took (absent for auto-approvals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_duration_ms: Option<u64>,
}

/// Summary statistics for a session's audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Green actions (a subset of `approved`)
    pub auto_approved: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl SessionSummary {
    /// Format as a human-readable one-liner for terminal output.
    pub fn one_line(&self) -> String {
        format!(
            "{} decisions | {} approved ({} auto) | {} rejected",
            self.total, self.approved, self.auto_approved, self.rejected
        )
    }
}

/// Filter criteria for querying audit logs.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub verdict: Option<Verdict>,
    pub review_path: Option<ReviewPath>,
    pub limit: Option<usize>,
}
