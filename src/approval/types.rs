//! Types for the approval flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operator's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Approved => write!(f, "approved"),
            Verdict::Rejected => write!(f, "rejected"),
        }
    }
}

impl Verdict {
    pub fn from_str_loose(s: &str) -> Option<Verdict> {
        match s.to_lowercase().trim() {
            "approved" | "approve" | "allow" => Some(Verdict::Approved),
            "rejected" | "reject" | "denied" | "deny" => Some(Verdict::Rejected),
            _ => None,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

/// Which reviewer interface produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPath {
    /// Green action, no human involved
    Auto,
    /// Full-screen terminal review
    Interactive,
    /// Line-based prompt on stdin/stdout
    Fallback,
}

impl fmt::Display for ReviewPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewPath::Auto => write!(f, "auto"),
            ReviewPath::Interactive => write!(f, "interactive"),
            ReviewPath::Fallback => write!(f, "fallback"),
        }
    }
}

impl ReviewPath {
    pub fn from_str_loose(s: &str) -> Option<ReviewPath> {
        match s.to_lowercase().trim() {
            "auto" => Some(ReviewPath::Auto),
            "interactive" | "tui" | "terminal" => Some(ReviewPath::Interactive),
            "fallback" | "prompt" | "cli" => Some(ReviewPath::Fallback),
            _ => None,
        }
    }
}

/// Outcome returned to the agent runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub verdict: Verdict,
    pub decided_at: DateTime<Utc>,
    pub review_path: ReviewPath,
}

impl ApprovalDecision {
    pub fn new(verdict: Verdict, review_path: ReviewPath) -> Self {
        Self {
            verdict,
            decided_at: Utc::now(),
            review_path,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.verdict.is_approved()
    }
}
