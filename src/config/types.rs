//! Configuration types for the approval gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What happens to a green auto-approval when its audit record can't be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkFailurePolicy {
    /// Approve anyway and log the sink error
    #[default]
    Proceed,
    /// Refuse to approve without a durable audit record
    Block,
}

impl fmt::Display for SinkFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkFailurePolicy::Proceed => write!(f, "proceed"),
            SinkFailurePolicy::Block => write!(f, "block"),
        }
    }
}

impl SinkFailurePolicy {
    pub fn from_str_loose(s: &str) -> Option<SinkFailurePolicy> {
        match s.to_lowercase().trim() {
            "proceed" | "allow" | "continue" => Some(SinkFailurePolicy::Proceed),
            "block" | "deny" | "halt" => Some(SinkFailurePolicy::Block),
            _ => None,
        }
    }
}

/// Settings for the review surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// How long the event loop waits for input before redrawing
    pub poll_interval_ms: u64,
    /// Answers read by the fallback prompt before it gives up
    pub fallback_attempts: usize,
}

impl ReviewSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            fallback_attempts: 3,
        }
    }
}

/// Settings for the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Directory for session logs (default: ~/.cliffgate/logs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    pub on_green_sink_failure: SinkFailurePolicy,
}

/// Complete gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub review: ReviewSettings,
    pub audit: AuditSettings,
}
