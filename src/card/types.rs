//! Core types for proposed actions.
//!
//! An agent action arrives already classified (green or red) and carries an
//! ordered list of concrete effects. These types describe those effects; they
//! never decide anything about them.

use crate::error::ApprovalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification assigned to an action by the external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Read-only or effect-free; proceeds without review
    Green,
    /// Irreversible or externally visible; requires human approval
    Red,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Green => write!(f, "green"),
            ActionType::Red => write!(f, "red"),
        }
    }
}

impl ActionType {
    /// Parse a classification from a string.
    /// Accepts a few aliases so hand-written requests read naturally.
    pub fn from_str_loose(s: &str) -> Option<ActionType> {
        match s.to_lowercase().trim() {
            "green" | "auto" | "safe" => Some(ActionType::Green),
            "red" | "review" | "dangerous" => Some(ActionType::Red),
            _ => None,
        }
    }

    pub fn requires_review(&self) -> bool {
        matches!(self, ActionType::Red)
    }
}

/// What a single change does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ChangeKind {
    /// A new file or resource
    Create,
    /// An edit to an existing file or resource
    Modify,
    /// Removal of a file or resource
    Delete,
    /// Running a process
    Execute,
    /// An outbound network call
    Network,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Create => write!(f, "create"),
            ChangeKind::Modify => write!(f, "modify"),
            ChangeKind::Delete => write!(f, "delete"),
            ChangeKind::Execute => write!(f, "execute"),
            ChangeKind::Network => write!(f, "network"),
        }
    }
}

impl ChangeKind {
    /// Parse a change kind, accepting common aliases.
    pub fn from_str_loose(s: &str) -> Option<ChangeKind> {
        match s.to_lowercase().trim() {
            "create" | "new" | "add" => Some(ChangeKind::Create),
            "modify" | "write" | "edit" | "update" => Some(ChangeKind::Modify),
            "delete" | "remove" | "rm" => Some(ChangeKind::Delete),
            "execute" | "exec" | "run" | "command" | "cmd" => Some(ChangeKind::Execute),
            "network" | "net" | "http" | "fetch" => Some(ChangeKind::Network),
            _ => None,
        }
    }

    /// Label used in card headings, e.g. `[DELETE]`.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Modify => "MODIFY",
            ChangeKind::Delete => "DELETE",
            ChangeKind::Execute => "EXECUTE",
            ChangeKind::Network => "NETWORK",
        }
    }
}

impl TryFrom<String> for ChangeKind {
    type Error = ApprovalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChangeKind::from_str_loose(&value).ok_or_else(|| {
            ApprovalError::InvalidInput(format!("unrecognized change kind '{}'", value))
        })
    }
}

/// Risk tier computed by the classifier. Carried, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::None => write!(f, "none"),
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
            RiskTier::Critical => write!(f, "critical"),
        }
    }
}

impl RiskTier {
    pub fn from_str_loose(s: &str) -> Option<RiskTier> {
        match s.to_lowercase().trim() {
            "none" => Some(RiskTier::None),
            "low" => Some(RiskTier::Low),
            "medium" | "med" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            "critical" | "crit" => Some(RiskTier::Critical),
            _ => None,
        }
    }

    /// Emoji marker shown in the review banner.
    pub fn marker(&self) -> &'static str {
        match self {
            RiskTier::None => "🟢",
            RiskTier::Low => "🟡",
            RiskTier::Medium => "🟠",
            RiskTier::High => "🔴",
            RiskTier::Critical => "🔴🔴",
        }
    }
}

/// One atomic effect of a proposed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// File path or resource name
    target: String,
    kind: ChangeKind,
    /// Content before the change, if the caller captured it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    before: Option<String>,
    /// Content after the change (new file body, command line, request body)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after: Option<String>,
}

impl Change {
    pub fn new(target: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            target: target.into(),
            kind,
            before: None,
            after: None,
        }
    }

    /// Build a change from an untyped kind string.
    pub fn parse(target: impl Into<String>, kind: &str) -> Result<Self, ApprovalError> {
        let kind = ChangeKind::try_from(kind.to_string())?;
        Ok(Self::new(target, kind))
    }

    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }
}

/// The wire form of an approval request, as submitted by the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Missing means the classifier never ran. The gate refuses to guess.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,
    pub description: String,
    pub risk: RiskTier,
    #[serde(default)]
    pub changes: Vec<Change>,
}
