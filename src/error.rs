//! Error taxonomy for the approval gate.
//!
//! No variant here is ever converted into a decision. A review that fails is
//! reported to the caller as a failure, and the caller decides what an
//! unreviewable action means.

use crate::approval::context::TuiState;

/// Errors surfaced by the gate.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// Malformed request: no changes, blank target, unknown change kind.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The action arrived without a green/red classification.
    #[error("action has no classification (expected green or red)")]
    ClassificationMissing,

    /// The interactive display could not be driven.
    #[error("display failure: {0}")]
    DisplayFailure(String),

    /// The fallback prompt never received a recognizable answer.
    #[error("no recognizable answer after {attempts} attempts")]
    AmbiguousInput {
        /// How many answers were read before giving up.
        attempts: usize,
    },

    /// A request was resolved twice. Always a caller bug.
    #[error("invalid transition: review already {from}")]
    InvalidTransition {
        /// The terminal state the context was already in.
        from: TuiState,
    },

    /// The fallback input stream closed before an answer arrived.
    #[error("input closed before a decision was made")]
    InputClosed,

    /// The review was cancelled before the operator decided.
    #[error("review cancelled")]
    Cancelled,

    /// A green auto-approval could not be audited and policy says block.
    #[error("audit sink unavailable: {0}")]
    AuditUnavailable(String),
}

impl ApprovalError {
    /// Caller-side programming errors that must not be retried.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ApprovalError::InvalidInput(_) | ApprovalError::ClassificationMissing
        )
    }
}

/// Result type for gate operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;

/// Wrap an I/O failure from the display layer.
pub(crate) fn display_failure(err: impl std::fmt::Display) -> ApprovalError {
    ApprovalError::DisplayFailure(err.to_string())
}
