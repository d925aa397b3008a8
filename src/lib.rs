//! cliffgate — the approval cliff for autonomous agent runtimes.
//!
//! Red actions (file mutation, deletion, process execution, network calls)
//! stop here until a human approves or rejects them on the terminal. Green
//! actions pass straight through. Every decision is audited.
//!
//! The binary entrypoint is in `main.rs`.

pub mod approval;
pub mod audit;
pub mod card;
pub mod cli;
pub mod config;
pub mod error;

pub use approval::{ApprovalDecision, ApprovalManager, ReviewPath, Verdict};
pub use card::{ActionRequest, ActionType, Change, ChangeKind, DiffCard, RiskTier};
pub use error::{ApprovalError, ApprovalResult};
