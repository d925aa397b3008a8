//! Approval manager — the gate's public entry point.
//!
//! 1. Refuse unclassified actions
//! 2. Green: approve immediately, audit, return
//! 3. Red: build the card, wait for the review lane, review on a blocking
//!    thread (interactive if a terminal is attached, otherwise the prompt)
//! 4. Audit the decision and return it
//!
//! Review failures are returned as errors. Audit failures are logged and
//! counted but never change a decision that was already made.

use crate::approval::context::ApprovalContext;
use crate::approval::frontend::{ReviewFrontend, TerminalFrontend};
use crate::approval::types::{ApprovalDecision, ReviewPath, Verdict};
use crate::audit::{AuditRecord, AuditSink, SinkError};
use crate::card::{ActionRequest, ActionType, Change, DiffCard, RiskTier};
use crate::config::{GateConfig, SinkFailurePolicy};
use crate::error::{ApprovalError, ApprovalResult};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Gate for agent actions. One instance per review surface.
pub struct ApprovalManager {
    session_id: String,
    sink: Arc<dyn AuditSink>,
    frontend: Arc<dyn ReviewFrontend>,
    green_sink_policy: SinkFailurePolicy,
    /// Red reviews queue here; the terminal shows one card at a time.
    review_lane: Arc<Mutex<()>>,
    shutdown: CancellationToken,
    audit_failures: AtomicUsize,
}

impl ApprovalManager {
    pub fn new(
        session_id: impl Into<String>,
        config: &GateConfig,
        sink: Arc<dyn AuditSink>,
        frontend: Arc<dyn ReviewFrontend>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            sink,
            frontend,
            green_sink_policy: config.audit.on_green_sink_failure,
            review_lane: Arc::new(Mutex::new(())),
            shutdown: CancellationToken::new(),
            audit_failures: AtomicUsize::new(0),
        }
    }

    /// A manager that reviews on this process's terminal.
    pub fn for_terminal(
        session_id: impl Into<String>,
        config: &GateConfig,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let frontend = Arc::new(TerminalFrontend::from_settings(&config.review));
        Self::new(session_id, config, sink, frontend)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Cancelling this token aborts every pending and in-flight review.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Audit records that could not be written so far.
    pub fn audit_failures(&self) -> usize {
        self.audit_failures.load(Ordering::SeqCst)
    }

    /// Gate a request in its wire form.
    pub async fn submit(&self, request: ActionRequest) -> ApprovalResult<ApprovalDecision> {
        self.request(
            request.action_type,
            request.description,
            request.risk,
            request.changes,
        )
        .await
    }

    /// Gate one action. Blocks (asynchronously) until a red action is reviewed.
    pub async fn request(
        &self,
        action_type: Option<ActionType>,
        description: impl Into<String>,
        risk: RiskTier,
        changes: Vec<Change>,
    ) -> ApprovalResult<ApprovalDecision> {
        let action_type = action_type.ok_or(ApprovalError::ClassificationMissing)?;
        let description = description.into();

        match action_type {
            ActionType::Green => self.auto_approve(description, risk, &changes),
            ActionType::Red => self.review(description, risk, changes).await,
        }
    }

    fn auto_approve(
        &self,
        description: String,
        risk: RiskTier,
        changes: &[Change],
    ) -> ApprovalResult<ApprovalDecision> {
        let decision = ApprovalDecision::new(Verdict::Approved, ReviewPath::Auto);
        let record = AuditRecord {
            timestamp: decision.decided_at,
            session_id: self.session_id.clone(),
            action_type: ActionType::Green,
            description,
            risk,
            verdict: decision.verdict,
            review_path: decision.review_path,
            targets: changes.iter().map(|c| c.target().to_string()).collect(),
            review_duration_ms: None,
        };

        if let Err(e) = self.emit(&record) {
            if self.green_sink_policy == SinkFailurePolicy::Block {
                return Err(ApprovalError::AuditUnavailable(e.to_string()));
            }
        }

        tracing::debug!(description = %record.description, "green action auto-approved");
        Ok(decision)
    }

    async fn review(
        &self,
        description: String,
        risk: RiskTier,
        changes: Vec<Change>,
    ) -> ApprovalResult<ApprovalDecision> {
        // Invalid cards never reach the display.
        let card = DiffCard::new(description, risk, changes)?;

        // The lane guard moves into the blocking task so the next review waits
        // for the terminal to be restored, even if this future is dropped.
        let lane = Arc::clone(&self.review_lane).lock_owned().await;
        let cancel = self.shutdown.child_token();
        let _cancel_on_drop = cancel.clone().drop_guard();

        let frontend = Arc::clone(&self.frontend);
        let review_card = card.clone();
        let started = Instant::now();

        let outcome = tokio::task::spawn_blocking(move || {
            let _lane = lane;
            review_blocking(frontend.as_ref(), review_card, &cancel)
        })
        .await;

        let (verdict, review_path) = match outcome {
            Ok(Ok(reviewed)) => reviewed,
            Ok(Err(e)) => {
                tracing::warn!("Review of '{}' did not complete: {}", card.description(), e);
                return Err(e);
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                return Err(ApprovalError::DisplayFailure(format!(
                    "review task failed: {}",
                    e
                )))
            }
        };

        let decision = ApprovalDecision::new(verdict, review_path);
        let record = AuditRecord {
            timestamp: decision.decided_at,
            session_id: self.session_id.clone(),
            action_type: ActionType::Red,
            description: card.description().to_string(),
            risk: card.risk(),
            verdict,
            review_path,
            targets: card.targets(),
            review_duration_ms: Some(
                u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            ),
        };
        // The decision is final; a failed write is only reported.
        let _ = self.emit(&record);

        tracing::info!(
            verdict = %verdict,
            path = %review_path,
            "'{}' reviewed",
            card.description()
        );
        Ok(decision)
    }

    fn emit(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.sink.append(record).map_err(|e| {
            self.audit_failures.fetch_add(1, Ordering::SeqCst);
            tracing::error!(session = %self.session_id, "Failed to write audit record: {}", e);
            e
        })
    }
}

/// Interactive review if possible, the prompt otherwise. A display failure
/// gets exactly one fallback attempt.
fn review_blocking(
    frontend: &dyn ReviewFrontend,
    card: DiffCard,
    cancel: &CancellationToken,
) -> ApprovalResult<(Verdict, ReviewPath)> {
    if cancel.is_cancelled() {
        return Err(ApprovalError::Cancelled);
    }

    if frontend.is_interactive() {
        let mut context = ApprovalContext::new(card.clone());
        match frontend.review_interactive(&mut context, cancel) {
            Ok(verdict) => {
                tracing::debug!(offset = context.scroll_offset(), "interactive review finished");
                return Ok((verdict, ReviewPath::Interactive));
            }
            Err(ApprovalError::DisplayFailure(reason)) => {
                tracing::warn!("Interactive review failed ({}), falling back to prompt", reason);
            }
            Err(e) => return Err(e),
        }
    }

    if cancel.is_cancelled() {
        return Err(ApprovalError::Cancelled);
    }
    let verdict = frontend.review_fallback(&card)?;
    Ok((verdict, ReviewPath::Fallback))
}
