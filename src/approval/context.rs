//! Decision state machine for a single review.
//!
//! `AwaitingDecision` moves to exactly one of `Approved` or `Rejected`, once.
//! The context also tracks how far the operator has scrolled through the
//! card, clamped to `[0, max(0, line_count - viewport_height)]`.

use crate::approval::types::Verdict;
use crate::card::DiffCard;
use crate::error::{ApprovalError, ApprovalResult};
use std::fmt;

/// Lines moved by a page up/down.
pub const PAGE_LINES: usize = 5;

/// Lifecycle of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiState {
    /// Card is on screen, waiting for input
    AwaitingDecision,
    Approved,
    Rejected,
}

impl TuiState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TuiState::AwaitingDecision)
    }
}

impl fmt::Display for TuiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuiState::AwaitingDecision => write!(f, "awaiting decision"),
            TuiState::Approved => write!(f, "approved"),
            TuiState::Rejected => write!(f, "rejected"),
        }
    }
}

/// Request-scoped review state. Owns its card.
#[derive(Debug)]
pub struct ApprovalContext {
    card: DiffCard,
    state: TuiState,
    scroll_offset: usize,
}

impl ApprovalContext {
    pub fn new(card: DiffCard) -> Self {
        Self {
            card,
            state: TuiState::AwaitingDecision,
            scroll_offset: 0,
        }
    }

    pub fn card(&self) -> &DiffCard {
        &self.card
    }

    pub fn state(&self) -> TuiState {
        self.state
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Largest valid offset for the given viewport.
    pub fn scroll_cap(&self, viewport_height: usize) -> usize {
        self.card.line_count().saturating_sub(viewport_height)
    }

    /// Pull the offset back under the cap after the viewport grew.
    pub fn clamp(&mut self, viewport_height: usize) {
        self.scroll_offset = self.scroll_offset.min(self.scroll_cap(viewport_height));
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, viewport_height: usize) {
        let cap = self.scroll_cap(viewport_height);
        // A taller viewport can leave the offset past the new cap.
        self.scroll_offset = (self.scroll_offset + 1).min(cap);
    }

    pub fn page_up(&mut self) {
        for _ in 0..PAGE_LINES {
            self.scroll_up();
        }
    }

    pub fn page_down(&mut self, viewport_height: usize) {
        for _ in 0..PAGE_LINES {
            self.scroll_down(viewport_height);
        }
    }

    pub fn jump_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn jump_bottom(&mut self, viewport_height: usize) {
        self.scroll_offset = self.scroll_cap(viewport_height);
    }

    /// Record the operator's verdict. Only valid once.
    pub fn resolve(&mut self, verdict: Verdict) -> ApprovalResult<TuiState> {
        if self.state.is_terminal() {
            return Err(ApprovalError::InvalidTransition { from: self.state });
        }
        self.state = match verdict {
            Verdict::Approved => TuiState::Approved,
            Verdict::Rejected => TuiState::Rejected,
        };
        tracing::debug!(state = %self.state, offset = self.scroll_offset, "review resolved");
        Ok(self.state)
    }
}
