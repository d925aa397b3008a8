//! The seam between the approval manager and the operator's terminal.
//!
//! All methods block. The manager calls them from a blocking thread, one
//! review at a time.

use crate::approval::context::ApprovalContext;
use crate::approval::fallback::{FallbackPrompt, DEFAULT_MAX_ATTEMPTS};
use crate::approval::terminal::{self, CrosstermEvents, CrosstermScreen};
use crate::approval::types::Verdict;
use crate::card::DiffCard;
use crate::config::ReviewSettings;
use crate::error::ApprovalResult;
use crossterm::tty::IsTty;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Where reviews are shown.
pub trait ReviewFrontend: Send + Sync {
    /// Whether an interactive display is attached right now.
    fn is_interactive(&self) -> bool;

    /// Full-screen review. Scroll state lives in `context`.
    fn review_interactive(
        &self,
        context: &mut ApprovalContext,
        cancel: &CancellationToken,
    ) -> ApprovalResult<Verdict>;

    /// Linear transcript plus yes/no prompt.
    fn review_fallback(&self, card: &DiffCard) -> ApprovalResult<Verdict>;
}

/// The process's own terminal: crossterm for input, ratatui for drawing,
/// stdin/stdout for the fallback prompt.
#[derive(Debug, Clone)]
pub struct TerminalFrontend {
    poll_interval: Duration,
    fallback_attempts: usize,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        Self {
            poll_interval: terminal::DEFAULT_POLL_INTERVAL,
            fallback_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn from_settings(settings: &ReviewSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            fallback_attempts: settings.fallback_attempts,
        }
    }
}

impl Default for TerminalFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewFrontend for TerminalFrontend {
    fn is_interactive(&self) -> bool {
        // Checked on every request: the terminal can come and go.
        io::stdin().is_tty() && io::stdout().is_tty()
    }

    fn review_interactive(
        &self,
        context: &mut ApprovalContext,
        cancel: &CancellationToken,
    ) -> ApprovalResult<Verdict> {
        terminal::present(
            CrosstermScreen,
            CrosstermBackend::new(io::stdout()),
            CrosstermEvents,
            context,
            self.poll_interval,
            cancel,
        )
    }

    fn review_fallback(&self, card: &DiffCard) -> ApprovalResult<Verdict> {
        let stdin = io::stdin();
        FallbackPrompt::new(stdin.lock(), io::stdout())
            .with_max_attempts(self.fallback_attempts)
            .run(card)
    }
}
