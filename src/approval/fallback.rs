//! Line-based review for when no interactive terminal is attached.
//!
//! Prints the card as a transcript, then asks a yes/no question. Anything
//! other than y/yes/n/no is asked again, a bounded number of times, and then
//! the review fails. It never falls back to a default answer.

use crate::approval::types::Verdict;
use crate::card::DiffCard;
use crate::error::{display_failure, ApprovalError, ApprovalResult};
use colored::Colorize;
use std::io::{BufRead, Write};

/// How many answers are read before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Parse an operator answer. Case-insensitive, surrounding whitespace ignored.
pub fn parse_answer(input: &str) -> Option<Verdict> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Verdict::Approved),
        "n" | "no" => Some(Verdict::Rejected),
        _ => None,
    }
}

/// A yes/no prompt over arbitrary input and output streams.
pub struct FallbackPrompt<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl<R: BufRead, W: Write> FallbackPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Print the card and block until the operator answers.
    pub fn run(&mut self, card: &DiffCard) -> ApprovalResult<Verdict> {
        self.print_card(card).map_err(display_failure)?;

        for attempt in 1..=self.max_attempts {
            write!(self.output, "Approve this action? [y/n]: ").map_err(display_failure)?;
            self.output.flush().map_err(display_failure)?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line).map_err(display_failure)?;
            if read == 0 {
                return Err(ApprovalError::InputClosed);
            }

            if let Some(verdict) = parse_answer(&line) {
                tracing::debug!(%verdict, attempt, "fallback review answered");
                return Ok(verdict);
            }

            tracing::debug!(attempt, "unrecognized fallback answer");
            if attempt < self.max_attempts {
                writeln!(self.output, "Please answer y/yes or n/no.").map_err(display_failure)?;
            }
        }

        Err(ApprovalError::AmbiguousInput {
            attempts: self.max_attempts,
        })
    }

    fn print_card(&mut self, card: &DiffCard) -> std::io::Result<()> {
        let rule = "=".repeat(72);
        writeln!(self.output)?;
        writeln!(self.output, "{}", rule)?;
        writeln!(
            self.output,
            "{} {}",
            card.risk().marker(),
            "ACTION APPROVAL REQUIRED".bold()
        )?;
        writeln!(self.output, "{}", rule)?;
        write!(self.output, "{}", card.transcript())?;
        writeln!(self.output, "{}", rule)?;
        Ok(())
    }
}
