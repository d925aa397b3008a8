//! DiffCard — the reviewable unit shown to the operator.
//!
//! A card is rendered into plain lines exactly once, when it is built. The
//! interactive surface scrolls over those lines and the fallback prompt
//! prints them, so both review paths show the operator the same text.
//!
//! Control characters never reach the operator's terminal: a snapshot with
//! `\r` or an escape sequence could otherwise redraw the lines above it.

use crate::card::types::{Change, ChangeKind, RiskTier};
use crate::error::{ApprovalError, ApprovalResult};
use similar::{ChangeTag, TextDiff};

/// How a rendered line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// `N. [KIND] target`
    Heading(ChangeKind),
    Added,
    Removed,
    /// Unchanged diff context or detail text
    Context,
}

/// A single rendered line of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLine {
    pub style: LineStyle,
    pub text: String,
}

impl CardLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// An action description plus its ordered changes and carried risk tier.
#[derive(Debug, Clone)]
pub struct DiffCard {
    description: String,
    risk: RiskTier,
    changes: Vec<Change>,
    lines: Vec<CardLine>,
}

impl DiffCard {
    /// Build a card. An action with no effects has nothing to approve and
    /// must not reach review.
    pub fn new(
        description: impl Into<String>,
        risk: RiskTier,
        changes: Vec<Change>,
    ) -> ApprovalResult<Self> {
        let description = escape_controls(&description.into());
        if changes.is_empty() {
            return Err(ApprovalError::InvalidInput(format!(
                "'{}' has no changes to review",
                description
            )));
        }
        if let Some(pos) = changes.iter().position(|c| c.target().trim().is_empty()) {
            return Err(ApprovalError::InvalidInput(format!(
                "change {} has an empty target",
                pos + 1
            )));
        }

        let lines = render_lines(&changes);
        Ok(Self {
            description,
            risk,
            changes,
            lines,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn risk(&self) -> RiskTier {
        self.risk
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn lines(&self) -> &[CardLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Targets in presentation order (used for audit records).
    pub fn targets(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.target().to_string()).collect()
    }

    /// Plain-text transcript of the whole card.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Action: {}\n", self.description));
        out.push_str(&format!("Risk:   {}\n", self.risk));
        out.push('\n');
        for line in &self.lines {
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }
}

/// Make control characters visible. Tabs become spaces; everything else
/// uses its Rust escape (`\r`, `\u{1b}`, ...).
pub fn escape_controls(text: &str) -> String {
    if !text.chars().any(char::is_control) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\t' => out.push_str("    "),
            c if c.is_control() => out.extend(c.escape_default()),
            c => out.push(c),
        }
    }
    out
}

fn render_lines(changes: &[Change]) -> Vec<CardLine> {
    let mut lines = Vec::new();

    for (i, change) in changes.iter().enumerate() {
        lines.push(CardLine::new(
            LineStyle::Heading(change.kind()),
            format!(
                "{}. [{}] {}",
                i + 1,
                change.kind().label(),
                escape_controls(change.target())
            ),
        ));

        match (change.kind(), change.before(), change.after()) {
            (ChangeKind::Execute | ChangeKind::Network, before, after) => {
                for text in before.into_iter().chain(after) {
                    for line in text.lines() {
                        lines.push(CardLine::new(
                            LineStyle::Context,
                            format!("    {}", escape_controls(line)),
                        ));
                    }
                }
            }
            (ChangeKind::Modify, Some(before), Some(after)) => {
                let diff = TextDiff::from_lines(before, after);
                for op in diff.iter_all_changes() {
                    let (style, sign) = match op.tag() {
                        ChangeTag::Delete => (LineStyle::Removed, '-'),
                        ChangeTag::Insert => (LineStyle::Added, '+'),
                        ChangeTag::Equal => (LineStyle::Context, ' '),
                    };
                    let text = op.value().trim_end_matches(['\n', '\r']);
                    lines.push(CardLine::new(
                        style,
                        format!("  {} {}", sign, escape_controls(text)),
                    ));
                }
            }
            (_, before, after) => {
                if let Some(before) = before {
                    for line in before.lines() {
                        lines.push(CardLine::new(
                            LineStyle::Removed,
                            format!("  - {}", escape_controls(line)),
                        ));
                    }
                }
                if let Some(after) = after {
                    for line in after.lines() {
                        lines.push(CardLine::new(
                            LineStyle::Added,
                            format!("  + {}", escape_controls(line)),
                        ));
                    }
                }
            }
        }
    }

    lines
}
