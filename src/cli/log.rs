//! `cliffgate log` — browse the audit trail.
//!
//! Shows every decision in a session: what was auto-approved, what a human
//! approved, and what was rejected.

use crate::approval::{ReviewPath, Verdict};
use crate::audit::{AuditReader, LogFilter};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Options for the `cliffgate log` command.
#[derive(Debug, Default)]
pub struct LogOptions {
    pub session_id: Option<String>,
    pub verdict: Option<String>,
    pub review_path: Option<String>,
    pub limit: Option<usize>,
    pub summary_only: bool,
    /// Log directory (from config; default ~/.cliffgate/logs)
    pub log_dir: Option<PathBuf>,
}

fn reader_for(log_dir: Option<PathBuf>) -> Result<AuditReader> {
    match log_dir {
        Some(dir) => Ok(AuditReader::with_dir(dir)),
        None => AuditReader::new().context("Failed to initialize log reader"),
    }
}

/// Run the `cliffgate log` command.
pub fn run_log(options: LogOptions) -> Result<()> {
    let verdict = match options.verdict.as_deref() {
        Some(v) => match Verdict::from_str_loose(v) {
            Some(v) => Some(v),
            None => bail!("Unknown verdict filter '{}'. Valid: approved, rejected", v),
        },
        None => None,
    };
    let review_path = match options.review_path.as_deref() {
        Some(p) => match ReviewPath::from_str_loose(p) {
            Some(p) => Some(p),
            None => bail!(
                "Unknown review path filter '{}'. Valid: auto, interactive, fallback",
                p
            ),
        },
        None => None,
    };

    let reader = reader_for(options.log_dir)?;

    let records = if let Some(sid) = options.session_id.as_deref() {
        reader
            .read_session(sid)
            .with_context(|| format!("Failed to read session: {}", sid))?
    } else {
        let records = reader.read_latest_session()?;
        if records.is_empty() {
            println!();
            println!("  {} No audit logs found.", "ℹ".blue());
            println!("  Put an action through the gate first:");
            println!("    {}", "cliffgate review request.json".dimmed());
            println!();
            return Ok(());
        }
        records
    };

    let summary = AuditReader::summarize(&records);

    if options.summary_only {
        println!();
        println!("  Session: {}", summary.session_id.cyan());
        println!();
        println!(
            "  {} total | {} approved ({} auto) | {} rejected",
            summary.total.to_string().bold(),
            summary.approved.to_string().green().bold(),
            summary.auto_approved.to_string().green(),
            summary.rejected.to_string().red().bold(),
        );
        if let (Some(start), Some(end)) = (summary.start_time, summary.end_time) {
            println!(
                "  Duration: {}",
                format_duration((end - start).num_seconds())
            );
        }
        println!();
        return Ok(());
    }

    let filter = LogFilter {
        verdict,
        review_path,
        limit: options.limit,
    };
    let filtered = AuditReader::filter_entries(&records, &filter);

    println!();
    println!("  Session: {}", summary.session_id.cyan());
    println!();
    for record in &filtered {
        println!("  {}", AuditReader::format_entry(record));
    }
    println!();
    println!(
        "  {} {}",
        "─".repeat(40).dimmed(),
        summary.one_line().dimmed()
    );
    println!();

    Ok(())
}

/// List available sessions.
pub fn run_log_list(log_dir: Option<PathBuf>) -> Result<()> {
    let reader = reader_for(log_dir)?;
    let sessions = reader.list_sessions()?;

    if sessions.is_empty() {
        println!();
        println!("  {} No sessions found.", "ℹ".blue());
        println!();
        return Ok(());
    }

    println!();
    println!("  Available sessions:");
    println!();
    for session in &sessions {
        println!("  • {}", session);
    }
    println!();
    println!("  View a session: {}", "cliffgate log --session <id>".dimmed());
    println!();

    Ok(())
}

fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
