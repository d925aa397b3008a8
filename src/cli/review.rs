//! `cliffgate review` — put one action through the gate.
//!
//! 1. Load the config (explicit, discovered, or defaults)
//! 2. Read the action request JSON (file, or `-` for stdin)
//! 3. Open the session audit log
//! 4. Run the gate and print the decision

use crate::approval::{ApprovalManager, Verdict};
use crate::audit::AuditLogger;
use crate::card::{ActionRequest, ActionType};
use crate::config;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for the `cliffgate review` command.
#[derive(Debug, Default)]
pub struct ReviewOptions {
    /// Request file; `-` reads stdin
    pub request: PathBuf,
    /// Config file override
    pub config_path: Option<PathBuf>,
    /// Session ID override (default: auto-generated UUID)
    pub session_id: Option<String>,
}

/// Run the `cliffgate review` command and return the operator's verdict.
pub async fn run_review(options: ReviewOptions) -> Result<Verdict> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let (config, config_path) = config::load(options.config_path.as_deref(), &cwd)?;
    if let Some(path) = &config_path {
        tracing::info!("Using config {}", path.display());
    }

    let request = read_request(&options.request)?;
    if reads_stdin(&options.request) && request.action_type == Some(ActionType::Red) {
        bail!(
            "A red action read from stdin can't be reviewed: stdin is needed for the answer. \
             Pass the request as a file instead."
        );
    }

    let session_id = options
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let logger = AuditLogger::new(&session_id, config.audit.log_dir.as_deref())?;
    let log_path = logger.log_path().to_path_buf();

    let manager = ApprovalManager::for_terminal(session_id, &config, Arc::new(logger));
    let decision = manager
        .submit(request)
        .await
        .context("Action could not be reviewed")?;

    println!();
    match decision.verdict {
        Verdict::Approved => println!(
            "  {} Approved ({})",
            "✓".green().bold(),
            decision.review_path
        ),
        Verdict::Rejected => println!(
            "  {} Rejected ({})",
            "✗".red().bold(),
            decision.review_path
        ),
    }
    println!("  Audit: {}", log_path.display().to_string().dimmed());
    if manager.audit_failures() > 0 {
        eprintln!(
            "  {} The audit record could not be written — see the log output above.",
            "⚠".yellow()
        );
    }
    println!();

    Ok(decision.verdict)
}

fn reads_stdin(path: &Path) -> bool {
    path == Path::new("-")
}

/// Read and parse an action request.
pub fn read_request(path: &Path) -> Result<ActionRequest> {
    let content = if reads_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read request from stdin")?;
        content
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Invalid action request JSON")
}
