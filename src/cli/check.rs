//! `cliffgate check` — validate a config file and show the effective settings.

use crate::audit::AuditLogger;
use crate::config::parser;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Run the `cliffgate check` command.
pub fn run_check(config_path: &Path) -> Result<()> {
    let config = parser::parse_config_file(config_path)?;

    let log_dir = match &config.audit.log_dir {
        Some(dir) => dir.display().to_string(),
        None => AuditLogger::log_directory()
            .map(|d| format!("{} (default)", d.display()))
            .unwrap_or_else(|_| "(no home directory)".to_string()),
    };

    println!();
    println!("  {} Config is valid!", "✓".green().bold());
    println!("  File:  {}", config_path.display().to_string().dimmed());
    println!();
    println!(
        "  Poll interval:          {} ms",
        config.review.poll_interval_ms.to_string().cyan()
    );
    println!(
        "  Fallback attempts:      {}",
        config.review.fallback_attempts.to_string().cyan()
    );
    println!("  Audit log directory:    {}", log_dir.cyan());
    println!(
        "  Green sink failure:     {}",
        config.audit.on_green_sink_failure.to_string().cyan()
    );
    println!();

    Ok(())
}
