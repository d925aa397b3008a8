//! Cliffgate — approval gate for agent actions
//!
//! Green actions pass straight through. Red actions stop at the cliff edge
//! until a human has seen exactly what will change and said yes or no.
//!
//! Quick start:
//!   cliffgate init                 # write a starter .cliffgate.yaml
//!   cliffgate review request.json  # gate one action
//!   cliffgate log                  # see what was decided
//!
//! For more info: cliffgate --help

use clap::{Parser, Subcommand};
use cliffgate::approval::Verdict;
use cliffgate::audit::AuditReader;
use cliffgate::cli;
use cliffgate::config;
use colored::Colorize;
use std::path::PathBuf;

/// Exit code when the operator rejects the action.
const EXIT_REJECTED: i32 = 2;

/// Cliffgate: nothing destructive happens without a human yes.
#[derive(Parser)]
#[command(
    name = "cliffgate",
    version,
    about = "Approval gate for agent actions",
    long_about = "Cliffgate shows a reviewer exactly what an agent action will change\n\
                  and records the decision.\n\n\
                  Exit codes for `review`: 0 approved, 2 rejected, 1 error.\n\n\
                  Quick start:\n  \
                  cliffgate init                 # write a starter config\n  \
                  cliffgate review request.json  # gate one action\n  \
                  cliffgate log                  # see what was decided"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Put one action through the gate
    Review {
        /// Action request JSON file (`-` reads stdin)
        request: PathBuf,

        /// Config file (default: nearest .cliffgate.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Session ID for the audit log (default: random UUID)
        #[arg(short, long, env = "CLIFFGATE_SESSION")]
        session: Option<String>,
    },

    /// See what was decided
    Log {
        /// Show a specific session
        #[arg(short, long, help = "Session ID to view")]
        session: Option<String>,

        /// Filter by verdict
        #[arg(short, long, help = "Filter: approved, rejected")]
        verdict: Option<String>,

        /// Filter by review path
        #[arg(short, long, help = "Filter: auto, interactive, fallback")]
        path: Option<String>,

        /// Limit number of entries shown
        #[arg(short, long, help = "Max entries to show")]
        limit: Option<usize>,

        /// Show only the summary
        #[arg(long, help = "Show only the session summary")]
        summary: bool,

        /// List all available sessions
        #[arg(long, help = "List all recorded sessions")]
        list: bool,

        /// Config file (for audit.log_dir)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a config file from a template
    Init {
        #[arg(short, long, default_value = "default")]
        template: String,
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a config file
    Check {
        /// Path to config file
        #[arg(default_value = config::CONFIG_FILE_NAME)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout belongs to the review surface.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cliffgate=warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => show_status(),

        Some(Commands::Review {
            request,
            config,
            session,
        }) => {
            let options = cli::review::ReviewOptions {
                request,
                config_path: config,
                session_id: session,
            };
            match cli::review::run_review(options).await {
                Ok(Verdict::Approved) => Ok(()),
                Ok(Verdict::Rejected) => std::process::exit(EXIT_REJECTED),
                Err(e) => Err(e),
            }
        }

        Some(Commands::Log {
            session,
            verdict,
            path,
            limit,
            summary,
            list,
            config,
        }) => log_dir(config.as_deref()).and_then(|log_dir| {
            if list {
                cli::log::run_log_list(log_dir)
            } else {
                cli::log::run_log(cli::log::LogOptions {
                    session_id: session,
                    verdict,
                    review_path: path,
                    limit,
                    summary_only: summary,
                    log_dir,
                })
            }
        }),

        Some(Commands::Init {
            template,
            output,
            force,
        }) => cli::init::run_init(Some(&template), output.as_deref(), force),

        Some(Commands::Check { path }) => cli::check::run_check(&path),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

/// Audit log directory from the effective config.
fn log_dir(explicit: Option<&std::path::Path>) -> anyhow::Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    let (config, _) = config::load(explicit, &cwd)?;
    Ok(config.audit.log_dir)
}

/// When the user just types `cliffgate`: config in effect plus the last session.
fn show_status() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, path) = config::load(None, &cwd)?;

    println!();
    println!("  {}  {}", "cliffgate".bold(), "— approval gate".green());
    println!("  {}", "━".repeat(40).dimmed());
    println!();
    match &path {
        Some(path) => println!("  Config: {}", path.display().to_string().dimmed()),
        None => println!("  Config: {}", "built-in defaults".dimmed()),
    }

    let reader = match &config.audit.log_dir {
        Some(dir) => Some(AuditReader::with_dir(dir)),
        None => AuditReader::new().ok(),
    };
    if let Some(reader) = reader {
        if let Ok(records) = reader.read_latest_session() {
            if !records.is_empty() {
                let summary = AuditReader::summarize(&records);
                println!("  Last session: {}", summary.one_line());
            }
        }
    }

    println!();
    println!("  {}", "Commands:".dimmed());
    println!("    {}  gate one action", "cliffgate review <file>".bold());
    println!("    {}            see what was decided", "cliffgate log".bold());
    println!("    {}          validate your config", "cliffgate check".bold());
    println!("    {}           write a starter config", "cliffgate init".bold());
    println!();

    Ok(())
}
