//! YAML configuration parser.
//!
//! Every section and key is optional; missing values fall back to defaults.
//!
//! # Example config file:
//! ```yaml
//! review:
//!   poll_interval_ms: 250
//!   fallback_attempts: 3
//! audit:
//!   log_dir: ~/.cliffgate/logs
//!   on_green_sink_failure: block
//! ```

use crate::config::types::*;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_POLL_INTERVAL_MS: u64 = 5_000;
const MAX_FALLBACK_ATTEMPTS: usize = 10;

/// Raw YAML representation before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    review: Option<RawReview>,
    #[serde(default)]
    audit: Option<RawAudit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReview {
    #[serde(default)]
    poll_interval_ms: Option<u64>,
    #[serde(default)]
    fallback_attempts: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAudit {
    #[serde(default)]
    log_dir: Option<String>,
    #[serde(default)]
    on_green_sink_failure: Option<String>,
}

/// Parse a YAML config file from a file path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<GateConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a YAML config string.
pub fn parse_config_str(yaml: &str) -> Result<GateConfig> {
    // An empty file (or one with only comments) is valid: all defaults.
    let raw: RawConfig = if yaml.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    }) {
        RawConfig::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?
    };

    let mut config = GateConfig::default();

    if let Some(review) = raw.review {
        if let Some(ms) = review.poll_interval_ms {
            if ms == 0 || ms > MAX_POLL_INTERVAL_MS {
                bail!(
                    "review.poll_interval_ms must be between 1 and {} (got {})",
                    MAX_POLL_INTERVAL_MS,
                    ms
                );
            }
            config.review.poll_interval_ms = ms;
        }
        if let Some(attempts) = review.fallback_attempts {
            if attempts == 0 || attempts > MAX_FALLBACK_ATTEMPTS {
                bail!(
                    "review.fallback_attempts must be between 1 and {} (got {})",
                    MAX_FALLBACK_ATTEMPTS,
                    attempts
                );
            }
            config.review.fallback_attempts = attempts;
        }
    }

    if let Some(audit) = raw.audit {
        if let Some(dir) = audit.log_dir {
            if dir.trim().is_empty() {
                bail!("audit.log_dir must not be empty");
            }
            config.audit.log_dir = Some(expand_home(dir.trim())?);
        }
        if let Some(policy) = audit.on_green_sink_failure {
            config.audit.on_green_sink_failure = SinkFailurePolicy::from_str_loose(&policy)
                .with_context(|| {
                    format!(
                        "Unknown audit.on_green_sink_failure '{}'. Valid: proceed, block",
                        policy
                    )
                })?;
        }
    }

    Ok(config)
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().context("Could not determine home directory")?;
            Ok(home.join(rest))
        }
        None if path == "~" => dirs::home_dir().context("Could not determine home directory"),
        None => Ok(PathBuf::from(path)),
    }
}
