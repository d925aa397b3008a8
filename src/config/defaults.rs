//! Built-in configuration templates.
//!
//! - `default`: audit failures are logged, green actions still proceed
//! - `strict-audit`: a green action that can't be audited is not approved

pub const DEFAULT_YAML: &str = r#"# cliffgate configuration: default
# Red actions always wait for a human. Green actions are approved and audited.

review:
  # How often the review screen redraws while waiting for a key (ms)
  poll_interval_ms: 250
  # How many answers the non-interactive prompt accepts before giving up
  fallback_attempts: 3

audit:
  # Where session logs go (default: ~/.cliffgate/logs)
  # log_dir: /var/log/cliffgate
  # If a green auto-approval can't be written to the audit log:
  #   proceed — approve anyway and log the error
  #   block   — refuse the approval
  on_green_sink_failure: proceed
"#;

pub const STRICT_AUDIT_YAML: &str = r#"# cliffgate configuration: strict-audit
# Nothing is approved without an audit record.

review:
  poll_interval_ms: 250
  fallback_attempts: 3

audit:
  on_green_sink_failure: block
"#;

/// Look up a template by name.
pub fn get_template(name: &str) -> Option<&'static str> {
    match name {
        "default" => Some(DEFAULT_YAML),
        "strict-audit" | "strict" => Some(STRICT_AUDIT_YAML),
        _ => None,
    }
}

/// Template names with a one-line description.
pub fn available_templates() -> Vec<(&'static str, &'static str)> {
    vec![
        ("default", "Green actions proceed even if auditing fails"),
        ("strict-audit", "Green actions are blocked if they can't be audited"),
    ]
}
