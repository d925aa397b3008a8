pub mod defaults;
pub mod parser;
pub mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// File name looked up when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".cliffgate.yaml";

/// Find the config file walking up the directory tree.
pub fn find_config_walking_up(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load the effective configuration.
///
/// An explicit path must exist. Otherwise the nearest `.cliffgate.yaml`
/// above `cwd` is used, and without one the built-in defaults apply.
pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<(GateConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_walking_up(cwd),
    };

    match path {
        Some(path) => {
            let config = parser::parse_config_file(&path)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok((config, Some(path)))
        }
        None => Ok((GateConfig::default(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_walking_up(&nested).unwrap();
        assert_eq!(found, tmp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.yaml");
        assert!(load(Some(&missing), tmp.path()).is_err());
    }

    #[test]
    fn test_explicit_path_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gate.yaml");
        std::fs::write(&path, "review:\n  poll_interval_ms: 50\n").unwrap();

        let (config, used) = load(Some(&path), tmp.path()).unwrap();
        assert_eq!(config.review.poll_interval_ms, 50);
        assert_eq!(used, Some(path));
    }
}
