//! CLI tests: run the real binary against a temp workspace.
//!
//! stdin and stdout are pipes here, so every red review goes through the
//! line prompt. Each test gets its own config with a private log directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        std::fs::write(
            dir.path().join(".cliffgate.yaml"),
            format!("audit:\n  log_dir: {}\n", logs.display()),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn logs(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("cliffgate").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("CLIFFGATE_SESSION");
        cmd
    }
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_green_review_exits_zero() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["review", "--session", "s-green"])
        .arg(fixture("green_read.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Approved (auto)"));

    let log = std::fs::read_to_string(ws.logs().join("s-green.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("\"review_path\":\"auto\""));
}

#[test]
fn test_green_review_from_stdin() {
    let ws = Workspace::new();
    let request = std::fs::read_to_string(fixture("green_read.json")).unwrap();
    ws.cmd()
        .args(["review", "-"])
        .write_stdin(request)
        .assert()
        .success();
}

#[test]
fn test_red_review_from_stdin_is_refused() {
    let ws = Workspace::new();
    let request = std::fs::read_to_string(fixture("red_delete.json")).unwrap();
    ws.cmd()
        .args(["review", "--session", "s-stdin", "-"])
        .write_stdin(request)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Pass the request as a file"));

    assert!(!ws.logs().join("s-stdin.jsonl").exists());
}

#[test]
fn test_red_review_approved_on_prompt() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["review", "--session", "s-red"])
        .arg(fixture("red_delete.json"))
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [DELETE] config.yaml"))
        .stdout(predicate::str::contains("  - database:"))
        .stdout(predicate::str::contains("Approved (fallback)"));

    let log = std::fs::read_to_string(ws.logs().join("s-red.jsonl")).unwrap();
    assert!(log.contains("\"verdict\":\"approved\""));
    assert!(log.contains("\"risk\":\"high\""));
}

#[test]
fn test_red_review_rejected_exits_two() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("review")
        .arg(fixture("red_delete.json"))
        .write_stdin("what?\nno\n")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Please answer y/yes or n/no."))
        .stdout(predicate::str::contains("Rejected (fallback)"));
}

#[test]
fn test_red_review_closed_stdin_is_an_error() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("review")
        .arg(fixture("red_delete.json"))
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("input closed"));
}

#[test]
fn test_unclassified_request_is_an_error() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("review")
        .arg(fixture("unclassified.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no classification"));
}

#[test]
fn test_unknown_change_kind_is_an_error() {
    let ws = Workspace::new();
    let request = ws.path().join("bad.json");
    std::fs::write(
        &request,
        r#"{"action_type": "red", "description": "x", "risk": "low",
            "changes": [{"target": "a", "kind": "teleport"}]}"#,
    )
    .unwrap();

    ws.cmd()
        .arg("review")
        .arg(&request)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unrecognized change kind"));
}

#[test]
fn test_log_shows_session() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["review", "--session", "s-log"])
        .arg(fixture("red_delete.json"))
        .write_stdin("n\n")
        .assert()
        .code(2);

    ws.cmd()
        .args(["log", "--session", "s-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REJECTED"))
        .stdout(predicate::str::contains("delete config.yaml"));

    ws.cmd()
        .args(["log", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s-log"));

    ws.cmd()
        .args(["log", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rejected"));
}

#[test]
fn test_log_without_sessions() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit logs found"));
}

#[test]
fn test_init_then_check() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("cliffgate").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .args(["init", "--template", "strict-audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let written = std::fs::read_to_string(dir.path().join(".cliffgate.yaml")).unwrap();
    assert!(written.contains("on_green_sink_failure: block"));

    let mut cmd = Command::cargo_bin("cliffgate").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid!"))
        .stdout(predicate::str::contains("block"));
}

#[test]
fn test_init_does_not_overwrite() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    let kept = std::fs::read_to_string(ws.path().join(".cliffgate.yaml")).unwrap();
    assert!(kept.contains("log_dir"));
}

#[test]
fn test_init_unknown_template() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("cliffgate").unwrap();
    cmd.current_dir(dir.path())
        .args(["init", "--template", "yolo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown template"));
}

#[test]
fn test_check_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "review:\n  poll_interval_ms: 0\n").unwrap();

    let mut cmd = Command::cargo_bin("cliffgate").unwrap();
    cmd.arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("poll_interval_ms"));
}
