//! Integration tests for human-readable (non-`--json`) CLI output.
//!
//! The default behavior is quiet (no logs to stderr beyond warnings).
//! `-v`/`--verbose` raises the log level; `--no-color` strips the Tallinn
//! Night palette from stdout.

use std::process::Command;

fn ntm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ntm"))
}

fn isolated_home() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn test_safety_status_reports_rule_counts() {
    let home = isolated_home();
    let output = ntm()
        .env("HOME", home.path())
        .args(["safety", "status"])
        .output()
        .expect("failed to execute ntm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("allowed"), "stdout: {stdout}");
    assert!(stdout.contains("blocked"), "stdout: {stdout}");
}

#[test]
fn test_no_color_strips_ansi_escapes() {
    let home = isolated_home();
    let output = ntm()
        .env("HOME", home.path())
        .args(["--no-color", "safety", "status"])
        .output()
        .expect("failed to execute ntm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains('\u{1b}'), "expected no ANSI escapes, got: {stdout:?}");
}

#[test]
fn test_missing_subcommand_prints_help_and_is_a_usage_error() {
    let output = ntm().output().expect("failed to execute ntm");
    assert!(!output.status.success());
}

#[test]
fn test_respawn_without_manifest_is_an_error_not_a_panic() {
    let home = isolated_home();
    let project = tempfile::tempdir().unwrap();
    let output = ntm()
        .env("HOME", home.path())
        .current_dir(project.path())
        .args(["respawn", "no-such-session", "--all"])
        .output()
        .expect("failed to execute ntm");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no spawn manifest"), "stderr: {stderr}");
}
