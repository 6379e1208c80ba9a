//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and the subcommands
//! that need no external tools produce the expected output.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `fluency` binary.
fn fluency() -> Command {
    let mut cmd = Command::cargo_bin("fluency").expect("binary 'fluency' should be built");
    // keep a developer's own config out of the tests
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-fluency-config");
    cmd
}

const CAT_READING: &str = r#"{
  "words": [
    {"expected": "cat", "spoken": "cat", "status": "correct", "startTime": 0.0, "endTime": 1.0}
  ],
  "correctCount": 1,
  "errorCount": 0,
  "skipCount": 0,
  "misreadCount": 0,
  "substitutionCount": 0
}"#;

const MIXED_READING: &str = r#"{
  "words": [
    {"expected": "the", "spoken": "the", "status": "correct", "startTime": 0.0, "endTime": 0.4},
    {"expected": "bat", "spoken": "pat", "status": "substituted", "startTime": 0.5, "endTime": 1.0},
    {"expected": "wonderful", "spoken": "wonderful", "status": "correct", "startTime": 1.0, "endTime": 1.8},
    {"expected": "day", "status": "skipped"}
  ],
  "correctCount": 2,
  "errorCount": 2,
  "skipCount": 1,
  "misreadCount": 0,
  "substitutionCount": 1
}"#;

fn fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    fluency()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: fluency"))
        .stdout(predicate::str::contains("assess"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("keyframes"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn version_flag_shows_semver() {
    fluency()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^fluency \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    fluency()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: fluency"));
}

#[test]
fn invalid_subcommand_fails() {
    fluency()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn render_help_lists_options() {
    fluency()
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--audio"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--name"));
}

// ─── assess ──────────────────────────────────────────────────────────────────

#[test]
fn assess_prints_json_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "cat.json", CAT_READING);

    fluency()
        .arg("assess")
        .arg(&input)
        .args(["--duration", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"wordsPerMinute\": 6"))
        .stdout(predicate::str::contains("\"accuracy\": 100"))
        .stdout(predicate::str::contains("\"prosodyGrade\": \"Proficient\""));
}

#[test]
fn assess_markdown_shows_focus_area() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "mixed.json", MIXED_READING);

    fluency()
        .arg("assess")
        .arg(&input)
        .args(["--duration", "4", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Reading Fluency Report"))
        .stdout(predicate::str::contains("## Focus Area"))
        .stdout(predicate::str::contains("bat→pat"))
        .stdout(predicate::str::contains("- wonderful"));
}

#[test]
fn assess_writes_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "mixed.json", MIXED_READING);
    let report = dir.path().join("report.json");

    fluency()
        .arg("assess")
        .arg(&input)
        .args(["--duration", "4", "--output"])
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved report"));

    let written = std::fs::read_to_string(&report).unwrap();
    assert!(written.contains("\"initial_sound\""));
}

#[test]
fn assess_rejects_negative_duration() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "cat.json", CAT_READING);

    fluency()
        .arg("assess")
        .arg(&input)
        .args(["--duration", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn assess_requires_duration_or_audio() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "cat.json", CAT_READING);

    fluency()
        .arg("assess")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--duration or --audio"));
}

#[test]
fn assess_rejects_inconsistent_counts() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(
        dir.path(),
        "bad.json",
        &CAT_READING.replace("\"correctCount\": 1", "\"correctCount\": 5"),
    );

    fluency()
        .arg("assess")
        .arg(&input)
        .args(["--duration", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("correctCount"));
}

// ─── keyframes ───────────────────────────────────────────────────────────────

#[test]
fn keyframes_prints_transition_times() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "cat.json", CAT_READING);

    fluency()
        .arg("keyframes")
        .arg(&input)
        .args(["--duration", "3"])
        .assert()
        .success()
        .stdout("0.000\n1.000\n1.001\n3.000\n");
}

#[test]
fn keyframes_with_holds() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), "cat.json", CAT_READING);

    fluency()
        .arg("keyframes")
        .arg(&input)
        .args(["--duration", "3", "--holds"])
        .assert()
        .success()
        .stdout("0.000\t1.0000\n1.000\t0.0010\n1.001\t1.9990\n");
}

#[test]
fn keyframes_missing_input_fails() {
    fluency()
        .args(["keyframes", "/nonexistent/reading.json", "--duration", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}
