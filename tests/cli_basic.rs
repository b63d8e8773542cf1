//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text.

#![allow(deprecated)] // cargo_bin is deprecated in newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `anisrc` binary.
fn anisrc() -> Command {
    Command::cargo_bin("anisrc").expect("binary 'anisrc' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    anisrc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: anisrc"))
        .stdout(predicate::str::contains("fingerprint"))
        .stdout(predicate::str::contains("otakudesu"))
        .stdout(predicate::str::contains("samehadaku"))
        .stdout(predicate::str::contains("detail"))
        .stdout(predicate::str::contains("home"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn version_flag_shows_semver() {
    anisrc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^anisrc \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    anisrc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: anisrc"));
}

#[test]
fn invalid_subcommand_fails() {
    anisrc()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn otakudesu_help_lists_operations() {
    anisrc()
        .args(["otakudesu", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("episodes"))
        .stdout(predicate::str::contains("downloads"))
        .stdout(predicate::str::contains("mirrors"))
        .stdout(predicate::str::contains("video"));
}

#[test]
fn samehadaku_help_lists_operations() {
    anisrc()
        .args(["samehadaku", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("top-ten"))
        .stdout(predicate::str::contains("latest"))
        .stdout(predicate::str::contains("episode"))
        .stdout(predicate::str::contains("schedule"));
}

#[test]
fn samehadaku_search_help_shows_filters() {
    anisrc()
        .args(["samehadaku", "search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--status"))
        .stdout(predicate::str::contains("--type"))
        .stdout(predicate::str::contains("--order"))
        .stdout(predicate::str::contains("--genre"));
}

#[test]
fn fingerprint_help() {
    anisrc()
        .args(["fingerprint", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("browser fingerprints"))
        .stdout(predicate::str::contains("--count"));
}

// ─── Subcommand argument validation ──────────────────────────────────────────

#[test]
fn detail_missing_url_fails() {
    anisrc()
        .arg("detail")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn video_missing_token_fails() {
    anisrc()
        .args(["otakudesu", "video"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TOKEN>"));
}

// ─── Offline commands ────────────────────────────────────────────────────────

#[test]
fn fingerprint_json_output() {
    let output = anisrc()
        .args(["fingerprint", "--count", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let profiles: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let profiles = profiles.as_array().unwrap();
    assert_eq!(profiles.len(), 2);
    assert!(profiles[0]["user_agent"].as_str().unwrap().contains("Mozilla/5.0"));
}

#[test]
fn detail_rejects_unknown_site() {
    anisrc()
        .args(["detail", "https://example.com/anime/x/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No source handles"));
}

#[test]
fn missing_config_file_fails() {
    anisrc()
        .args(["--config", "/nonexistent/anisrc.toml", "fingerprint"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
