//! Integration tests for the `towerwatch` binary.
//!
//! Everything runs against the built-in demo fleet or the config file, so
//! no gateway is needed.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

// ── Helpers ─────────────────────────────────────────────────────────

/// Clears `TOWERWATCH_*` and points config lookups at `home`.
fn towerwatch_in(home: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("towerwatch");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("TOWERWATCH_PROFILE")
        .env_remove("TOWERWATCH_GATEWAY")
        .env_remove("TOWERWATCH_SYNTHETIC")
        .env_remove("TOWERWATCH_OUTPUT")
        .env_remove("TOWERWATCH_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn towerwatch_cmd() -> assert_cmd::Command {
    towerwatch_in("/tmp/towerwatch-cli-test-nonexistent")
}

fn json_stdout(cmd: &mut assert_cmd::Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = towerwatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "expected usage text:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    towerwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("towers")
            .and(predicate::str::contains("history"))
            .and(predicate::str::contains("pump")),
    );
}

#[test]
fn test_version_flag() {
    towerwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("towerwatch"));
}

#[test]
fn test_completions_zsh() {
    towerwatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Demo fleet ──────────────────────────────────────────────────────

#[test]
fn test_synthetic_tower_list() {
    let towers = json_stdout(towerwatch_cmd().args(["--synthetic", "towers", "list", "-o", "json"]));
    let towers = towers.as_array().unwrap();
    assert_eq!(towers.len(), 5);
    assert_eq!(towers[0]["id"], 1);
    assert_eq!(towers[2]["lowWaterAlarm"], true);
    assert_eq!(towers[4]["online"], false);
}

#[test]
fn test_synthetic_plain_list_is_ids() {
    towerwatch_cmd()
        .args(["--synthetic", "towers", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n3\n4\n5\n");
}

#[test]
fn test_unknown_tower_exits_not_found() {
    towerwatch_cmd()
        .args(["--synthetic", "towers", "get", "9"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_synthetic_status() {
    let status = json_stdout(towerwatch_cmd().args(["--synthetic", "status", "-o", "json"]));
    assert_eq!(status["totalTowers"], 5);
    assert_eq!(status["onlineTowers"], 4);
    assert_eq!(status["alarmCount"], 2);
}

#[test]
fn test_synthetic_history_is_repeatable() {
    let args = ["--synthetic", "history", "3", "--hours", "5", "-o", "json"];
    let first = json_stdout(towerwatch_cmd().args(args));
    let second = json_stdout(towerwatch_cmd().args(args));

    let levels = |report: &Value| -> Vec<u64> {
        report["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["waterLevel"].as_u64().unwrap())
            .collect()
    };
    assert_eq!(levels(&first).len(), 5);
    assert_eq!(levels(&first), levels(&second));
    assert!(levels(&first).iter().all(|l| (60..=90).contains(l)));
    assert_eq!(first["stats"]["count"], 5);
    assert_eq!(first["demo"], true);
}

#[test]
fn test_zero_hours_is_usage_error() {
    towerwatch_cmd()
        .args(["--synthetic", "history", "1", "--hours", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_pump_refuses_offline_tower() {
    towerwatch_cmd()
        .args(["--synthetic", "-y", "pump", "5", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline"));
}

#[test]
fn test_pump_command_on_demo_fleet() {
    towerwatch_cmd()
        .args(["--synthetic", "-y", "--color", "never", "pump", "1", "on"])
        .assert()
        .success()
        .stderr(predicate::str::contains("switched on"));
}

#[test]
fn test_mode_command_json_ack() {
    let ack = json_stdout(towerwatch_cmd().args(["--synthetic", "mode", "manual", "-o", "json"]));
    assert_eq!(ack["success"], true);
    assert_eq!(ack["synthetic"], true);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_empty_gateway_is_rejected() {
    towerwatch_cmd()
        .args(["config", "set-gateway", ""])
        .assert()
        .code(2);
}

#[test]
fn test_set_gateway_persists() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap();

    towerwatch_in(home)
        .args(["config", "set-gateway", "10.0.0.5"])
        .assert()
        .success();

    let cfg = json_stdout(towerwatch_in(home).args(["config", "show", "-o", "json"]));
    assert_eq!(cfg["profiles"]["default"]["gateway"], "http://10.0.0.5");
}

#[test]
fn test_use_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    towerwatch_in(dir.path().to_str().unwrap())
        .args(["config", "use", "farm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("farm"));
}

#[test]
fn test_missing_explicit_profile_fails() {
    towerwatch_cmd()
        .args(["--profile", "farm", "towers", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'farm' not found"));
}
