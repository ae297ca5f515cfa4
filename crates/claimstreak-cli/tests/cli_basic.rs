//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! config file, SQLite database and fallback file never leak between tests.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with HOME pointed at `home`.
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_claimstreak-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("CLAIMSTREAK_ENV")
        .env_remove("CLAIMSTREAK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_claim_starts_streak() {
    let home = tempfile::tempdir().unwrap();
    let outcome = run_json(
        home.path(),
        &["claim", "0xABC", "--at", "2025-01-01T10:00:00+00:00"],
    );
    assert_eq!(outcome["user"], "0xabc");
    assert_eq!(outcome["record"]["currentStreak"], 1);
    assert_eq!(outcome["transition"], "started");
    assert_eq!(outcome["new_badge"]["id"], "first_steps");
    assert!(home.path().join(".config/claimstreak/claims.db").exists());
}

#[test]
fn test_claim_refused_during_cooldown() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["claim", "0xabc", "--at", "2025-01-01T10:00:00+00:00"]);

    let (code, _, stderr) = run_cli(
        home.path(),
        &["claim", "0xabc", "--at", "2025-01-01T12:00:00+00:00"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("on cooldown"), "stderr: {stderr}");

    let forced = run_json(
        home.path(),
        &["claim", "0xabc", "--at", "2025-01-02T09:00:00+00:00", "--force"],
    );
    assert_eq!(forced["record"]["currentStreak"], 2);
}

#[test]
fn test_status_for_unknown_address() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["status", "0xnobody"]);
    assert_eq!(status["record"]["currentStreak"], 0);
    assert!(status["source"].is_null());
    assert_eq!(status["cooldown"]["eligible"], true);
    assert_eq!(status["multiplier"], 1);
}

#[test]
fn test_backup_round_trip_between_homes() {
    let source = tempfile::tempdir().unwrap();
    run_json(source.path(), &["claim", "0xabc", "--at", "2025-01-01T10:00:00+00:00"]);
    let (code, code_out, stderr) = run_cli(source.path(), &["backup", "export", "0xabc"]);
    assert_eq!(code, 0, "export failed: {stderr}");

    let target = tempfile::tempdir().unwrap();
    let outcome = run_json(target.path(), &["backup", "import", code_out.trim()]);
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["userKey"], "0xabc");

    let status = run_json(
        target.path(),
        &["status", "0xabc", "--at", "2025-01-01T20:00:00+00:00"],
    );
    assert_eq!(status["record"]["totalClaims"], 1);
}

#[test]
fn test_backup_import_rejects_garbage() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(home.path(), &["backup", "import", "not-a-code"]);
    assert_ne!(code, 0);
    assert!(stdout.contains("\"success\": false"));
    assert!(stderr.contains("invalid backup code"));
}

#[test]
fn test_backup_export_without_data_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["backup", "export", "0xabc"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no streak data found"));
}

#[test]
fn test_cooldown_reset_and_sync() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["cooldown", "sync", "0xabc", "--time-left", "3600"]);
    let status = run_json(home.path(), &["cooldown", "status", "0xabc"]);
    assert_eq!(status["eligible"], false);

    let (code, stdout, _) = run_cli(home.path(), &["cooldown", "reset", "0xabc"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("cooldown reset"));
    let status = run_json(home.path(), &["cooldown", "status", "0xabc"]);
    assert_eq!(status["eligible"], true);
}

#[test]
fn test_badges_catalog() {
    let home = tempfile::tempdir().unwrap();
    let catalog = run_json(home.path(), &["badges"]);
    assert_eq!(catalog["catalogVersion"], "1");
    let ids: Vec<_> = catalog["badges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 8);
    assert_eq!(ids.first().map(String::as_str), Some("first_steps"));
    assert_eq!(ids.last().map(String::as_str), Some("streak_legend"));
}

#[test]
fn test_config_set_get_and_invalid_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "cooldown.period_hours", "12"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "cooldown.period_hours"]);
    assert_eq!(stdout.trim(), "12");

    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "nope.nothing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_clear_requires_confirmation() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["clear"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--yes"));

    run_json(home.path(), &["claim", "0xabc", "--at", "2025-01-01T10:00:00+00:00"]);
    let (code, _, _) = run_cli(home.path(), &["clear", "--yes"]);
    assert_eq!(code, 0);

    // Fallback copy still answers.
    let status = run_json(
        home.path(),
        &["status", "0xabc", "--at", "2025-01-01T11:00:00+00:00"],
    );
    assert_eq!(status["source"], "fallback");
}

#[test]
fn test_invalid_address_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["status", "0x a b"]);
    assert_ne!(code, 0);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_badges_progress_for_address() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["claim", "0xabc", "--at", "2025-01-01T10:00:00+00:00"]);
    let progress = run_json(home.path(), &["badges", "0xABC"]);
    assert_eq!(progress["user"], "0xabc");
    assert_eq!(progress["catalogVersion"], "1");
    assert_eq!(progress["badges"][0]["id"], "first_steps");
    assert_eq!(progress["badges"][0]["earned"], true);
    assert_eq!(progress["badges"][1]["earned"], false);
}

#[test]
fn test_config_rejects_oversized_cooldown() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(
        home.path(),
        &["config", "set", "cooldown.period_hours", "4000000000"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("cooldown.period_hours"), "stderr: {stderr}");

    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "cooldown.period_hours"]);
    assert_eq!(stdout.trim(), "24");
}

#[test]
fn test_cooldown_sync_ignores_out_of_range_time_left() {
    let home = tempfile::tempdir().unwrap();
    let synced = run_json(
        home.path(),
        &["cooldown", "sync", "0xabc", "--time-left", "9223372036854775807"],
    );
    assert!(synced["nextEligibleAt"].is_null());
    let status = run_json(home.path(), &["cooldown", "status", "0xabc"]);
    assert_eq!(status["eligible"], true);
}
