//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data
//! directory with desktop notifications switched off.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ergowellness-cli"))
        .args(args)
        .env("ERGOWELLNESS_DATA_DIR", data_dir)
        .env("ERGOWELLNESS_NO_NOTIFY", "1")
        .env_remove("ERGOWELLNESS_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed non-JSON ({e}): {stdout}"))
}

#[test]
fn test_config_written_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "scheduler.tick_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "storage.backend", "json"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "storage.backend"]);
    assert_eq!(stdout.trim(), "json");
}

#[test]
fn test_config_rejects_zero_tick() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "scheduler.tick_secs", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_settings_default_and_update() {
    let dir = tempfile::tempdir().unwrap();
    let settings = run_json(dir.path(), &["settings", "list"]);
    assert_eq!(settings["breakInterval"], 20);
    assert_eq!(settings["hydrationInterval"], 120);
    assert_eq!(settings["notifications"], true);

    let updated = run_json(dir.path(), &["settings", "set", "breakInterval", "45"]);
    assert_eq!(updated["breakInterval"], 45);

    let (_, stdout, _) = run_cli(dir.path(), &["settings", "get", "breakIntervalMinutes"]);
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_settings_rejects_zero_interval() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["settings", "set", "breakInterval", "0"]);
    assert_eq!(code, 1);
    let settings = run_json(dir.path(), &["settings", "list"]);
    assert_eq!(settings["breakInterval"], 20);
}

#[test]
fn test_mobile_variant_defaults() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "defaults.variant", "mobile"]);
    let settings = run_json(dir.path(), &["settings", "list"]);
    assert_eq!(settings["breakInterval"], 30);
}

#[test]
fn test_first_tick_fires_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_json(dir.path(), &["reminder", "tick"]);
    assert_eq!(report["fired"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_snooze_then_status() {
    let dir = tempfile::tempdir().unwrap();
    let snoozed = run_json(dir.path(), &["reminder", "snooze", "5"]);
    assert_eq!(snoozed["type"], "reminderSnoozed");
    let last = snoozed["lastBreakTime"].as_i64().unwrap();

    let status = run_json(dir.path(), &["reminder", "status"]);
    let timer = &status["timers"][0];
    assert_eq!(timer["kind"], "break");
    assert_eq!(timer["lastEventMs"].as_i64(), Some(last));
    assert_eq!(timer["phase"], "waiting");
}

#[test]
fn test_take_break_now_reports_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run_json(dir.path(), &["reminder", "break"]);
    assert_eq!(outcome["reminder"], "break");
}

#[test]
fn test_check_in_and_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let entry = run_json(dir.path(), &["track", "check-in", "--pain", "6", "--stiffness", "3"]);
    assert_eq!(entry["painLevel"], 6);

    run_json(dir.path(), &["track", "log-break"]);
    let dashboard = run_json(dir.path(), &["track", "dashboard"]);
    assert_eq!(dashboard["todayBreaks"], 1);
    assert_eq!(dashboard["currentPainLevel"], 6);

    let history = run_json(dir.path(), &["track", "history"]);
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_check_in_rejects_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["track", "check-in", "--pain", "11", "--stiffness", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_badge_awarded_once() {
    let dir = tempfile::tempdir().unwrap();
    let first = run_json(dir.path(), &["track", "badge", "First Break"]);
    assert_eq!(first["awarded"], true);
    let second = run_json(dir.path(), &["track", "badge", "First Break"]);
    assert_eq!(second["awarded"], false);
    let badges = run_json(dir.path(), &["track", "badges"]);
    assert_eq!(badges.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_onboard_export_and_clear_on_json_backend() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "storage.backend", "json"]);

    let settings = run_json(
        dir.path(),
        &["data", "onboard", "--break-interval", "25", "--strict", "--user-data", r#"{"name":"Sam"}"#],
    );
    assert_eq!(settings["breakInterval"], 25);
    assert!(dir.path().join("store.json").exists());

    let export = run_json(dir.path(), &["data", "export"]);
    assert_eq!(export["onboarded"], true);
    assert_eq!(export["userData"]["name"], "Sam");
    assert!(export["lastBreakTime"].is_i64());

    let cleared = run_json(dir.path(), &["data", "clear"]);
    assert_eq!(cleared["cleared"], true);
    let export = run_json(dir.path(), &["data", "export"]);
    assert_eq!(export.as_object().map(|o| o.len()), Some(0));
}

#[test]
fn test_theme_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_json(dir.path(), &["data", "theme"])["theme"], "light");
    assert_eq!(run_json(dir.path(), &["data", "theme", "dark"])["theme"], "dark");
    let (code, _, _) = run_cli(dir.path(), &["data", "theme", "sepia"]);
    assert_eq!(code, 1);
}

#[test]
fn test_reset_keeps_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["reminder", "dismiss"]);
    run_json(dir.path(), &["track", "log-hydration"]);
    run_json(dir.path(), &["settings", "set", "strictMode", "true"]);

    let settings = run_json(dir.path(), &["data", "reset"]);
    assert_eq!(settings["strictMode"], false);

    let export = run_json(dir.path(), &["data", "export"]);
    assert_eq!(export["hydrationToday"], 0);
    assert!(export["lastBreakTime"].is_i64());
}

#[test]
fn test_daemon_serves_stdin_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ergowellness-cli"))
        .args(["daemon", "--tick-secs", "1"])
        .env("ERGOWELLNESS_DATA_DIR", dir.path())
        .env("ERGOWELLNESS_NO_NOTIFY", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start daemon");

    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, r#"{{"type":"snoozeReminder","minutes":5}}"#).unwrap();
    writeln!(stdin, "not json").unwrap();
    writeln!(stdin, r#"{{"type":"quickStretch"}}"#).unwrap();
    writeln!(stdin, r#"{{"type":"shutdown"}}"#).unwrap();
    drop(stdin);

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let signals: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .collect();
    let types: Vec<String> = signals
        .iter()
        .filter_map(|signal| signal["type"].as_str().map(str::to_string))
        .collect();
    let shown = signals
        .iter()
        .find(|signal| signal["type"] == "showReminder")
        .expect("stretch prompt was printed");
    assert_eq!(shown["reminder"], "stretch");
    assert_eq!(types.first().map(String::as_str), Some("schedulerStarted"));
    assert!(types.iter().any(|t| t == "reminderSnoozed"));
    assert_eq!(types.last().map(String::as_str), Some("schedulerStopped"));
}
