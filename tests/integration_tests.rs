//! Integration tests: CLI smoke tests and report scenarios against a seeded
//! log directory.

mod common;

use std::fs;
use std::path::Path;

use serde_json::Value;

const DAY: &str = "2026-10-18";

fn seed_log(dir: &Path, lines: &[&str]) {
    fs::create_dir_all(dir).expect("create log dir");
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(dir.join(format!("{DAY}.jsonl")), contents).expect("seed log");
}

fn busy_day(dir: &Path) {
    seed_log(
        dir,
        &[
            r#"{"ts":"2026-10-18T09:00:00Z","app":"Editor","idle":false}"#,
            r#"{"ts":"2026-10-18T09:00:05Z","app":"Editor","idle":false}"#,
            r#"{"ts":"2026-10-18T09:00:10Z","app":"Browser","idle":false}"#,
            r#"{"ts":"2026-10-18T09:00:15Z","app":"Editor","idle":false}"#,
            r#"{"ts":"2026-10-18T10:00:15Z","event":"wake","sleep_seconds":3595}"#,
            r#"{"ts":"2026-10-18T10:00:20Z","app":"Editor","idle":true}"#,
            r#"{"ts":"2026-10-18T10:00:25Z","app":"Browser","idle":false}"#,
        ],
    );
}

fn log_dir_env(dir: &Path) -> (&'static str, String) {
    ("APPTRACKER_LOG_DIR", dir.to_string_lossy().into_owned())
}

#[test]
fn help_command_prints_usage() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("help_command_prints_usage", home.path(), &["--help"], &[]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: apptracker [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let home = tempfile::tempdir().unwrap();
    let result =
        common::run_cli_case("version_command_prints_version", home.path(), &["--version"], &[]);
    assert!(result.status.success());
    assert!(
        result.stdout.contains(env!("CARGO_PKG_VERSION")),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn subcommand_help_flags_work() {
    let home = tempfile::tempdir().unwrap();
    for subcommand in ["daemon", "report", "config", "completions"] {
        let result = common::run_cli_case(
            &format!("help_{subcommand}"),
            home.path(),
            &[subcommand, "--help"],
            &[],
        );
        assert!(
            result.status.success(),
            "{subcommand} --help failed; log: {}",
            result.log_path.display()
        );
    }
}

#[test]
fn config_path_reports_default_location_under_home() {
    let home = tempfile::tempdir().unwrap();
    let result =
        common::run_cli_case("config_path_json", home.path(), &["config", "path", "--json"], &[]);
    assert!(result.status.success());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["command"], "config path");
    assert_eq!(payload["exists"], false);
    let path = payload["path"].as_str().unwrap();
    assert!(path.starts_with(&*home.path().to_string_lossy()), "{path}");
    assert!(path.ends_with(".config/apptracker/config.toml"), "{path}");
}

#[test]
fn config_validate_accepts_defaults() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case(
        "config_validate_defaults",
        home.path(),
        &["config", "validate"],
        &[],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["valid"], true);
    assert_eq!(payload["hash"].as_str().map(str::len), Some(16));
}

#[test]
fn invalid_config_exits_with_user_error() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("bad.toml");
    fs::write(&config, "[tracker]\npoll_interval_secs = 0\n").unwrap();
    let config_arg = config.to_string_lossy().into_owned();

    let result = common::run_cli_case(
        "config_validate_invalid",
        home.path(),
        &["config", "validate", "--config", &config_arg],
        &[],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["valid"], false);
    assert_eq!(payload["code"], "APT-1001");

    let report = common::run_cli_case(
        "report_invalid_config",
        home.path(),
        &["report", "--config", &config_arg],
        &[],
    );
    assert_eq!(report.status.code(), Some(1));
    assert!(report.stderr.contains("APT-1001"), "log: {}", report.log_path.display());
}

#[test]
fn missing_explicit_config_is_a_user_error() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case(
        "missing_explicit_config",
        home.path(),
        &["config", "show", "--config", "/nonexistent/apptracker.toml"],
        &[],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("APT-1002"));
}

#[test]
fn config_show_applies_env_overrides() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case(
        "config_show_env",
        home.path(),
        &["config", "show"],
        &[("APPTRACKER_POLL_INTERVAL_SECS", "10"), ("APPTRACKER_PROBE", "simulated")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["config"]["tracker"]["poll_interval_secs"], 10);
    assert_eq!(payload["config"]["tracker"]["probe"], "simulated");
}

#[test]
fn report_without_records_is_skipped() {
    let home = tempfile::tempdir().unwrap();
    let logs = home.path().join("logs");
    let (key, value) = log_dir_env(&logs);
    let result = common::run_cli_case(
        "report_no_records",
        home.path(),
        &["report", "--date", DAY],
        &[(key, value.as_str())],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["skipped"], true);
    assert_eq!(payload["reason"], "no_records");
}

#[test]
fn report_summarizes_seeded_day() {
    let home = tempfile::tempdir().unwrap();
    let logs = home.path().join("logs");
    busy_day(&logs);
    let (key, value) = log_dir_env(&logs);

    let result = common::run_cli_case(
        "report_seeded_day",
        home.path(),
        &["report", "--date", DAY, "--print-only"],
        &[(key, value.as_str())],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());

    let payload: Value = common::last_json_line(&result);
    assert_eq!(payload["skipped"], false);
    assert_eq!(payload["summary"]["app_durations"]["Editor"], 15);
    assert_eq!(payload["summary"]["app_durations"]["Browser"], 10);
    assert_eq!(payload["summary"]["total_active_seconds"], 25);
    assert_eq!(payload["summary"]["idle_seconds"], 5);
    assert_eq!(payload["summary"]["top_switch"]["pair"]["first"], "Browser");
    assert_eq!(payload["summary"]["top_switch"]["pair"]["second"], "Editor");
    assert_eq!(payload["summary"]["top_switch"]["count"], 3);
    assert_eq!(payload["delivery"]["status"], "print_only");

    let message = payload["message"].as_str().unwrap();
    assert!(message.starts_with(":bar_chart: *App Usage Summary for 2026-10-18 (Sunday)*"));
    assert!(message.contains("Top switch: Browser <-> Editor (3 times)"));
    assert!(message.ends_with("Idle time excluded: 0h 00m"));
}

#[test]
fn report_with_placeholder_webhook_only_prints() {
    let home = tempfile::tempdir().unwrap();
    let logs = home.path().join("logs");
    busy_day(&logs);
    let (key, value) = log_dir_env(&logs);

    let result = common::run_cli_case(
        "report_placeholder_webhook",
        home.path(),
        &["report", "--date", DAY],
        &[
            (key, value.as_str()),
            (
                "APPTRACKER_WEBHOOK_URL",
                "https://hooks.slack.com/services/YOUR/WEBHOOK/URL",
            ),
        ],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["delivery"]["status"], "not_configured");
}

#[test]
fn report_on_all_idle_day_is_skipped() {
    let home = tempfile::tempdir().unwrap();
    let logs = home.path().join("logs");
    seed_log(
        &logs,
        &[
            r#"{"ts":"2026-10-18T09:00:00Z","app":"Editor","idle":true}"#,
            "",
            "garbage line",
            r#"{"ts":"2026-10-18T09:00:05Z","app":"Editor","idle":true}"#,
        ],
    );
    let (key, value) = log_dir_env(&logs);

    let result = common::run_cli_case(
        "report_all_idle",
        home.path(),
        &["report", "--date", DAY, "--print-only"],
        &[(key, value.as_str())],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = common::last_json_line(&result);
    assert_eq!(payload["skipped"], true);
    assert_eq!(payload["reason"], "all_idle");
    assert!(result.stderr.contains("skipping unreadable log line"));
}

#[test]
fn report_human_mode_prints_message() {
    let home = tempfile::tempdir().unwrap();
    let logs = home.path().join("logs");
    busy_day(&logs);
    let (key, value) = log_dir_env(&logs);

    let result = common::run_cli_case(
        "report_human",
        home.path(),
        &["report", "--date", DAY, "--print-only", "--no-color"],
        &[(key, value.as_str()), ("APPTRACKER_OUTPUT_FORMAT", "human")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("Total tracked time: 0h 00m"));
    assert!(
        result.stdout.contains("  Editor   0h 00m  (60.0%)"),
        "log: {}",
        result.log_path.display()
    );
}

#[test]
fn completions_generate_script() {
    let home = tempfile::tempdir().unwrap();
    let result =
        common::run_cli_case("completions_bash", home.path(), &["completions", "bash"], &[]);
    assert!(result.status.success());
    assert!(result.stdout.contains("apptracker"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn daemon_rejects_macos_probe_elsewhere() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case(
        "daemon_macos_probe",
        home.path(),
        &["daemon", "--probe", "macos"],
        &[],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("APT-1101"));
}
