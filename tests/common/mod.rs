use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_apptracker") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "apptracker.exe"
    } else {
        "apptracker"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve apptracker binary path for integration test"),
    }
}

/// Run the binary with `home` as `$HOME` so no real user config leaks in.
pub fn run_cli_case(
    case_name: &str,
    home: &Path,
    args: &[&str],
    envs: &[(&str, &str)],
) -> CmdResult {
    let root = std::env::temp_dir().join("apptracker-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", home)
        .env("RUST_BACKTRACE", "1")
        .env_remove("APPTRACKER_OUTPUT_FORMAT")
        .env_remove("APPTRACKER_WEBHOOK_URL")
        .env_remove("APPTRACKER_LOG_DIR");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("execute apptracker command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Parse the last non-empty stdout line as JSON.
pub fn last_json_line(result: &CmdResult) -> serde_json::Value {
    let line = result
        .stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_else(|| panic!("no stdout; log: {}", result.log_path.display()));
    serde_json::from_str(line)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}); log: {}", result.log_path.display()))
}
