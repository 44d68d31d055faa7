//! Probe trait and backends answering "which app is in front" and "how long
//! since the last input".
//!
//! Every backend shells out to a platform tool with a hard timeout. Anything
//! that goes wrong (missing binary, non-zero exit, empty output, timeout) is
//! reported as `None`; the tracking loop treats that as "unavailable".

#![allow(missing_docs)]

use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::mpsc;
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TrackerError};

/// How often a running probe command is polled for completion.
const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(10);

static HID_IDLE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""HIDIdleTime"\s*=\s*(\d+)"#).expect("static HIDIdleTime pattern compiles")
});

// ──────────────────── probe trait ────────────────────

/// Source of the two facts the tracker samples each tick.
pub trait Probe {
    /// Short backend label for diagnostics.
    fn name(&self) -> &'static str;
    /// Name of the frontmost application, `None` when unavailable.
    fn frontmost_app(&mut self) -> Option<String>;
    /// Seconds since the last keyboard/mouse input, `None` when unavailable.
    fn idle_seconds(&mut self) -> Option<f64>;
}

/// Backend selector used by configuration and the `--probe` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// `macos` on macOS, `xdotool` everywhere else.
    #[default]
    Auto,
    Macos,
    Xdotool,
    Simulated,
}

impl ProbeKind {
    /// Resolve `Auto` to a concrete backend for the current OS.
    #[must_use]
    pub const fn resolve(self) -> Self {
        match self {
            Self::Auto => {
                if cfg!(target_os = "macos") {
                    Self::Macos
                } else {
                    Self::Xdotool
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Macos => write!(f, "macos"),
            Self::Xdotool => write!(f, "xdotool"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "macos" => Ok(Self::Macos),
            "xdotool" => Ok(Self::Xdotool),
            "simulated" => Ok(Self::Simulated),
            other => Err(format!(
                "unknown probe '{other}' (expected auto, macos, xdotool or simulated)"
            )),
        }
    }
}

/// Build the probe for `kind`, with `timeout` bounding every external command.
pub fn build_probe(kind: ProbeKind, timeout: Duration) -> Result<Box<dyn Probe>> {
    match kind.resolve() {
        ProbeKind::Macos => {
            if cfg!(target_os = "macos") {
                Ok(Box::new(MacProbe::new(timeout)))
            } else {
                Err(TrackerError::UnsupportedProbe {
                    details: "the macos probe needs osascript and ioreg".to_string(),
                })
            }
        }
        ProbeKind::Simulated => Ok(Box::new(SimulatedProbe::new())),
        ProbeKind::Auto | ProbeKind::Xdotool => Ok(Box::new(XdotoolProbe::new(timeout))),
    }
}

// ──────────────────── macOS ────────────────────

const FRONTMOST_SCRIPT: &str =
    "tell application \"System Events\" to get name of first application process whose frontmost is true";

/// macOS backend: AppleScript via `osascript`, idle time from `ioreg`.
#[derive(Debug, Clone)]
pub struct MacProbe {
    timeout: Duration,
}

impl MacProbe {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Probe for MacProbe {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn frontmost_app(&mut self) -> Option<String> {
        run_command("osascript", &["-e", FRONTMOST_SCRIPT], self.timeout)
            .and_then(|out| non_empty_line(&out))
    }

    fn idle_seconds(&mut self) -> Option<f64> {
        run_command("ioreg", &["-c", "IOHIDSystem", "-d", "4"], self.timeout)
            .and_then(|out| parse_hid_idle_seconds(&out))
    }
}

// ──────────────────── X11 ────────────────────

/// X11 backend: window class via `xdotool`, idle time via `xprintidle`.
#[derive(Debug, Clone)]
pub struct XdotoolProbe {
    timeout: Duration,
}

impl XdotoolProbe {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Probe for XdotoolProbe {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    fn frontmost_app(&mut self) -> Option<String> {
        // The class name is stable across tabs and documents; the title is the fallback.
        run_command(
            "xdotool",
            &["getactivewindow", "getwindowclassname"],
            self.timeout,
        )
        .and_then(|out| non_empty_line(&out))
        .or_else(|| {
            run_command("xdotool", &["getactivewindow", "getwindowname"], self.timeout)
                .and_then(|out| non_empty_line(&out))
        })
    }

    fn idle_seconds(&mut self) -> Option<f64> {
        run_command("xprintidle", &[], self.timeout).and_then(|out| parse_xprintidle_seconds(&out))
    }
}

// ──────────────────── simulated ────────────────────

const SIMULATED_APPS: &[&str] = &["Terminal", "Browser", "Editor", "Chat", "Mail"];

/// Random but plausible probe for dry runs: sticky app choice, occasional
/// outages, idle values spread around the default threshold.
#[derive(Debug)]
pub struct SimulatedProbe {
    rng: StdRng,
    current: usize,
}

impl SimulatedProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic sequence for tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self { rng, current: 0 }
    }
}

impl Default for SimulatedProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for SimulatedProbe {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn frontmost_app(&mut self) -> Option<String> {
        if self.rng.random_bool(0.05) {
            return None;
        }
        if self.rng.random_bool(0.2) {
            self.current = self.rng.random_range(0..SIMULATED_APPS.len());
        }
        SIMULATED_APPS.get(self.current).map(|app| (*app).to_string())
    }

    fn idle_seconds(&mut self) -> Option<f64> {
        if self.rng.random_bool(0.05) {
            return None;
        }
        Some(self.rng.random_range(0.0..600.0))
    }
}

// ──────────────────── helpers ────────────────────

/// Run `program` with `args`, returning trimmed stdout on a successful exit.
///
/// The child is killed once `timeout` elapses. Stdout is drained on a helper
/// thread so a chatty child cannot stall on a full pipe; collecting it is
/// bounded by the same deadline.
pub fn run_command(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(program, error = %e, "probe command could not start");
            return None;
        }
    };

    let mut stdout = child.stdout.take()?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) if start.elapsed() >= timeout => {
                tracing::debug!(program, ?timeout, "probe command timed out");
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
            Ok(None) => thread::sleep(COMMAND_POLL_INTERVAL),
            Err(e) => {
                tracing::debug!(program, error = %e, "probe command wait failed");
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
        }
    };

    // Grandchildren can keep the pipe open after the child exits; the reader
    // thread is abandoned once the deadline passes.
    let status = status?;
    if !status.success() {
        tracing::debug!(program, %status, "probe command failed");
        return None;
    }
    let left = timeout
        .saturating_sub(start.elapsed())
        .max(COMMAND_POLL_INTERVAL);
    match rx.recv_timeout(left) {
        Ok(output) => Some(String::from_utf8_lossy(&output).trim().to_string()),
        Err(_) => {
            tracing::debug!(program, ?timeout, "probe command output still open at timeout");
            None
        }
    }
}

/// First non-blank line of `output`, trimmed.
fn non_empty_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Extract `HIDIdleTime` (nanoseconds) from `ioreg` output, as seconds.
#[allow(clippy::cast_precision_loss)]
fn parse_hid_idle_seconds(output: &str) -> Option<f64> {
    let nanos: u64 = HID_IDLE_TIME.captures(output)?.get(1)?.as_str().parse().ok()?;
    Some(nanos as f64 / 1_000_000_000.0)
}

/// `xprintidle` prints milliseconds since the last input.
#[allow(clippy::cast_precision_loss)]
fn parse_xprintidle_seconds(output: &str) -> Option<f64> {
    let millis: u64 = output.trim().parse().ok()?;
    Some(millis as f64 / 1_000.0)
}
