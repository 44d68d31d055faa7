//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TrackerError};
use crate::core::paths::{expand_home, home_dir};
use crate::platform::probe::ProbeKind;

/// Full apptracker configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub report: ReportConfig,
    pub webhook: WebhookConfig,
    pub paths: PathsConfig,
}

/// Polling cadence and the thresholds driving the tracking state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between ticks. Also the weight of one observation in reports.
    pub poll_interval_secs: u64,
    /// Seconds without input after which the user counts as idle.
    pub idle_threshold_secs: u64,
    /// How often (in seconds) the idle probe is consulted.
    pub idle_check_interval_secs: u64,
    /// Wall-vs-monotonic drift (seconds) that counts as a sleep gap.
    pub sleep_drift_threshold_secs: u64,
    /// How long a new frontmost app must persist before it is accepted.
    pub debounce_secs: u64,
    /// Which probe backend answers "frontmost app" and "idle seconds".
    pub probe: ProbeKind,
    /// Upper bound for a single probe command.
    pub probe_timeout_secs: u64,
}

/// Report formatting knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of apps listed individually before the "Other" bucket.
    pub top_n: usize,
}

/// Incoming-webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WebhookConfig {
    /// Incoming-webhook URL. Empty means "print only".
    pub url: String,
    pub timeout_secs: u64,
}

/// Filesystem paths used by apptracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    /// Directory holding one `<YYYY-MM-DD>.jsonl` file per day.
    pub log_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            idle_threshold_secs: 300,
            idle_check_interval_secs: 30,
            sleep_drift_threshold_secs: 30,
            debounce_secs: 2,
            probe: ProbeKind::Auto,
            probe_timeout_secs: 5,
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_n: 5 }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 15,
        }
    }
}

impl WebhookConfig {
    /// Whether a real URL has been filled in (not empty, not the sample placeholder).
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let url = self.url.trim();
        !url.is_empty() && !url.contains("YOUR")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            config_file: home
                .join(".config")
                .join("apptracker")
                .join("config.toml"),
            log_dir: home
                .join(".local")
                .join("share")
                .join("apptracker")
                .join("logs"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| TrackerError::io(&path_buf, source))?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(TrackerError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.paths.log_dir = expand_home(&cfg.paths.log_dir);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the daemon start line.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes and releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let tracker = &mut self.tracker;
        for (name, slot) in [
            (
                "APPTRACKER_POLL_INTERVAL_SECS",
                &mut tracker.poll_interval_secs,
            ),
            (
                "APPTRACKER_IDLE_THRESHOLD_SECS",
                &mut tracker.idle_threshold_secs,
            ),
            (
                "APPTRACKER_IDLE_CHECK_INTERVAL_SECS",
                &mut tracker.idle_check_interval_secs,
            ),
            (
                "APPTRACKER_SLEEP_DRIFT_THRESHOLD_SECS",
                &mut tracker.sleep_drift_threshold_secs,
            ),
            ("APPTRACKER_DEBOUNCE_SECS", &mut tracker.debounce_secs),
            (
                "APPTRACKER_PROBE_TIMEOUT_SECS",
                &mut tracker.probe_timeout_secs,
            ),
            (
                "APPTRACKER_WEBHOOK_TIMEOUT_SECS",
                &mut self.webhook.timeout_secs,
            ),
        ] {
            if let Some(raw) = lookup(name) {
                *slot = parse_env_u64(name, &raw)?;
            }
        }

        if let Some(raw) = lookup("APPTRACKER_PROBE") {
            tracker.probe = raw.parse().map_err(|details| TrackerError::ConfigParse {
                context: "env",
                details: format!("APPTRACKER_PROBE={raw:?}: {details}"),
            })?;
        }

        if let Some(raw) = lookup("APPTRACKER_TOP_N") {
            let value = parse_env_u64("APPTRACKER_TOP_N", &raw)?;
            self.report.top_n = usize::try_from(value).map_err(|e| TrackerError::ConfigParse {
                context: "env",
                details: format!("APPTRACKER_TOP_N={raw:?}: {e}"),
            })?;
        }

        if let Some(raw) = lookup("APPTRACKER_WEBHOOK_URL") {
            self.webhook.url = raw;
        }

        if let Some(raw) = lookup("APPTRACKER_LOG_DIR") {
            self.paths.log_dir = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tracker.poll_interval_secs", self.tracker.poll_interval_secs),
            (
                "tracker.sleep_drift_threshold_secs",
                self.tracker.sleep_drift_threshold_secs,
            ),
            ("tracker.probe_timeout_secs", self.tracker.probe_timeout_secs),
            ("webhook.timeout_secs", self.webhook.timeout_secs),
        ] {
            if value == 0 {
                return Err(TrackerError::InvalidConfig {
                    details: format!("{name} must be >= 1"),
                });
            }
        }

        if self.report.top_n == 0 {
            return Err(TrackerError::InvalidConfig {
                details: "report.top_n must be >= 1".to_string(),
            });
        }

        if self.paths.log_dir.as_os_str().is_empty() {
            return Err(TrackerError::InvalidConfig {
                details: "paths.log_dir must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|error| TrackerError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
