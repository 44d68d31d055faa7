//! APT-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Top-level error type for apptracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("[APT-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[APT-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[APT-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[APT-1101] unsupported probe: {details}")]
    UnsupportedProbe { details: String },

    #[error("[APT-2001] log record failure in {path}: {details}")]
    LogRecord { path: PathBuf, details: String },

    #[error("[APT-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[APT-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[APT-3101] webhook delivery failed: {details}")]
    Webhook { details: String },
}

impl TrackerError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "APT-1001",
            Self::MissingConfig { .. } => "APT-1002",
            Self::ConfigParse { .. } => "APT-1003",
            Self::UnsupportedProbe { .. } => "APT-1101",
            Self::LogRecord { .. } => "APT-2001",
            Self::Serialization { .. } => "APT-2101",
            Self::Io { .. } => "APT-3002",
            Self::Webhook { .. } => "APT-3101",
        }
    }

    /// Whether the next tick (or a later run) might succeed where this one failed.
    ///
    /// The daemon keeps ticking after a retryable append failure and stops on
    /// anything else.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Webhook { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<TrackerError> {
        vec![
            TrackerError::InvalidConfig {
                details: String::new(),
            },
            TrackerError::MissingConfig {
                path: PathBuf::new(),
            },
            TrackerError::ConfigParse {
                context: "",
                details: String::new(),
            },
            TrackerError::UnsupportedProbe {
                details: String::new(),
            },
            TrackerError::LogRecord {
                path: PathBuf::new(),
                details: String::new(),
            },
            TrackerError::Serialization {
                context: "",
                details: String::new(),
            },
            TrackerError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            TrackerError::Webhook {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = all_variants();
        let codes: Vec<&str> = errors.iter().map(TrackerError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn display_starts_with_bracketed_code() {
        for err in all_variants() {
            let msg = err.to_string();
            assert!(
                msg.starts_with(&format!("[{}]", err.code())),
                "display should lead with its code: {msg}"
            );
        }
    }

    #[test]
    fn io_failures_are_retryable_but_bad_records_are_not() {
        assert!(
            TrackerError::io("/tmp/x.jsonl", std::io::Error::other("disk full")).is_retryable()
        );
        assert!(
            !TrackerError::Serialization {
                context: "serde_json",
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            !TrackerError::InvalidConfig {
                details: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = TrackerError::io(
            "/tmp/2026-01-01.jsonl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "APT-3002");
        assert!(err.to_string().contains("/tmp/2026-01-01.jsonl"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: TrackerError = json_err.into();
        assert_eq!(err.code(), "APT-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: TrackerError = toml_err.into();
        assert_eq!(err.code(), "APT-1003");
    }
}
