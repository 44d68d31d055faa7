//! Incoming-webhook delivery (HTTP POST via curl).

#![allow(missing_docs)]

use std::process::Command;
use std::time::Duration;

use crate::core::config::WebhookConfig;
use crate::core::errors::{Result, TrackerError};

/// Posts `{"text": ...}` payloads to a Slack-style incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    url: String,
    timeout: Duration,
}

impl WebhookSender {
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.url.trim(), Duration::from_secs(config.timeout_secs))
    }

    /// Deliver `text` and return the HTTP status.
    ///
    /// curl enforces the timeout with `--max-time`. A transport failure or a
    /// non-2xx status is an error.
    pub fn send(&self, text: &str) -> Result<u16> {
        let body = payload(text)?;
        let output = Command::new("curl")
            .arg("--silent")
            .arg("--show-error")
            .arg("--max-time")
            .arg(self.timeout.as_secs().max(1).to_string())
            .arg("--header")
            .arg("Content-Type: application/json")
            .arg("--data-binary")
            .arg(&body)
            .arg("--output")
            .arg("/dev/null")
            .arg("--write-out")
            .arg("%{http_code}")
            .arg(&self.url)
            .output()
            .map_err(|e| TrackerError::Webhook {
                details: format!("failed to run curl: {e}"),
            })?;

        if !output.status.success() {
            return Err(TrackerError::Webhook {
                details: format!(
                    "curl exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let status = parse_status(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(status, "webhook delivered");
        Ok(status)
    }
}

fn payload(text: &str) -> Result<String> {
    Ok(serde_json::to_string(&serde_json::json!({ "text": text }))?)
}

fn parse_status(raw: &str) -> Result<u16> {
    let status: u16 = raw.trim().parse().map_err(|_| TrackerError::Webhook {
        details: format!("unreadable HTTP status {raw:?}"),
    })?;
    if (200..300).contains(&status) {
        Ok(status)
    } else {
        Err(TrackerError::Webhook {
            details: format!("webhook responded with HTTP {status}"),
        })
    }
}
