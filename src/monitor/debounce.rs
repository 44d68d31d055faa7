//! App-name debouncer: suppresses flicker during window-switch animations.

#![allow(missing_docs)]

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Accepted {
    name: String,
    adopted_at: Instant,
}

/// Resolves raw probe names into the effective app name to record.
#[derive(Debug, Clone)]
pub struct AppDebouncer {
    window: Duration,
    current: Option<Accepted>,
}

impl AppDebouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            current: None,
        }
    }

    /// Feed a raw name observed at `now` and return the effective name.
    ///
    /// A change is only adopted once the previously accepted name has been
    /// current for at least the debounce window. Suppressed changes leave the
    /// adoption time untouched. The very first name is adopted immediately.
    pub fn resolve(&mut self, raw: &str, now: Instant) -> String {
        match &mut self.current {
            Some(accepted) if accepted.name == raw => accepted.name.clone(),
            Some(accepted) if now.saturating_duration_since(accepted.adopted_at) < self.window => {
                accepted.name.clone()
            }
            slot => {
                *slot = Some(Accepted {
                    name: raw.to_string(),
                    adopted_at: now,
                });
                raw.to_string()
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.name.as_str())
    }

    #[must_use]
    pub fn adopted_at(&self) -> Option<Instant> {
        self.current.as_ref().map(|a| a.adopted_at)
    }
}
