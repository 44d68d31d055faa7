//! Signal handling: SIGTERM/SIGINT request a graceful stop.
//!
//! Uses the `signal-hook` crate for safe signal registration. The tracking loop
//! polls `SignalHandler` once per pass rather than blocking on signals, so an
//! in-flight tick always finishes its emission before the loop exits.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};

/// Granularity at which a pacing sleep re-checks the shutdown flag.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

// ──────────────────── signal handler ────────────────────

/// Shutdown flag shared between the signal hooks and the tracking loop.
///
/// Once set it is never cleared: `RUNNING -> STOPPING` is one-way.
#[derive(Clone)]
pub struct SignalHandler {
    shutdown_flag: Arc<AtomicBool>,
}

impl SignalHandler {
    /// Create a handler and register SIGTERM and SIGINT.
    ///
    /// Registration is best-effort; failures are logged but not fatal.
    pub fn new() -> Self {
        let handler = Self::unregistered();
        handler.register_signals();
        handler
    }

    /// A handler with no OS hooks, driven only by [`request_shutdown`](Self::request_shutdown).
    #[must_use]
    pub fn unregistered() -> Self {
        Self {
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::Relaxed)
    }

    /// Programmatically request shutdown (tests, fatal errors).
    pub fn request_shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::Relaxed);
    }

    /// Sleep for `total`, waking early if shutdown is requested.
    ///
    /// Returns `true` when the sleep was cut short by a shutdown request.
    pub fn sleep_unless_shutdown(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.should_shutdown() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            std::thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }

    fn register_signals(&self) {
        if let Err(e) = signal_hook::flag::register(SIGTERM, Arc::clone(&self.shutdown_flag)) {
            tracing::warn!(error = %e, "failed to register SIGTERM");
        }
        if let Err(e) = signal_hook::flag::register(SIGINT, Arc::clone(&self.shutdown_flag)) {
            tracing::warn!(error = %e, "failed to register SIGINT");
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────── tests ────────────────────
