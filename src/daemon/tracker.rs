//! The per-tick tracking state machine.
//!
//! All mutable tracking state (sleep baseline, debounce choice, sticky idle
//! verdict) lives in [`Tracker`]. The loop in `loop_main` owns one and calls
//! [`Tracker::tick`] on a fixed cadence; tests drive it directly with a fake
//! probe, a manual clock and an in-memory sink.

#![allow(missing_docs)]

use std::time::Duration;

use crate::core::config::TrackerConfig;
use crate::core::errors::Result;
use crate::logger::jsonl::{ActivityRecord, RecordSink};
use crate::monitor::debounce::AppDebouncer;
use crate::monitor::idle::IdleClassifier;
use crate::monitor::sleep::{ClockReading, SleepWakeDetector};
use crate::platform::probe::Probe;

/// Source of paired monotonic/wall readings.
pub trait Clock {
    fn now(&self) -> ClockReading;
}

/// The real clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        ClockReading::now()
    }
}

/// What the tracker wrote for one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub app: String,
    pub idle: bool,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Detected sleep gap, when a wake record was emitted this tick.
    pub woke_after_secs: Option<u64>,
    /// `None` when the probe had no frontmost app.
    pub observed: Option<Observed>,
}

/// Tracking state carried across ticks.
#[derive(Debug, Clone)]
pub struct Tracker {
    sleep: SleepWakeDetector,
    debouncer: AppDebouncer,
    idle: IdleClassifier,
}

impl Tracker {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            sleep: SleepWakeDetector::new(config.sleep_drift_threshold_secs as f64),
            debouncer: AppDebouncer::new(Duration::from_secs(config.debounce_secs)),
            idle: IdleClassifier::new(
                config.idle_threshold_secs as f64,
                config.poll_interval_secs,
                config.idle_check_interval_secs,
            ),
        }
    }

    /// Run one tick: sleep check, probe, debounce, idle check, emit.
    ///
    /// A wake record, when due, is appended before the tick's observation.
    /// When the probe has no frontmost app nothing else happens: debounce
    /// and idle state are left exactly as they were. A sink error aborts the
    /// rest of the tick and is returned to the caller.
    pub fn tick(
        &mut self,
        probe: &mut dyn Probe,
        sink: &mut dyn RecordSink,
        clock: &dyn Clock,
    ) -> Result<TickOutcome> {
        let mut outcome = TickOutcome::default();

        let gap = self.sleep.check(clock.now());
        if gap > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let sleep_seconds = gap as u64;
            tracing::info!(sleep_seconds, "wake detected");
            sink.append(&ActivityRecord::wake(clock.now().wall, sleep_seconds))?;
            self.idle.reset_after_wake();
            outcome.woke_after_secs = Some(sleep_seconds);
        }

        let Some(raw) = probe.frontmost_app() else {
            tracing::debug!(probe = probe.name(), "frontmost app unavailable, skipping tick");
            return Ok(outcome);
        };

        let now = clock.now();
        let app = self.debouncer.resolve(&raw, now.monotonic);
        let idle = self.idle.tick(|| probe.idle_seconds());

        sink.append(&ActivityRecord::observation(clock.now().wall, app.clone(), idle))?;
        outcome.observed = Some(Observed { app, idle });
        Ok(outcome)
    }

    #[must_use]
    pub fn current_app(&self) -> Option<&str> {
        self.debouncer.current()
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle.is_idle()
    }
}

// ──────────────────── tests ────────────────────
