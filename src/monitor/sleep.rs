//! Sleep/wake detection from monotonic vs wall-clock drift.
//!
//! The monotonic clock stops while the machine is suspended; the wall clock
//! keeps going. When wall time advanced noticeably more than monotonic time
//! between two checks, the difference is the length of the suspend.

#![allow(missing_docs)]

use std::time::Instant;

use chrono::{DateTime, Utc};

/// One reading of both clocks taken at the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub monotonic: Instant,
    pub wall: DateTime<Utc>,
}

impl ClockReading {
    #[must_use]
    pub fn now() -> Self {
        Self {
            monotonic: Instant::now(),
            wall: Utc::now(),
        }
    }
}

/// Infers suspend gaps across consecutive ticks.
#[derive(Debug, Clone)]
pub struct SleepWakeDetector {
    drift_threshold_secs: f64,
    last: Option<ClockReading>,
}

impl SleepWakeDetector {
    #[must_use]
    pub const fn new(drift_threshold_secs: f64) -> Self {
        Self {
            drift_threshold_secs,
            last: None,
        }
    }

    /// Compare `now` against the previous reading and return the detected
    /// sleep gap in seconds, or `0.0`.
    ///
    /// The stored baseline always moves to `now`, so drift never accumulates
    /// across more than one call. The first call only sets the baseline.
    pub fn check(&mut self, now: ClockReading) -> f64 {
        let Some(previous) = self.last.replace(now) else {
            return 0.0;
        };

        let mono_elapsed = now
            .monotonic
            .saturating_duration_since(previous.monotonic)
            .as_secs_f64();
        let wall_elapsed = signed_secs(now.wall - previous.wall);
        let drift = wall_elapsed - mono_elapsed;

        if drift > self.drift_threshold_secs {
            drift
        } else {
            0.0
        }
    }

    /// The reading the next `check` will compare against.
    #[must_use]
    pub const fn baseline(&self) -> Option<ClockReading> {
        self.last
    }
}

#[allow(clippy::cast_precision_loss)]
fn signed_secs(delta: chrono::TimeDelta) -> f64 {
    delta.num_microseconds().map_or_else(
        || delta.num_seconds() as f64,
        |micros| micros as f64 / 1_000_000.0,
    )
}
