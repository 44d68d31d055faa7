//! Main tracking loop: tick, pace, repeat until signalled.
//!
//! Single-threaded. Each pass checks the shutdown flag, runs one
//! [`Tracker::tick`], then sleeps out the rest of the poll interval in short
//! slices so a signal is noticed promptly without interrupting a tick.

#![allow(missing_docs)]

use std::time::Instant;

use serde::Serialize;

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::daemon::signals::SignalHandler;
use crate::daemon::tracker::{SystemClock, TickOutcome, Tracker};
use crate::logger::jsonl::RecordSink;
use crate::platform::probe::Probe;

/// Counters reported on the stop line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub ticks_recorded: u64,
    pub ticks_skipped: u64,
    pub wakes_detected: u64,
    pub write_errors: u64,
}

impl LoopStats {
    fn record(&mut self, outcome: &TickOutcome) {
        if outcome.woke_after_secs.is_some() {
            self.wakes_detected += 1;
        }
        if outcome.observed.is_some() {
            self.ticks_recorded += 1;
        } else {
            self.ticks_skipped += 1;
        }
    }
}

// ──────────────────── main daemon struct ────────────────────

/// The tracking daemon: owns the probe, the sink and the tracking state.
pub struct TrackingDaemon<S: RecordSink> {
    config: Config,
    tracker: Tracker,
    probe: Box<dyn Probe>,
    sink: S,
    signal_handler: SignalHandler,
    stats: LoopStats,
}

impl<S: RecordSink> TrackingDaemon<S> {
    pub fn new(
        config: Config,
        probe: Box<dyn Probe>,
        sink: S,
        signal_handler: SignalHandler,
    ) -> Self {
        let tracker = Tracker::new(&config.tracker);
        Self {
            config,
            tracker,
            probe,
            sink,
            signal_handler,
            stats: LoopStats::default(),
        }
    }

    /// Run until shutdown is requested.
    ///
    /// Retryable write failures are counted and the loop carries on with the
    /// next tick; any other error stops the loop and is returned.
    pub fn run(&mut self) -> Result<LoopStats> {
        let config_hash = self.config.stable_hash().unwrap_or_default();
        let poll_interval = self.config.tracker.poll_interval();
        tracing::info!(
            poll_interval_secs = self.config.tracker.poll_interval_secs,
            idle_threshold_secs = self.config.tracker.idle_threshold_secs,
            probe = self.probe.name(),
            config_hash = %config_hash,
            "apptracker started"
        );
        let start_time = Instant::now();

        loop {
            if self.signal_handler.should_shutdown() {
                tracing::info!("shutdown requested");
                break;
            }

            let tick_start = Instant::now();
            let pause = match self
                .tracker
                .tick(self.probe.as_mut(), &mut self.sink, &SystemClock)
            {
                // Nothing observed: wait a whole interval before asking the probe again.
                Ok(outcome) if outcome.observed.is_none() => {
                    self.stats.record(&outcome);
                    poll_interval
                }
                Ok(outcome) => {
                    self.stats.record(&outcome);
                    poll_interval.saturating_sub(tick_start.elapsed())
                }
                Err(e) if e.is_retryable() => {
                    self.stats.write_errors += 1;
                    tracing::warn!(code = e.code(), error = %e, "tick failed, continuing");
                    poll_interval.saturating_sub(tick_start.elapsed())
                }
                Err(e) => {
                    tracing::error!(code = e.code(), error = %e, "tick failed, stopping");
                    return Err(e);
                }
            };

            self.signal_handler.sleep_unless_shutdown(pause);
        }

        let stats = self.stats;
        tracing::info!(
            uptime_secs = start_time.elapsed().as_secs(),
            ticks_recorded = stats.ticks_recorded,
            ticks_skipped = stats.ticks_skipped,
            wakes_detected = stats.wakes_detected,
            write_errors = stats.write_errors,
            "apptracker stopped"
        );
        Ok(stats)
    }

    #[must_use]
    pub const fn stats(&self) -> LoopStats {
        self.stats
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }
}

// ──────────────────── tests ────────────────────
