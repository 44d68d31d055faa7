//! Sticky idle classification, re-sampled every few ticks.

#![allow(missing_docs)]

/// Holds the idle/active verdict between periodic idle-time samples.
#[derive(Debug, Clone)]
pub struct IdleClassifier {
    threshold_secs: f64,
    poll_interval_secs: u64,
    check_interval_secs: u64,
    ticks_since_check: u64,
    recheck_pending: bool,
    idle: bool,
}

impl IdleClassifier {
    #[must_use]
    pub const fn new(
        threshold_secs: f64,
        poll_interval_secs: u64,
        check_interval_secs: u64,
    ) -> Self {
        Self {
            threshold_secs,
            poll_interval_secs,
            check_interval_secs,
            ticks_since_check: 0,
            recheck_pending: false,
            idle: false,
        }
    }

    /// Advance one tick. When a re-check is due, `sample` is called for the
    /// current idle seconds; `None` keeps the previous verdict.
    pub fn tick(&mut self, sample: impl FnOnce() -> Option<f64>) -> bool {
        self.ticks_since_check += 1;
        let elapsed = self.ticks_since_check.saturating_mul(self.poll_interval_secs);
        if elapsed >= self.check_interval_secs || self.recheck_pending {
            self.ticks_since_check = 0;
            self.recheck_pending = false;
            match sample() {
                Some(secs) => self.idle = secs >= self.threshold_secs,
                None => tracing::debug!("idle probe unavailable, keeping previous verdict"),
            }
        }
        self.idle
    }

    /// Machine just woke: assume active and re-sample on the next tick.
    pub const fn reset_after_wake(&mut self) {
        self.idle = false;
        self.ticks_since_check = 0;
        self.recheck_pending = true;
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle
    }

    #[must_use]
    pub const fn ticks_since_check(&self) -> u64 {
        self.ticks_since_check
    }
}
