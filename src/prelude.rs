//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use apptracker::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, TrackerError};

// Platform
pub use crate::platform::probe::{Probe, ProbeKind, build_probe};

// Monitor
pub use crate::monitor::debounce::AppDebouncer;
pub use crate::monitor::idle::IdleClassifier;
pub use crate::monitor::sleep::{ClockReading, SleepWakeDetector};

// Logger
pub use crate::logger::jsonl::{ActivityRecord, DailyLog, RecordSink};

// Daemon
#[cfg(feature = "daemon")]
pub use crate::daemon::loop_main::{LoopStats, TrackingDaemon};
#[cfg(feature = "daemon")]
pub use crate::daemon::signals::SignalHandler;
pub use crate::daemon::tracker::{Clock, SystemClock, TickOutcome, Tracker};

// Report
pub use crate::report::aggregate::{SwitchPair, TopSwitch, UsageSummary, aggregate};
pub use crate::report::format::format_report;
pub use crate::report::webhook::WebhookSender;
