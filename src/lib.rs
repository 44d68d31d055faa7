#![forbid(unsafe_code)]

//! apptracker: a desktop usage tracker.
//!
//! A small daemon polls the frontmost application every few seconds and
//! appends one JSON line per tick to a per-day log, marking idle stretches and
//! machine sleep along the way. The report side folds a day's log into per-app
//! durations, idle time and the most frequent context switch, renders it as a
//! Slack message and posts it to an incoming webhook.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use apptracker::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use apptracker::core::config::Config;
//! use apptracker::report::aggregate::{UsageSummary, aggregate};
//! ```

pub mod prelude;

pub mod core;
pub mod daemon;
pub mod logger;
pub mod monitor;
pub mod platform;
pub mod report;
