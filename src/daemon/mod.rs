//! Daemon subsystem: the per-tick tracking state machine, the pacing loop and
//! signal handling.

#[cfg(feature = "daemon")]
pub mod loop_main;
#[cfg(feature = "daemon")]
pub mod signals;
pub mod tracker;
