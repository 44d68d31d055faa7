//! Platform probes: frontmost application and input idle time.

pub mod probe;
