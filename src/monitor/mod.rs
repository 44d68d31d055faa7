//! Tracking state machine pieces: sleep/wake detection, app-name debouncing,
//! sticky idle classification.

pub mod debounce;
pub mod idle;
pub mod sleep;
