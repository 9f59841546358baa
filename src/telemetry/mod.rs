//! Telemetry module.
//!
//! Structured logging setup. Library code emits `tracing` events; binaries
//! and tests that want to see them install a subscriber here.

mod logging;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
