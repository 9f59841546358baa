//! Configuration loading from environment variables.
//!
//! All values are read from `REQUEST_PQ_*` variables with sensible defaults.
//! Invalid values fall back to defaults without failing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `REQUEST_PQ_OUTPUT_CAPACITY` | 0 | Output stream capacity (0 = rendezvous) |
//! | `REQUEST_PQ_DROP_POLICY` | flush | `flush` or `discard` when the handle is dropped |
//! | `REQUEST_PQ_START_PAUSED` | false | Start the stream adapter paused |
//! | `REQUEST_PQ_THREAD_NAME` | request-pq | Adapter thread name prefix |
//! | `REQUEST_PQ_LOG_FORMAT` | json | `json` or `pretty` |
//! | `REQUEST_PQ_LOG_LEVEL` | info | `EnvFilter` directive |
//! | `REQUEST_PQ_LOG_FILE` | unset | Log file path (stderr when unset) |

use std::path::PathBuf;

use crate::scheduler::{DrainPolicy, StreamConfig};
use crate::telemetry::{LogConfig, LogFormat};

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a boolean env var (`1/0`, `true/false`, `yes/no`, `on/off`).
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Read a non-empty string env var.
fn parse_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load stream adapter configuration from environment.
pub fn load_stream_config() -> StreamConfig {
    let defaults = StreamConfig::default();
    let drop_policy = parse_string("REQUEST_PQ_DROP_POLICY")
        .and_then(|v| v.parse::<DrainPolicy>().ok())
        .unwrap_or(defaults.drop_policy);

    StreamConfig {
        output_capacity: parse_usize("REQUEST_PQ_OUTPUT_CAPACITY", defaults.output_capacity),
        drop_policy,
        start_paused: parse_bool("REQUEST_PQ_START_PAUSED", defaults.start_paused),
        thread_name_prefix: parse_string("REQUEST_PQ_THREAD_NAME")
            .unwrap_or(defaults.thread_name_prefix),
    }
}

/// Load logging configuration from environment.
pub fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let format = match parse_string("REQUEST_PQ_LOG_FORMAT").as_deref() {
        Some("pretty") => LogFormat::Pretty,
        Some("json") => LogFormat::Json,
        _ => defaults.format,
    };

    LogConfig {
        format,
        level: parse_string("REQUEST_PQ_LOG_LEVEL").unwrap_or(defaults.level),
        output_path: parse_string("REQUEST_PQ_LOG_FILE").map(PathBuf::from),
    }
}
