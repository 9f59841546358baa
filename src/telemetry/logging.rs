//! Subscriber setup for the adapter's `tracing` events.
//!
//! The scheduler only emits events; callers that want them recorded install
//! a subscriber once, to stderr or to a file.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, fields included.
    #[default]
    Json,
    /// Multi-line output for reading adapter lifecycle by eye.
    Pretty,
}

/// Subscriber settings, usually from [`crate::config::load_log_config`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `request_pq::scheduler=debug` to see
    /// ingestion and emission exits.
    pub level: String,
    /// File sink, truncated on init. `None` writes to stderr.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

/// Why [`init_logging`] refused to install a subscriber.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the process-wide subscriber. A second call fails with
/// [`LogError::AlreadyInitialized`].
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;

    let installed = match (config.format, config.output_path.as_deref()) {
        (LogFormat::Json, Some(path)) => {
            let file = open_log_file(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
                .try_init()
        }
        (LogFormat::Json, None) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Pretty, Some(path)) => {
            let file = open_log_file(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .try_init()
        }
        (LogFormat::Pretty, None) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|_| LogError::AlreadyInitialized)
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LogError> {
    std::fs::File::create(path).map_err(|e| LogError::FileOpen(e.to_string()))
}
