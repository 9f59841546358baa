//! Scheduler error types.

use thiserror::Error;

/// Errors returned by the priority queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("pop an empty queue")]
    Empty,

    #[error("heap invariant violated: {0}")]
    InvariantViolation(String),
}

impl QueueError {
    /// Returns true if the caller may simply retry later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Errors from the stream adapter's background tasks.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to spawn {task} task: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}
