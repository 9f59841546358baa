//! Stream adapter lifecycle.
//!
//! State machine for clean termination of the adapter's background tasks:
//! `Running -> Draining -> Stopped`, one-way.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Adapter state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Running,
    Draining,
    Stopped,
}

impl StreamState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// What happens to queued items when the adapter shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Deliver everything already queued, then close the output.
    #[default]
    Flush,
    /// Stop emitting immediately; queued items are dropped.
    Discard,
}

impl std::str::FromStr for DrainPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flush" | "drain" => Ok(Self::Flush),
            "discard" | "drop" => Ok(Self::Discard),
            other => Err(format!("unknown drain policy: {other}")),
        }
    }
}

/// Result of a shutdown request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownResult {
    Complete,
    Timeout { remaining: usize },
}

/// Counters reported once both adapter tasks have exited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub ingested: u64,
    pub emitted: u64,
    /// Items still queued (or dropped mid-send) when emission stopped.
    pub undelivered: usize,
}

/// Lifecycle flags shared by the adapter tasks.
///
/// Writers hold the queue lock while storing so that a task waiting on the
/// queue's condition variable cannot miss a transition.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
    input_closed: AtomicBool,
    discarding: AtomicBool,
    paused: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn new(paused: bool) -> Self {
        Self { paused: AtomicBool::new(paused), ..Self::default() }
    }

    pub(crate) fn state(&self) -> StreamState {
        StreamState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Advance the state machine. Never moves backwards.
    pub(crate) fn advance(&self, to: StreamState) -> bool {
        let prev = self.state.fetch_max(to as u8, Ordering::AcqRel);
        prev < to as u8
    }

    pub(crate) fn input_closed(&self) -> bool {
        self.input_closed.load(Ordering::Acquire)
    }

    pub(crate) fn close_input(&self) {
        self.input_closed.store(true, Ordering::Release);
    }

    pub(crate) fn discarding(&self) -> bool {
        self.discarding.load(Ordering::Acquire)
    }

    pub(crate) fn discard(&self) {
        self.discarding.store(true, Ordering::Release);
    }

    pub(crate) fn paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }
}
