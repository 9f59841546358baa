//! Priority-ordering stream adapter.
//!
//! Turns an unordered stream of [`Task`]s into a stream of payloads emitted
//! in priority order. One ingestion thread feeds a [`PriorityQueue`]; one
//! emission thread waits on a condition variable bound to the queue's lock,
//! pops the next item and forwards it to a bounded output channel.
//!
//! Shutdown is explicit: [`DecoratedStream::shutdown`] stops ingestion and
//! either flushes or discards what is still queued. Closing the input stream
//! drains the queue and stops the adapter on its own.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{
    bounded, select, Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError,
};
use parking_lot::{Condvar, Mutex};

use super::error::{QueueError, StreamError};
use super::lifecycle::{DrainPolicy, Lifecycle, ShutdownResult, StreamReport, StreamState};
use super::queue::PriorityQueue;

/// One unit of input: an opaque payload and its priority
/// (lower number is served first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<T> {
    pub payload: T,
    pub priority: i64,
}

impl<T> Task<T> {
    pub fn new(payload: T, priority: i64) -> Self {
        Self { payload, priority }
    }
}

impl<T> From<(T, i64)> for Task<T> {
    fn from((payload, priority): (T, i64)) -> Self {
        Self { payload, priority }
    }
}

/// Configuration for the stream adapter.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Output channel capacity. 0 is a rendezvous handoff.
    pub output_capacity: usize,
    /// Applied when the handle is dropped while the adapter is running.
    pub drop_policy: DrainPolicy,
    /// Hold emission until [`DecoratedStream::resume`] is called.
    pub start_paused: bool,
    /// Prefix for the names of the two adapter threads.
    pub thread_name_prefix: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            output_capacity: 0,
            drop_policy: DrainPolicy::Flush,
            start_paused: false,
            thread_name_prefix: "request-pq".to_string(),
        }
    }
}

impl StreamConfig {
    pub fn with_capacity(output_capacity: usize) -> Self {
        Self { output_capacity, ..Self::default() }
    }
}

/// State shared by the handle and both adapter threads.
struct Shared<T> {
    queue: PriorityQueue<T>,
    /// Signalled on enqueue and on every lifecycle change.
    ready: Condvar,
    /// Signalled once the emission thread has exited.
    stopped: Condvar,
    lifecycle: Lifecycle,
    /// Never disconnects while the emission thread holds `Shared`.
    abort_tx: Sender<()>,
}

impl<T> Shared<T> {
    fn close_input(&self) {
        let core = self.queue.lock();
        self.lifecycle.close_input();
        if self.lifecycle.advance(StreamState::Draining) {
            tracing::info!(queued = core.len(), "stream adapter draining");
        }
        self.ready.notify_all();
    }
}

/// Marks the adapter stopped when the emission thread exits, panics included.
/// Dropping `_halt` disconnects ingestion's halt channel so nothing keeps
/// filling a queue that is no longer drained.
struct EmissionExit<'a, T> {
    shared: &'a Shared<T>,
    _halt: Sender<()>,
}

impl<T> Drop for EmissionExit<'_, T> {
    fn drop(&mut self) {
        let core = self.shared.queue.lock();
        self.shared.lifecycle.advance(StreamState::Stopped);
        tracing::info!(undelivered = core.len(), "stream adapter stopped");
        self.shared.stopped.notify_all();
    }
}

/// Handle to a running stream adapter and its ordered output.
pub struct DecoratedStream<T> {
    output: Receiver<T>,
    shared: Arc<Shared<T>>,
    stop_ingest: Mutex<Option<Sender<()>>>,
    drop_policy: DrainPolicy,
    ingestion: Option<JoinHandle<u64>>,
    emission: Option<JoinHandle<(u64, usize)>>,
}

/// Decorate `input` into a priority-ordered output stream with the given
/// output capacity (0 = rendezvous).
pub fn decorate_stream<T: Send + 'static>(
    input: Receiver<Task<T>>,
    output_capacity: usize,
) -> Result<DecoratedStream<T>, StreamError> {
    decorate_stream_with(input, StreamConfig::with_capacity(output_capacity))
}

/// Decorate `input` using an explicit [`StreamConfig`].
pub fn decorate_stream_with<T: Send + 'static>(
    input: Receiver<Task<T>>,
    config: StreamConfig,
) -> Result<DecoratedStream<T>, StreamError> {
    let (output_tx, output_rx) = bounded(config.output_capacity);
    let (stop_tx, stop_rx) = bounded::<()>(0);
    let (abort_tx, abort_rx) = bounded::<()>(1);
    let (halt_tx, halt_rx) = bounded::<()>(0);

    let shared = Arc::new(Shared {
        queue: PriorityQueue::new(),
        ready: Condvar::new(),
        stopped: Condvar::new(),
        lifecycle: Lifecycle::new(config.start_paused),
        abort_tx,
    });

    // If emission fails to spawn, dropping `stop_tx` ends ingestion.
    let ingestion = {
        let shared = Arc::clone(&shared);
        thread::Builder::new()
            .name(format!("{}-ingest", config.thread_name_prefix))
            .spawn(move || ingestion_loop(&shared, input, stop_rx, halt_rx))
            .map_err(|source| StreamError::Spawn { task: "ingestion", source })?
    };
    let emission = {
        let shared = Arc::clone(&shared);
        thread::Builder::new()
            .name(format!("{}-emit", config.thread_name_prefix))
            .spawn(move || emission_loop(&shared, output_tx, abort_rx, halt_tx))
            .map_err(|source| StreamError::Spawn { task: "emission", source })?
    };

    tracing::debug!(
        output_capacity = config.output_capacity,
        paused = config.start_paused,
        "stream adapter started"
    );

    Ok(DecoratedStream {
        output: output_rx,
        shared,
        stop_ingest: Mutex::new(Some(stop_tx)),
        drop_policy: config.drop_policy,
        ingestion: Some(ingestion),
        emission: Some(emission),
    })
}

fn ingestion_loop<T>(
    shared: &Shared<T>,
    input: Receiver<Task<T>>,
    stop: Receiver<()>,
    halt: Receiver<()>,
) -> u64 {
    let mut ingested = 0u64;
    loop {
        select! {
            recv(input) -> msg => match msg {
                Ok(task) => {
                    shared.queue.enqueue(task.payload, task.priority);
                    shared.ready.notify_one();
                    ingested += 1;
                }
                Err(RecvError) => break,
            },
            recv(stop) -> _ => break,
            recv(halt) -> _ => break,
        }
    }
    shared.close_input();
    tracing::debug!(ingested, "ingestion task exited");
    ingested
}

fn emission_loop<T>(
    shared: &Shared<T>,
    output: Sender<T>,
    abort: Receiver<()>,
    halt: Sender<()>,
) -> (u64, usize) {
    let _exit = EmissionExit { shared, _halt: halt };
    let lifecycle = &shared.lifecycle;
    let mut emitted = 0u64;
    let mut dropped = 0usize;

    loop {
        let payload = {
            let mut core = shared.queue.lock();
            while !lifecycle.discarding()
                && (lifecycle.paused() || (core.is_empty() && !lifecycle.input_closed()))
            {
                shared.ready.wait(&mut core);
            }
            if lifecycle.discarding() {
                break;
            }
            match core.pop() {
                Ok(payload) => payload,
                // Input closed and fully drained.
                Err(QueueError::Empty) if lifecycle.input_closed() => break,
                Err(QueueError::Empty) => invariant_violated(QueueError::InvariantViolation(
                    "woke to an empty queue with input still open".to_string(),
                )),
                Err(err) => invariant_violated(err),
            }
        };

        select! {
            send(output, payload) -> res => {
                if res.is_err() {
                    tracing::debug!("output stream disconnected");
                    dropped += 1;
                    break;
                }
                emitted += 1;
            }
            recv(abort) -> _ => {
                dropped += 1;
                break;
            }
        }
    }

    drop(output);
    tracing::debug!(emitted, dropped, "emission task exited");
    (emitted, dropped)
}

fn invariant_violated(err: QueueError) -> ! {
    tracing::error!(error = %err, "emission task aborting");
    panic!("{err}");
}

impl<T> DecoratedStream<T> {
    /// Block until the next ordered payload, or until the adapter has
    /// stopped and the output is empty.
    pub fn recv(&self) -> Result<T, RecvError> {
        self.output.recv()
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.output.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.output.recv_timeout(timeout)
    }

    /// Blocking iterator over the ordered output.
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, T> {
        self.output.iter()
    }

    /// A receiver for consumer threads. All clones share one output stream.
    pub fn output(&self) -> Receiver<T> {
        self.output.clone()
    }

    /// Items waiting in the queue (excludes an item held mid-send).
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn state(&self) -> StreamState {
        self.shared.lifecycle.state()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lifecycle.paused()
    }

    /// Hold emission. Ingestion keeps queueing.
    pub fn pause(&self) {
        let _core = self.shared.queue.lock();
        self.shared.lifecycle.set_paused(true);
    }

    /// Release a paused adapter.
    pub fn resume(&self) {
        let _core = self.shared.queue.lock();
        self.shared.lifecycle.set_paused(false);
        self.shared.ready.notify_all();
    }

    /// Stop ingestion and wait up to `timeout` for emission to finish.
    ///
    /// With [`DrainPolicy::Flush`] everything already queued is delivered
    /// first, so completion depends on a consumer reading the output.
    pub fn shutdown(&self, policy: DrainPolicy, timeout: Duration) -> ShutdownResult {
        self.signal_shutdown(policy);
        self.wait_stopped(timeout)
    }

    /// Wait for both threads and report their counters.
    ///
    /// Does not request shutdown: without a prior [`shutdown`](Self::shutdown)
    /// this returns once the input stream closes and the queue is drained.
    /// A paused adapter is resumed first, since the handle is consumed.
    pub fn join(mut self) -> Result<StreamReport, StreamError> {
        self.resume();
        let emission = self.emission.take().map(JoinHandle::join);
        // Nothing can be emitted any more; make sure ingestion ends too.
        self.stop_ingest.lock().take();
        let ingestion = self.ingestion.take().map(JoinHandle::join);

        let (emitted, dropped) = match emission {
            Some(Ok(counts)) => counts,
            Some(Err(_)) => return Err(StreamError::TaskPanicked("emission")),
            None => (0, 0),
        };
        let ingested = match ingestion {
            Some(Ok(count)) => count,
            Some(Err(_)) => return Err(StreamError::TaskPanicked("ingestion")),
            None => 0,
        };

        Ok(StreamReport {
            ingested,
            emitted,
            undelivered: self.shared.queue.len() + dropped,
        })
    }

    fn signal_shutdown(&self, policy: DrainPolicy) {
        {
            let _core = self.shared.queue.lock();
            if policy == DrainPolicy::Discard {
                self.shared.lifecycle.discard();
            }
            self.shared.lifecycle.set_paused(false);
            self.shared.ready.notify_all();
        }
        if policy == DrainPolicy::Discard {
            // Full means an abort is already pending.
            let _ = self.shared.abort_tx.try_send(());
        }
        if self.stop_ingest.lock().take().is_some() {
            tracing::info!(?policy, "stream adapter shutdown requested");
        }
    }

    fn wait_stopped(&self, timeout: Duration) -> ShutdownResult {
        let deadline = Instant::now().checked_add(timeout);
        let mut core = self.shared.queue.lock();
        while self.shared.lifecycle.state() != StreamState::Stopped {
            match deadline {
                Some(deadline) => {
                    let timed_out = self.shared.stopped.wait_until(&mut core, deadline).timed_out();
                    if timed_out && self.shared.lifecycle.state() != StreamState::Stopped {
                        return ShutdownResult::Timeout { remaining: core.len() };
                    }
                }
                None => self.shared.stopped.wait(&mut core),
            }
        }
        ShutdownResult::Complete
    }
}

impl<T> Drop for DecoratedStream<T> {
    fn drop(&mut self) {
        if self.emission.is_some() && self.state() != StreamState::Stopped {
            self.signal_shutdown(self.drop_policy);
        }
    }
}

impl<T> std::fmt::Debug for DecoratedStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratedStream")
            .field("state", &self.state())
            .field("queued", &self.queued())
            .field("paused", &self.is_paused())
            .finish()
    }
}
