//! request-pq
//!
//! Reorders an unordered, concurrently produced stream of requests into a
//! priority-ordered stream for a single consumer pool. Lower priority numbers
//! are served first; equal priorities keep submission order.
//!
//! # Layers
//!
//! - [`scheduler::MinHeap`]: array-backed binary min-heap keyed by
//!   `(priority, sequence)`.
//! - [`scheduler::PriorityQueue`]: lock-guarded heap with per-queue
//!   sequencing and renumbering on counter exhaustion.
//! - [`scheduler::decorate_stream`]: ingestion and emission threads that turn
//!   an input channel of [`scheduler::Task`]s into an ordered output channel.
//!
//! # Example
//!
//! ```
//! use request_pq::scheduler::PriorityQueue;
//!
//! let queue = PriorityQueue::new();
//! queue.enqueue("batch", 10);
//! queue.enqueue("interactive", 0);
//! assert_eq!(queue.dequeue(), Ok("interactive"));
//! ```

pub mod config;
pub mod scheduler;
pub mod telemetry;

pub use scheduler::{
    decorate_stream, decorate_stream_with, DecoratedStream, DrainPolicy, PriorityQueue,
    QueueError, StreamConfig, StreamError, Task,
};
