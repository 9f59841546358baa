//! Request scheduling module.
//!
//! Binary min-heap, thread-safe priority queue with overflow-safe
//! sequencing, and the stream adapter that reorders an unordered task
//! stream into priority order.

mod error;
pub mod heap;
mod lifecycle;
mod queue;
mod stream;

pub use error::{QueueError, StreamError};
pub use heap::{Entry, MinHeap};
pub use lifecycle::{DrainPolicy, ShutdownResult, StreamReport, StreamState};
pub use queue::PriorityQueue;
pub use stream::{decorate_stream, decorate_stream_with, DecoratedStream, StreamConfig, Task};
