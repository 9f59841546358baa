//! Thread-safe priority queue.
//!
//! Uses parking_lot::Mutex for fast synchronous locking. Every operation
//! holds the lock only for the duration of one heap operation; waiting for
//! data is left to callers (see the stream adapter).

use std::cmp::Ordering;

use parking_lot::{Mutex, MutexGuard};

use super::error::QueueError;
use super::heap::{Entry, MinHeap};

/// Heap plus sequence counter. Only ever touched under the queue lock.
#[derive(Debug)]
pub(crate) struct QueueCore<T> {
    heap: MinHeap<T>,
    next_sequence: u64,
}

impl<T> QueueCore<T> {
    fn new(capacity: usize) -> Self {
        Self { heap: MinHeap::with_capacity(capacity), next_sequence: 0 }
    }

    pub(crate) fn push(&mut self, payload: T, priority: i64) {
        if self.next_sequence == u64::MAX {
            self.next_sequence = self.heap.renumber();
            tracing::warn!(
                queued = self.next_sequence,
                "sequence counter exhausted, renumbered queued items"
            );
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Entry::new(priority, sequence, payload));
    }

    /// Pop the next payload, checking it does not sort after the new root.
    pub(crate) fn pop(&mut self) -> Result<T, QueueError> {
        let entry = self.heap.pop().ok_or(QueueError::Empty)?;
        if let Some(next) = self.heap.peek() {
            if entry.compare(next) == Ordering::Greater {
                return Err(QueueError::InvariantViolation(format!(
                    "popped ({}, {}) ahead of ({}, {})",
                    entry.priority(),
                    entry.sequence(),
                    next.priority(),
                    next.sequence()
                )));
            }
        }
        Ok(entry.into_payload())
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn heap_mut(&mut self) -> &mut MinHeap<T> {
        &mut self.heap
    }
}

/// Thread-safe min-priority queue. Lower priority values dequeue first;
/// equal priorities dequeue in enqueue order.
pub struct PriorityQueue<T> {
    core: Mutex<QueueCore<T>>,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a queue with room for `capacity` items before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { core: Mutex::new(QueueCore::new(capacity)) }
    }

    /// Enqueue `payload` with the given priority.
    pub fn enqueue(&self, payload: T, priority: i64) {
        self.core.lock().push(payload, priority);
    }

    /// Dequeue the highest priority payload.
    ///
    /// Fails with [`QueueError::Empty`] when nothing is queued, or
    /// [`QueueError::InvariantViolation`] if the heap order is found broken.
    pub fn dequeue(&self) -> Result<T, QueueError> {
        self.core.lock().pop()
    }

    /// Current queue length.
    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    /// Check if queue is empty.
    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }

    /// Priority of the item that would be dequeued next.
    pub fn peek_priority(&self) -> Option<i64> {
        self.core.lock().heap.peek().map(Entry::priority)
    }

    /// Remove every queued payload in dequeue order, under one lock hold.
    pub fn drain(&self) -> Vec<T> {
        let mut core = self.core.lock();
        core.heap.drain_sorted().into_iter().map(Entry::into_payload).collect()
    }

    /// Acquire the queue lock. The stream adapter binds its condition
    /// variables to this guard.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueCore<T>> {
        self.core.lock()
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
