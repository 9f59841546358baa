//! Array-backed binary min-heap keyed by `(priority, sequence)`.
//!
//! Slots are addressed 1-based so that `parent(k) = k / 2`, `left(k) = 2k`
//! and `right(k) = 2k + 1`. Slot 0 is the reserved sentinel position; the
//! backing vector stores slot `k` at offset `k - 1`, so no dummy element is
//! ever allocated.

use std::cmp::Ordering;

/// A heap entry: caller payload plus its ordering key.
#[derive(Debug)]
pub struct Entry<T> {
    priority: i64,
    sequence: u64,
    payload: T,
}

impl<T> Entry<T> {
    pub fn new(priority: i64, sequence: u64, payload: T) -> Self {
        Self { priority, sequence, payload }
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Tie-break key among entries of equal priority.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Ordering used by the heap: priority ascending, then sequence ascending.
    pub fn compare(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => self.sequence.cmp(&other.sequence),
            ord => ord,
        }
    }
}

#[inline]
fn parent(k: usize) -> usize {
    k / 2
}

#[inline]
fn left_child(k: usize) -> usize {
    k * 2
}

#[inline]
fn right_child(k: usize) -> usize {
    k * 2 + 1
}

/// Binary min-heap. Lower priority values pop first.
#[derive(Debug)]
pub struct MinHeap<T> {
    slots: Vec<Entry<T>>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity) }
    }

    /// Number of real entries (the sentinel slot is not counted).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Smallest entry without removing it.
    pub fn peek(&self) -> Option<&Entry<T>> {
        self.slots.first()
    }

    /// Push an entry. O(log n).
    pub fn push(&mut self, entry: Entry<T>) {
        self.slots.push(entry);
        self.sift_up(self.len());
    }

    /// Remove and return the smallest entry, or `None` when empty. O(log n).
    pub fn pop(&mut self) -> Option<Entry<T>> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        self.swap(1, n);
        let entry = self.slots.pop();
        self.sift_down(1);
        entry
    }

    /// Reassign sequence numbers `0..n` in pop order and return `n`.
    ///
    /// Relative order among the held entries is unchanged.
    pub fn renumber(&mut self) -> u64 {
        let mut sorted = Vec::with_capacity(self.len());
        while let Some(entry) = self.pop() {
            sorted.push(entry);
        }
        for (sequence, entry) in sorted.iter_mut().enumerate() {
            entry.sequence = sequence as u64;
        }
        // Ascending order already satisfies the heap invariant.
        self.slots = sorted;
        self.slots.len() as u64
    }

    /// Remove every entry in pop order.
    pub fn drain_sorted(&mut self) -> Vec<Entry<T>> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(entry) = self.pop() {
            out.push(entry);
        }
        out
    }

    /// Check `compare(parent(i), i) <= 0` for every non-root slot.
    pub fn is_valid(&self) -> bool {
        (2..=self.len()).all(|i| !self.less(i, parent(i)))
    }

    /// Sole ordering seam: is slot `i` strictly before slot `j`?
    fn less(&self, i: usize, j: usize) -> bool {
        self.at(i).compare(self.at(j)) == Ordering::Less
    }

    fn at(&self, k: usize) -> &Entry<T> {
        &self.slots[k - 1]
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.slots.swap(i - 1, j - 1);
    }

    /// Swap two slots without restoring order. Used to corrupt a heap in tests.
    #[cfg(test)]
    pub(crate) fn swap_slots(&mut self, i: usize, j: usize) {
        self.swap(i, j);
    }

    fn sift_up(&mut self, mut k: usize) {
        while k > 1 && self.less(k, parent(k)) {
            self.swap(k, parent(k));
            k = parent(k);
        }
    }

    fn sift_down(&mut self, mut k: usize) {
        let n = self.len();
        loop {
            let l = left_child(k);
            if l > n {
                return;
            }
            let r = right_child(k);
            let smallest = if r <= n && self.less(r, l) { r } else { l };
            if !self.less(smallest, k) {
                return;
            }
            self.swap(k, smallest);
            k = smallest;
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
