//! Fuzz target for heap and queue operation sequences.
//!
//! Drives arbitrary push/pop/renumber interleavings and checks that the
//! heap property holds after every step and that pops never go backwards.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use request_pq::scheduler::{Entry, MinHeap, PriorityQueue};

#[derive(Arbitrary, Debug)]
enum Op {
    Push(i8),
    Pop,
    Renumber,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut heap = MinHeap::new();
    let queue = PriorityQueue::new();
    let mut sequence = 0u64;
    let mut next_id = 0u32;
    let mut last: Option<(i64, u64)> = None;

    for op in ops {
        match op {
            Op::Push(p) => {
                let priority = i64::from(p);
                heap.push(Entry::new(priority, sequence, next_id));
                queue.enqueue(next_id, priority);
                sequence += 1;
                next_id += 1;
                last = None;
            }
            Op::Pop => {
                let popped = heap.pop();
                assert_eq!(popped.as_ref().map(|e| *e.payload()), queue.dequeue().ok());
                let popped = popped.map(|e| (e.priority(), e.sequence()));
                if let (Some(prev), Some(cur)) = (last, popped) {
                    assert!(prev <= cur, "pop went backwards: {prev:?} then {cur:?}");
                }
                last = popped.or(last);
            }
            Op::Renumber => {
                sequence = heap.renumber();
                last = None;
            }
        }
        assert!(heap.is_valid());
        assert_eq!(heap.len(), queue.len());
    }
});
