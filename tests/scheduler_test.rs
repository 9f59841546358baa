//! Tests for the priority queue API.

use rand::Rng;
use request_pq::scheduler::{MinHeap, PriorityQueue, QueueError};

fn drain_priorities(queue: &PriorityQueue<i64>) -> Vec<i64> {
    let mut out = Vec::new();
    while let Ok(v) = queue.dequeue() {
        out.push(v);
    }
    out
}

#[test]
fn new_queue_is_empty() {
    let queue: PriorityQueue<String> = PriorityQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
    assert_eq!(queue.dequeue(), Err(QueueError::Empty));
    assert_eq!(queue.peek_priority(), None);
}

#[test]
fn empty_error_is_recoverable() {
    let err = PriorityQueue::<u8>::default().dequeue().unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.to_string(), "pop an empty queue");
    assert!(!QueueError::InvariantViolation("x".into()).is_recoverable());
}

#[test]
fn lower_number_is_served_first() {
    let queue = PriorityQueue::new();
    queue.enqueue("background", 20);
    queue.enqueue("interactive", 0);
    queue.enqueue("normal", 10);
    queue.enqueue("urgent", -5);

    assert_eq!(queue.peek_priority(), Some(-5));
    assert_eq!(queue.dequeue(), Ok("urgent"));
    assert_eq!(queue.dequeue(), Ok("interactive"));
    assert_eq!(queue.dequeue(), Ok("normal"));
    assert_eq!(queue.dequeue(), Ok("background"));
    assert!(queue.is_empty());
}

#[test]
fn fifo_within_same_priority() {
    let queue = PriorityQueue::new();
    for i in 0..1000 {
        queue.enqueue(i, 7);
    }
    for i in 0..1000 {
        assert_eq!(queue.dequeue(), Ok(i));
    }
}

#[test]
fn heterogeneous_payloads_via_enum() {
    #[derive(Debug, PartialEq)]
    enum Payload {
        Text(&'static str),
        Number(f64),
    }

    let queue = PriorityQueue::new();
    queue.enqueue(Payload::Text("test"), 20);
    assert_eq!(queue.len(), 1);
    queue.enqueue(Payload::Number(2.5), 19);
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.dequeue(), Ok(Payload::Number(2.5)));
    assert_eq!(queue.dequeue(), Ok(Payload::Text("test")));
}

#[test]
fn drain_after_enqueues_is_non_decreasing() {
    let mut rng = rand::thread_rng();
    let queue = PriorityQueue::new();
    for _ in 0..5000 {
        let p = rng.gen_range(-50..50);
        queue.enqueue(p, p);
    }
    let out = drain_priorities(&queue);
    assert_eq!(out.len(), 5000);
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn random_mix_more_enqueue_than_dequeue() {
    let mut rng = rand::thread_rng();
    let queue = PriorityQueue::new();
    for _ in 0..10_000 {
        if rng.gen_range(0..3) != 0 {
            let v = rng.gen_range(0..20);
            queue.enqueue(v, v);
        } else if queue.dequeue().is_err() {
            assert!(queue.is_empty());
        }
    }
    let out = drain_priorities(&queue);
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn random_mix_more_dequeue_than_enqueue() {
    let mut rng = rand::thread_rng();
    let queue = PriorityQueue::new();
    for _ in 0..10_000 {
        if rng.gen_range(0..3) == 0 {
            let v = rng.gen_range(0..20);
            queue.enqueue(v, v);
        } else if queue.dequeue().is_err() {
            assert!(queue.is_empty());
        }
    }
    let out = drain_priorities(&queue);
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn len_tracks_enqueues_minus_dequeues() {
    let mut rng = rand::thread_rng();
    let queue = PriorityQueue::new();
    let (mut enqueued, mut dequeued) = (0usize, 0usize);
    for i in 0..2000 {
        if rng.gen_bool(0.6) {
            queue.enqueue(i, rng.gen_range(0..10));
            enqueued += 1;
        } else if queue.dequeue().is_ok() {
            dequeued += 1;
        }
        assert_eq!(queue.len(), enqueued - dequeued);
    }
}

#[test]
fn drain_returns_everything_in_order() {
    let queue = PriorityQueue::with_capacity(8);
    queue.enqueue('c', 3);
    queue.enqueue('a', 1);
    queue.enqueue('b', 2);
    queue.enqueue('d', 3);
    assert_eq!(queue.drain(), vec!['a', 'b', 'c', 'd']);
    assert!(queue.is_empty());
}

#[test]
fn min_heap_invariant_under_random_ops() {
    use request_pq::scheduler::Entry;

    let mut rng = rand::thread_rng();
    let mut heap = MinHeap::new();
    let mut seq = 0u64;
    for _ in 0..5000 {
        if rng.gen_bool(0.55) {
            heap.push(Entry::new(rng.gen_range(-10..10), seq, ()));
            seq += 1;
        } else {
            heap.pop();
        }
        assert!(heap.is_valid());
    }
}
