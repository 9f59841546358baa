//! Concurrent access tests for the priority queue.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use request_pq::scheduler::PriorityQueue;

#[test]
fn concurrent_enqueue_dequeue_keeps_count_consistent() {
    let queue = Arc::new(PriorityQueue::new());
    let running = Arc::new(AtomicBool::new(true));
    let enqueued = Arc::new(AtomicUsize::new(0));
    let dequeued = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for thread_id in 0..8u64 {
        let q = Arc::clone(&queue);
        let running = Arc::clone(&running);
        let enqueued = Arc::clone(&enqueued);
        handles.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            while running.load(Ordering::Relaxed) {
                q.enqueue(thread_id, rng.gen_range(0..20));
                enqueued.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }
    for _ in 0..8 {
        let q = Arc::clone(&queue);
        let running = Arc::clone(&running);
        let dequeued = Arc::clone(&dequeued);
        handles.push(thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                match q.dequeue() {
                    Ok(_) => {
                        dequeued.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => assert!(e.is_recoverable()),
                }
            }
        }));
    }

    thread::sleep(Duration::from_millis(200));
    running.store(false, Ordering::Relaxed);
    for h in handles {
        h.join().unwrap();
    }

    let enqueued = enqueued.load(Ordering::Relaxed);
    let dequeued = dequeued.load(Ordering::Relaxed);
    assert!(dequeued <= enqueued);
    assert_eq!(queue.len(), enqueued - dequeued);
}

#[test]
fn concurrent_enqueuers_then_drain_is_ordered() {
    let queue = Arc::new(PriorityQueue::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let q = Arc::clone(&queue);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..1000 {
                    let p: i64 = rng.gen_range(-100..100);
                    q.enqueue(p, p);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(queue.len(), 8000);
    let out = queue.drain();
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn concurrent_equal_priority_preserves_each_producers_order() {
    let queue = Arc::new(PriorityQueue::new());
    let handles: Vec<_> = (0..4u32)
        .map(|id| {
            let q = Arc::clone(&queue);
            thread::spawn(move || {
                for n in 0..2000u32 {
                    q.enqueue((id, n), 1);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut next = [0u32; 4];
    for (id, n) in queue.drain() {
        assert_eq!(n, next[id as usize]);
        next[id as usize] += 1;
    }
    assert_eq!(next, [2000; 4]);
}
