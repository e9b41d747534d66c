use concurrent_queue_mini::{FifoQueue, Queue, SafeQueue, StatsSnapshot, new_queue};
use std::sync::Arc;

#[test]
fn test_fresh_queue_is_empty() {
    let queue: Queue<i32> = Queue::new();

    assert!(queue.is_empty());
    assert_eq!(queue.size(), 0);
    assert_eq!(queue.dequeue(), None);
    assert_eq!(queue.peek(), None);
    assert_eq!(queue.dequeue_or_default(), (0, false));
    assert_eq!(queue.peek_or_default(), (0, false));

    let strings: Queue<String> = Queue::default();
    assert_eq!(strings.dequeue_or_default(), (String::new(), false));
}

#[test]
fn test_dequeue_follows_insertion_order() {
    let queue = Queue::new();
    for value in 1..=5 {
        queue.enqueue(value);
    }

    for expected in 1..=5 {
        assert_eq!(queue.dequeue_or_default(), (expected, true));
    }
    assert_eq!(queue.dequeue_or_default(), (0, false));
    assert!(queue.is_empty());
}

#[test]
fn test_enqueue_appends_at_tail() {
    let queue = Queue::new();
    queue.enqueue(0);
    assert_eq!(queue.snapshot(), vec![0]);

    queue.enqueue(1);
    assert_eq!(queue.snapshot(), vec![0, 1]);
}

#[test]
fn test_dequeue_removes_only_head() {
    let queue: Queue<i32> = [0, 1, 2].into_iter().collect();

    assert_eq!(queue.dequeue(), Some(0));
    assert_eq!(queue.snapshot(), vec![1, 2]);
}

#[test]
fn test_size_tracks_enqueues_minus_dequeues() {
    let queue = Queue::new();
    for value in 0..10 {
        queue.enqueue(value);
    }
    for _ in 0..4 {
        assert!(queue.dequeue().is_some());
    }

    assert_eq!(queue.size(), 6);
    assert!(!queue.is_empty());
}

#[test]
fn test_is_empty_matches_size() {
    let queue = Queue::new();
    assert_eq!(queue.is_empty(), queue.size() == 0);

    queue.enqueue("a");
    assert_eq!(queue.is_empty(), queue.size() == 0);

    queue.dequeue();
    assert_eq!(queue.is_empty(), queue.size() == 0);

    // Extra dequeues on empty must not push size below zero
    queue.dequeue();
    assert_eq!(queue.size(), 0);
    assert!(queue.is_empty());
}

#[test]
fn test_peek_does_not_mutate() {
    let queue: Queue<String> = ["first", "second"].into_iter().map(String::from).collect();

    for _ in 0..3 {
        assert_eq!(queue.peek().as_deref(), Some("first"));
        assert_eq!(queue.size(), 2);
    }
    assert_eq!(queue.peek_or_default(), ("first".to_string(), true));

    assert_eq!(queue.dequeue().as_deref(), Some("first"));
    assert_eq!(queue.peek().as_deref(), Some("second"));
    assert_eq!(queue.size(), 1);
}

#[test]
fn test_peek_with_borrows_head() {
    let queue = Queue::new();
    queue.enqueue(vec![1, 2, 3]);

    assert_eq!(queue.peek_with(|head| head.len()), Some(3));
    assert_eq!(queue.size(), 1);

    queue.dequeue();
    assert_eq!(queue.peek_with(|head| head.len()), None);
}

#[test]
fn test_is_full_always_false() {
    let queue = Queue::with_capacity(16);
    assert!(!queue.is_full());

    for value in 0..10_000 {
        queue.enqueue(value);
        assert!(!queue.is_full());
    }
    assert_eq!(queue.size(), 10_000);
}

#[test]
fn test_stats_count_operations() {
    let queue = Queue::new();
    queue.enqueue(1);
    queue.enqueue(2);
    queue.dequeue();
    queue.peek();
    queue.dequeue();
    queue.dequeue();
    queue.peek();

    let stats = queue.stats();
    assert_eq!(
        stats,
        StatsSnapshot {
            enqueued: 2,
            dequeued: 2,
            empty_reads: 2,
        }
    );
    assert_eq!(stats.outstanding(), queue.size() as u64);
}

#[test]
fn test_usable_through_trait_object() {
    let queue: Arc<dyn FifoQueue<u8>> = Arc::new(Queue::new());
    queue.enqueue(7);
    queue.enqueue(8);

    assert_eq!(queue.size(), 2);
    assert_eq!(queue.peek(), Some(7));
    assert!(!queue.is_full());
    assert_eq!(queue.dequeue_or_default(), (7, true));
    assert_eq!(queue.dequeue(), Some(8));
    assert!(queue.is_empty());
    assert_eq!(queue.peek_or_default(), (0, false));
}

#[test]
fn test_new_queue_is_independent() {
    let first: SafeQueue<&str> = new_queue();
    let second: SafeQueue<&str> = new_queue();

    first.enqueue("only in first");
    assert_eq!(first.size(), 1);
    assert!(second.is_empty());
}

#[test]
fn test_debug_reports_size() {
    let queue: Queue<i32> = (0..3).collect();
    let debug = format!("{:?}", queue);

    assert!(debug.starts_with("Queue"));
    assert!(debug.contains("size: 3"));
}
