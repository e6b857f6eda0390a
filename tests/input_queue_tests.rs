//! Input queue tests

use std::sync::Arc;
use std::thread;

use eeprom_console::queue::{InputQueue, INPUT_QUEUE_SIZE};

#[test]
fn test_order_and_overflow() {
    let queue = InputQueue::<8>::new();

    for b in 0..10u8 {
        queue.push(b);
    }
    assert_eq!(queue.dropped(), 2);

    let drained: Vec<u8> = std::iter::from_fn(|| queue.pop()).collect();
    assert_eq!(drained, (0..8).collect::<Vec<u8>>());
    assert_eq!(queue.take_dropped(), 2);
    assert_eq!(queue.dropped(), 0);
}

#[test]
fn test_default_capacity() {
    let queue: InputQueue = InputQueue::new();
    assert_eq!(queue.capacity(), INPUT_QUEUE_SIZE);
    assert!(queue.is_empty());
}

#[test]
fn test_producer_thread_delivers_everything_it_was_not_refused() {
    let queue = Arc::new(InputQueue::<16>::new());
    let producer_queue = Arc::clone(&queue);

    let producer = thread::spawn(move || {
        let mut accepted = Vec::new();
        for i in 0..5_000u32 {
            let byte = (i % 251) as u8;
            if producer_queue.push(byte) {
                accepted.push(byte);
            }
        }
        accepted
    });

    let mut received = Vec::new();
    loop {
        while let Some(b) = queue.pop() {
            received.push(b);
        }
        if producer.is_finished() {
            break;
        }
        thread::yield_now();
    }
    let accepted = producer.join().unwrap();
    while let Some(b) = queue.pop() {
        received.push(b);
    }

    assert_eq!(received, accepted);
    assert_eq!(queue.dropped() as usize, 5_000 - accepted.len());
}
