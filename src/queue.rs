//! Lock-free SPSC (Single Producer, Single Consumer) input byte queue.
//!
//! Bridges the asynchronous byte source (UART reader, stdin thread) to the
//! foreground loop.
//!
//! ```text
//! receive context ──push()──▶ InputQueue ──pop()──▶ App::tick
//!                             (lock-free)
//! ```
//!
//! # Rules
//!
//! - Only the producer calls `push`, only the consumer calls `pop`
//! - Only atomic operations for synchronization
//! - No operation blocks; a full queue rejects the new byte and counts it

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Default queue size.
pub const INPUT_QUEUE_SIZE: usize = 64;

/// Lock-free SPSC byte ring.
///
/// # Memory Ordering
///
/// - Producer writes the byte, then publishes `tail` with `Release`
/// - Consumer loads `tail` with `Acquire` before reading the byte
/// - Consumer releases the slot by publishing `head` with `Release`;
///   the producer loads `head` with `Acquire` before reusing it
pub struct InputQueue<const N: usize = INPUT_QUEUE_SIZE> {
    /// Ring storage.
    slots: UnsafeCell<[u8; N]>,

    /// Next slot to read (owned by the consumer).
    head: AtomicU32,

    /// Next slot to write (owned by the producer).
    tail: AtomicU32,

    /// Bytes rejected because the ring was full.
    dropped: AtomicU32,
}

// SAFETY: Producer only writes slots in [tail, head + N), consumer only
// reads slots in [head, tail); ownership moves through the indices.
unsafe impl<const N: usize> Sync for InputQueue<N> {}
unsafe impl<const N: usize> Send for InputQueue<N> {}

impl<const N: usize> InputQueue<N> {
    const MASK: usize = N - 1;

    /// Create an empty queue.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Queue size must be power of 2");
        assert!(N <= (1 << 31), "Queue size must fit the index space");

        Self {
            slots: UnsafeCell::new([0; N]),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue one byte (producer only).
    ///
    /// Returns `false` and counts the byte as dropped if the queue is full.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail.wrapping_sub(head) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: slot `tail` is outside [head, tail), the consumer does not
        // read it until the store below publishes it
        unsafe {
            self.slots
                .get()
                .cast::<u8>()
                .add(tail as usize & Self::MASK)
                .write(byte);
        }

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Dequeue the oldest byte (consumer only).
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: slot `head` was published by the producer's Release store
        let byte = unsafe {
            self.slots
                .get()
                .cast::<u8>()
                .add(head as usize & Self::MASK)
                .read()
        };

        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Bytes currently buffered.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        tail.wrapping_sub(head) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes rejected so far.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and clear the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for InputQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
