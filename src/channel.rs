//! Lock-free SPSC (Single Producer, Single Consumer) byte channel.
//!
//! Carries serial-receive bytes from the receive context into the periodic
//! transcription task.
//!
//! # Architecture
//!
//! ```text
//! RX context ──try_write──▶ ByteChannel ──try_read──▶ Transcription task
//!  (never waits)            (lock-free)                 (drains each tick)
//! ```
//!
//! # Rules
//!
//! - Only the producer writes `head`; only the consumer writes `tail`
//! - Neither side ever blocks
//! - Full ring drops the incoming byte (counted), existing bytes are untouched

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Default channel size: 256 slots, 255 usable.
pub const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Fixed-capacity byte ring for one producer and one consumer.
///
/// One slot is always left free so that `head == tail` means empty and
/// `next(head) == tail` means full.
///
/// # Safety
///
/// Uses `UnsafeCell` per slot but is safe to share because:
/// - Single producer, single consumer (enforced by design, not by type system)
/// - The producer only writes slots in `[head, tail)` (free space)
/// - The consumer only reads slots in `[tail, head)` (filled space)
///
/// # Memory Ordering
///
/// - Producer writes the slot, then stores `head` with `Release`
/// - Consumer loads `head` with `Acquire`, so it sees the slot write
/// - Same pairing on `tail` in the other direction, so a slot is never
///   overwritten while the consumer is still reading it
pub struct ByteChannel<const N: usize = DEFAULT_CHANNEL_SIZE> {
    slots: [UnsafeCell<u8>; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    dropped: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic index hand-off.
// Each slot is owned by exactly one side at any time.
unsafe impl<const N: usize> Sync for ByteChannel<N> {}
unsafe impl<const N: usize> Send for ByteChannel<N> {}

impl<const N: usize> ByteChannel<N> {
    const MASK: usize = N - 1;

    /// Create a new empty channel.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2 (or smaller than 2).
    pub const fn new() -> Self {
        const { assert!(N.is_power_of_two() && N >= 2, "Channel size must be power of 2") };

        Self {
            slots: [const { UnsafeCell::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue one byte. Producer side only.
    ///
    /// Returns `false` and drops the byte if the ring is full.
    ///
    /// # Timing
    ///
    /// O(1), never blocks, never allocates. Safe from an RX callback.
    #[inline]
    pub fn try_write(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & Self::MASK;

        if next == self.tail.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: slot `head` is free space; the consumer does not touch it
        // until it observes the Release store below.
        unsafe {
            *self.slots[head].get() = byte;
        }

        self.head.store(next, Ordering::Release);
        true
    }

    /// Take the oldest byte. Consumer side only.
    ///
    /// Returns `None` if the ring is empty.
    #[inline]
    pub fn try_read(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);

        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: slot `tail` is filled space published by the producer's
        // Release store on `head`; the producer will not reuse it until it
        // observes our store on `tail`.
        let byte = unsafe { *self.slots[tail].get() };

        self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
        Some(byte)
    }

    /// Number of queued bytes.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & Self::MASK
    }

    /// Check if there is nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Usable capacity (one slot is reserved).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Bytes dropped because the ring was full, since boot or last take.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and reset the drop counter (for periodic reporting).
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// `(head, tail)` snapshot, for diagnostics.
    #[inline]
    pub fn indices(&self) -> (usize, usize) {
        (
            self.head.load(Ordering::Acquire),
            self.tail.load(Ordering::Acquire),
        )
    }
}

impl<const N: usize> Default for ByteChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_basic_write_read() {
        let ch = ByteChannel::<8>::new();
        assert!(ch.is_empty());

        assert!(ch.try_write(b'.'));
        assert!(ch.try_write(b'-'));
        assert_eq!(ch.len(), 2);

        assert_eq!(ch.try_read(), Some(b'.'));
        assert_eq!(ch.try_read(), Some(b'-'));
        assert_eq!(ch.try_read(), None);
    }

    #[test]
    fn test_channel_reserves_one_slot() {
        let ch = ByteChannel::<4>::new();
        assert_eq!(ch.capacity(), 3);

        assert!(ch.try_write(1));
        assert!(ch.try_write(2));
        assert!(ch.try_write(3));
        assert!(!ch.try_write(4));

        let (head, tail) = ch.indices();
        assert_eq!((head + 1) & 3, tail);
    }

    #[test]
    fn test_channel_wraps() {
        let ch = ByteChannel::<4>::new();
        for round in 0..10u8 {
            assert!(ch.try_write(round));
            assert!(ch.try_write(round.wrapping_add(100)));
            assert_eq!(ch.try_read(), Some(round));
            assert_eq!(ch.try_read(), Some(round.wrapping_add(100)));
        }
        assert!(ch.is_empty());
    }

    #[test]
    fn test_take_dropped_resets() {
        let ch = ByteChannel::<2>::new();
        assert!(ch.try_write(1));
        assert!(!ch.try_write(2));
        assert!(!ch.try_write(3));
        assert_eq!(ch.take_dropped(), 2);
        assert_eq!(ch.dropped(), 0);
    }

    #[test]
    fn test_spsc_threads_preserve_order() {
        use std::sync::Arc;
        use std::thread;

        let ch = Arc::new(ByteChannel::<16>::new());
        let producer = {
            let ch = Arc::clone(&ch);
            thread::spawn(move || {
                for i in 0..2000u32 {
                    let byte = (i % 251) as u8;
                    while !ch.try_write(byte) {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut expected = 0u32;
        while expected < 2000 {
            if let Some(byte) = ch.try_read() {
                assert_eq!(byte, (expected % 251) as u8);
                expected += 1;
            } else {
                thread::yield_now();
            }
        }

        producer.join().unwrap();
        assert!(ch.is_empty());
    }
}
