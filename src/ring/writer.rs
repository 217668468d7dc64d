//! Writer handle for the broadcast ring
//!
//! A writer publishes values into the ring in claim order with respect to
//! other writers, under backpressure from the slowest reader. Writers are
//! serialized only by the atomic fetch-add on the shared claim counter;
//! after claiming, each writer completes its store and publication
//! independently, possibly out of order with other writers.

use std::hint;
use std::sync::Arc;

use crate::ring::{Ring, INITIAL_SEQUENCE};

/// Error returned by [`Writer::try_write`] when the ring has no free slot
///
/// Carries the rejected value back to the caller; nothing is dropped.
pub struct RingFull<T>(pub T);

impl<T> std::fmt::Debug for RingFull<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RingFull(..)")
    }
}

impl<T> std::fmt::Display for RingFull<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ring is full: the slowest reader has not freed a slot")
    }
}

impl<T> std::error::Error for RingFull<T> {}

/// A producer handle for the ring
///
/// Created by [`Ring::create_writer`] during the setup phase. All claim
/// state lives in the ring's shared counter; the handle itself only caches
/// its last view of the slowest reader so the common publish path avoids
/// scanning the reader registry.
#[derive(Debug)]
pub struct Writer<T> {
    ring: Arc<Ring<T>>,
    /// Cached view of the minimum reader cursor. The true minimum only
    /// grows, so this can lag but never overshoot.
    cached_min_reader: i64,
}

impl<T> Writer<T>
where
    T: Send + Sync,
{
    pub(crate) fn new(ring: Arc<Ring<T>>) -> Self {
        Self {
            ring,
            cached_min_reader: INITIAL_SEQUENCE,
        }
    }

    /// Publish a value at the next claimed sequence
    ///
    /// Busy-spins while the destination slot still holds a value some
    /// reader has not observed. Never fails; if every reader stalls
    /// forever, so does this call.
    pub fn write(&mut self, value: T) {
        let sequence = self.claim_sequence();
        let index = self.ring.index_from_sequence(sequence);

        // SAFETY: the wrap check in claim_sequence guarantees every reader
        // has observed sequence - capacity, and a reader's release store of
        // its cursor happens after its last access to this slot. No other
        // writer holds this slot: sequences mapping to the same index are
        // a full revolution apart and serialized by the same wrap check.
        unsafe {
            *self.ring.slot(index) = value;
        }

        self.ring.publish(index, sequence);
    }

    /// Construct a value in place at the next claimed sequence
    ///
    /// The constructor runs after the claim, once the destination slot is
    /// safe to occupy. Semantically identical to `write` after
    /// construction.
    pub fn write_with<F>(&mut self, constructor: F)
    where
        F: FnOnce() -> T,
    {
        let sequence = self.claim_sequence();
        let index = self.ring.index_from_sequence(sequence);

        // SAFETY: as in write; the claimed sequence gives this writer sole
        // ownership of the slot until publication.
        unsafe {
            *self.ring.slot(index) = constructor();
        }

        self.ring.publish(index, sequence);
    }

    /// Try to publish a value without waiting
    ///
    /// Claims a sequence only when its slot is already free, so a rejected
    /// call leaves the claim counter untouched.
    ///
    /// # Returns
    /// The published sequence number, or `RingFull` handing the value back
    /// when the slowest reader has not yet freed a slot.
    ///
    /// # Errors
    /// Returns [`RingFull`] if the ring is full
    pub fn try_write(&mut self, value: T) -> Result<i64, RingFull<T>> {
        loop {
            let sequence = self.ring.next_sequence();
            let wrap_point = sequence - self.ring.capacity() as i64;

            if wrap_point > self.cached_min_reader {
                self.cached_min_reader = self.ring.min_reader_sequence();
                if wrap_point > self.cached_min_reader {
                    return Err(RingFull(value));
                }
            }

            // The minimum only grows, so the check above stays valid for
            // this exact sequence once the claim lands.
            if self.ring.try_claim_sequence(sequence) {
                let index = self.ring.index_from_sequence(sequence);
                // SAFETY: as in write; the wrap check passed for this
                // sequence before it was claimed.
                unsafe {
                    *self.ring.slot(index) = value;
                }
                self.ring.publish(index, sequence);
                return Ok(sequence);
            }
            // Another writer claimed this sequence; retry against the new
            // counter value.
        }
    }

    /// Claim the next sequence and wait until its slot may be occupied
    fn claim_sequence(&mut self) -> i64 {
        let sequence = self.ring.claim_sequence();
        self.wait_for_no_wrap(sequence);
        sequence
    }

    /// Spin until the slot for `sequence` has been released by every reader
    ///
    /// The wrap point `sequence - capacity` is the sequence the slowest
    /// reader must have observed before the slot may be reused.
    fn wait_for_no_wrap(&mut self, sequence: i64) {
        let wrap_point = sequence - self.ring.capacity() as i64;

        if wrap_point <= self.cached_min_reader {
            return;
        }

        while wrap_point > self.cached_min_reader {
            hint::spin_loop();
            self.cached_min_reader = self.ring.min_reader_sequence();
        }
    }
}
