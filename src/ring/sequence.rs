//! Sequence counter for the broadcast ring
//!
//! A `Sequence` tracks progress through the ring and coordinates writers and
//! readers. The shared claim counter and every reader's observed-sequence
//! cursor are `Sequence` values. The atomic sits on its own cache line so
//! that a busy writer hammering the claim counter does not ping-pong the
//! line holding a reader's cursor.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::ring::INITIAL_SEQUENCE;

/// A cache-line padded atomic sequence number
pub struct Sequence {
    value: CachePadded<AtomicI64>,
}

impl Sequence {
    /// Create a new sequence with the given initial value
    pub fn new(initial_value: i64) -> Self {
        Self {
            value: CachePadded::new(AtomicI64::new(initial_value)),
        }
    }

    /// Get the current sequence value with acquire ordering
    ///
    /// The acquire pairs with the owner's release store: a writer that
    /// observes a reader's cursor at `n` also observes that the slot holding
    /// sequence `n` has been vacated.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Get the current sequence value with relaxed ordering
    ///
    /// Sufficient when the caller is the sole thread that stores this
    /// sequence, such as a reader inspecting its own cursor.
    #[inline]
    pub fn get_relaxed(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Set the sequence value with release ordering
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// Atomically increment and return the pre-increment value
    ///
    /// Relaxed ordering: the only cross-thread guarantee a claim needs is
    /// uniqueness of the returned value. Visibility of the payload is
    /// carried by the slot stamp, not by this counter.
    #[inline]
    pub fn fetch_increment(&self) -> i64 {
        self.value.fetch_add(1, Ordering::Relaxed)
    }

    /// Compare and swap the sequence value
    ///
    /// # Returns
    /// True if the value was exchanged
    #[inline]
    pub fn compare_and_set(&self, expected: i64, new: i64) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Get the minimum sequence value from a group of sequences
    ///
    /// Uses acquire loads. Returns `i64::MAX` when the group is empty, so a
    /// caller gating on the minimum never blocks on nobody.
    pub fn minimum(sequences: &[Arc<Sequence>]) -> i64 {
        sequences
            .iter()
            .map(|seq| seq.get())
            .min()
            .unwrap_or(i64::MAX)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(INITIAL_SEQUENCE)
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence").field("value", &self.get()).finish()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}
