//! Ring implementation
//!
//! This module provides the shared state of the queue: the pre-allocated
//! slot array, the per-slot sequence stamps, the claim counter, and the
//! registry of live readers. Writers and readers never talk to each other
//! directly; every coordination edge runs through the atomics owned here.

use parking_lot::RwLock;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::ring::{
    is_power_of_two, Reader, Result, RingError, Sequence, Writer, INITIAL_SEQUENCE,
};

/// The shared core of the broadcast queue
///
/// A ring of fixed, power-of-two capacity. Any number of writers publish
/// into it and any number of readers independently observe every published
/// value in sequence order. Sequence `s` always maps to slot
/// `s & (capacity - 1)`.
///
/// The ring is shared behind an [`Arc`]; [`Writer`] and [`Reader`] handles
/// hold a back-reference and keep it alive.
///
/// # Type Parameters
/// * `T` - The payload type stored in the slots
pub struct Ring<T> {
    /// The slot array, using `UnsafeCell` for interior mutability.
    /// Mutation is coordinated entirely by the stamp protocol.
    slots: Box<[UnsafeCell<T>]>,
    /// Per-slot publication stamps. `stamps[i] = s` means sequence `s` is
    /// the most recent one published into slot `i`; `INITIAL_SEQUENCE`
    /// means the slot has never been published. Deliberately unpadded:
    /// neighboring stamps are written by different writers at most once
    /// per ring revolution.
    stamps: Box<[AtomicI64]>,
    /// The next sequence number to be claimed by any writer.
    next_seq: Sequence,
    /// Mask for fast modulo operations (capacity - 1).
    /// Using i64 to match the sequence type and avoid casting.
    index_mask: i64,
    /// Observed-sequence cursors of every registered reader. The write lock
    /// doubles as the setup lock: it is taken only during registration.
    /// Writers take an uncontended read lock when refreshing their cached
    /// minimum; the common publish path touches no lock.
    reader_cursors: RwLock<Vec<Arc<Sequence>>>,
    /// Number of registered writers, for introspection only.
    writer_count: AtomicUsize,
}

// SAFETY: Ring<T> is Send and Sync when T is Send + Sync because all slot
// access is coordinated by the stamp protocol: a slot is written only after
// every reader has released the previous occupant (wrap check), and read
// only after the writer's release-store of the stamp (publication).
unsafe impl<T: Send + Sync> Send for Ring<T> {}
unsafe impl<T: Send + Sync> Sync for Ring<T> {}

impl<T> Ring<T>
where
    T: Send + Sync,
{
    /// Create a new ring with the specified capacity
    ///
    /// Slots are pre-filled with `T::default()` and every stamp starts at
    /// [`INITIAL_SEQUENCE`].
    ///
    /// # Arguments
    /// * `capacity` - The number of slots (must be a non-zero power of 2)
    ///
    /// # Errors
    /// Returns `RingError::InvalidCapacity` if `capacity` is zero or not a
    /// power of 2
    pub fn new(capacity: usize) -> Result<Self>
    where
        T: Default,
    {
        if !is_power_of_two(capacity) {
            return Err(RingError::InvalidCapacity(capacity));
        }

        let slots: Box<[UnsafeCell<T>]> =
            (0..capacity).map(|_| UnsafeCell::new(T::default())).collect();
        let stamps: Box<[AtomicI64]> = (0..capacity)
            .map(|_| AtomicI64::new(INITIAL_SEQUENCE))
            .collect();

        debug!(capacity, "ring created");

        Ok(Self {
            slots,
            stamps,
            next_seq: Sequence::new(0),
            index_mask: (capacity - 1) as i64,
            reader_cursors: RwLock::new(Vec::new()),
            writer_count: AtomicUsize::new(0),
        })
    }

    /// Register a new writer
    ///
    /// Registration is part of the setup phase and takes the setup lock.
    /// Writers claim sequences from the shared counter; they carry no
    /// per-handle sequence state beyond a cached view of the slowest
    /// reader.
    ///
    /// # Errors
    /// Returns `RingError::RegistrationAfterStart` if any sequence has
    /// already been claimed
    pub fn create_writer(self: &Arc<Self>) -> Result<Writer<T>> {
        let _setup = self.reader_cursors.write();
        if self.hot_phase_started() {
            return Err(RingError::RegistrationAfterStart);
        }

        let id = self.writer_count.fetch_add(1, Ordering::Relaxed);
        debug!(writer = id, "writer registered");
        Ok(Writer::new(Arc::clone(self)))
    }

    /// Register a new reader
    ///
    /// Registration is part of the setup phase and takes the setup lock.
    /// Readers must be registered before any writer claims its first
    /// sequence; a reader starts at [`INITIAL_SEQUENCE`] and immediately
    /// constrains writers to the first `capacity` sequences until it makes
    /// progress. A reader that is never read from keeps constraining them.
    ///
    /// # Errors
    /// Returns `RingError::RegistrationAfterStart` if any sequence has
    /// already been claimed
    pub fn create_reader(self: &Arc<Self>) -> Result<Reader<T>> {
        let mut cursors = self.reader_cursors.write();
        if self.hot_phase_started() {
            return Err(RingError::RegistrationAfterStart);
        }

        let cursor = Arc::new(Sequence::new(INITIAL_SEQUENCE));
        cursors.push(Arc::clone(&cursor));
        debug!(reader = cursors.len() - 1, "reader registered");
        Ok(Reader::new(Arc::clone(self), cursor))
    }

    /// Get the capacity of the ring
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Get the next sequence number that will be claimed by a writer
    ///
    /// A claimed sequence is not necessarily published yet; this is an
    /// introspection aid, not a synchronization point.
    pub fn next_sequence(&self) -> i64 {
        self.next_seq.get_relaxed()
    }

    /// Get the approximate number of slots a writer could claim right now
    /// without waiting on a reader
    ///
    /// Computed from a snapshot of the claim counter and the slowest
    /// reader; clamped to `[0, capacity]`.
    pub fn remaining_capacity(&self) -> i64 {
        let capacity = self.slots.len() as i64;
        // Saturating: an empty registry reports i64::MAX as the minimum.
        let in_flight = (self.next_sequence() - 1)
            .saturating_sub(self.min_reader_sequence())
            .clamp(0, capacity);
        capacity - in_flight
    }

    /// Get the number of registered readers
    pub fn reader_count(&self) -> usize {
        self.reader_cursors.read().len()
    }

    /// Get the number of registered writers
    pub fn writer_count(&self) -> usize {
        self.writer_count.load(Ordering::Relaxed)
    }

    /// The minimum observed sequence across all registered readers
    ///
    /// Acquire-loads every cursor. Returns `i64::MAX` when no readers are
    /// registered, so writers never block on an empty registry.
    pub(crate) fn min_reader_sequence(&self) -> i64 {
        Sequence::minimum(&self.reader_cursors.read())
    }

    /// Atomically claim the next sequence number
    ///
    /// Relaxed ordering: uniqueness is the only guarantee a claim needs.
    pub(crate) fn claim_sequence(&self) -> i64 {
        self.next_seq.fetch_increment()
    }

    /// Try to claim `expected` as the next sequence number
    ///
    /// Used by the non-blocking write path, which must verify the wrap
    /// check before committing to a claim.
    pub(crate) fn try_claim_sequence(&self, expected: i64) -> bool {
        self.next_seq.compare_and_set(expected, expected + 1)
    }

    /// Map a sequence to its slot index
    #[inline]
    pub(crate) fn index_from_sequence(&self, sequence: i64) -> usize {
        (sequence & self.index_mask) as usize
    }

    /// Acquire-load the stamp of a slot
    #[inline]
    pub(crate) fn stamp_at(&self, index: usize) -> i64 {
        self.stamps[index].load(Ordering::Acquire)
    }

    /// Publish a sequence into a slot's stamp
    ///
    /// The release store establishes the happens-before edge that makes
    /// the payload store visible to any reader that acquire-loads the
    /// stamp and sees `sequence`.
    #[inline]
    pub(crate) fn publish(&self, index: usize, sequence: i64) {
        self.stamps[index].store(sequence, Ordering::Release);
    }

    /// Get a raw pointer to the payload slot at the specified index
    ///
    /// # Safety
    /// The caller must hold the protocol's permission for the access: a
    /// writer may store through the pointer only after its wrap check has
    /// confirmed every reader released the previous occupant, and a reader
    /// may load through it only after observing the slot's stamp equal to
    /// the sequence it awaits.
    #[inline]
    pub(crate) unsafe fn slot(&self, index: usize) -> *mut T {
        // SAFETY: index is within bounds - guaranteed by the index mask.
        self.slots.get_unchecked(index).get()
    }

    fn hot_phase_started(&self) -> bool {
        self.next_seq.get_relaxed() > 0
    }
}

impl<T> std::fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.slots.len())
            .field("next_seq", &self.next_seq)
            .field("readers", &self.reader_cursors.read().len())
            .field("writers", &self.writer_count.load(Ordering::Relaxed))
            .finish()
    }
}
