//! Broadcast ring queue implementation
//!
//! This module provides the slot sequencing and publication protocol for the
//! queue: the shared claim counter, the per-slot sequence stamps, and the
//! writer and reader handles that cooperate through them.

pub mod reader;
#[allow(clippy::module_inception)]
pub mod ring;
pub mod sequence;
pub mod writer;


pub use reader::{Reader, ReaderIter};
pub use ring::Ring;
pub use sequence::Sequence;
pub use writer::{RingFull, Writer};

/// The initial value of every sequence counter and slot stamp.
///
/// A stamp of `INITIAL_SEQUENCE` means the slot has never been published; a
/// reader cursor of `INITIAL_SEQUENCE` means the reader has observed nothing
/// yet.
pub const INITIAL_SEQUENCE: i64 = -1;

/// Errors that can occur while setting up the queue
///
/// The hot path is infallible by contract: `write` and `read` never return
/// an error. Everything that can go wrong happens during setup.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    #[error("Capacity must be a non-zero power of 2, got: {0}")]
    InvalidCapacity(usize),

    #[error("Readers and writers must be registered before the first write")]
    RegistrationAfterStart,
}

pub type Result<T> = std::result::Result<T, RingError>;

/// Utility function to check if a number is a power of 2
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}
