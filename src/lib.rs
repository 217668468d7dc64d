//! `ringcast` - Broadcast MPMC Ring Queue
//!
//! A bounded, lock-free, multi-producer / multi-consumer in-process message
//! queue built on the LMAX Disruptor publication protocol, following the
//! original design from <https://github.com/LMAX-Exchange/disruptor>
//!
//! A single ring of fixed, power-of-two capacity is shared by any number of
//! writers and any number of independent readers. Readers are broadcast-style:
//! every reader observes every published value in sequence order, at its own
//! pace. Writers never overwrite a slot until every live reader has observed
//! the value that previously occupied it.
//!
//! ## Features
//!
//! - **Lock-free hot path**: publication and observation use only atomic
//!   operations and acquire/release edges
//! - **Broadcast fan-out**: every reader independently receives the full
//!   stream, in sequence order, with no duplicates and no skips
//! - **Backpressure by construction**: the slowest reader gates all writers
//!   at the wrap point, so no value is lost
//! - **Mechanical sympathy**: hot counters are padded to their own cache
//!   lines to avoid false sharing
//!
//! ## Quick Start
//!
//! ```rust
//! use ringcast::{Result, Ring};
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     // Capacity must be a power of two. Register readers before the
//!     // first write so they see the stream from the beginning.
//!     let ring = Arc::new(Ring::<i64>::new(8)?);
//!     let mut reader = ring.create_reader()?;
//!     let mut writer = ring.create_writer()?;
//!
//!     writer.write(1);
//!     writer.write(2);
//!
//!     assert_eq!(reader.read(), 1);
//!     assert_eq!(reader.read(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The queue is composed of three cooperating parts:
//!
//! - [`Ring`]: owns the slot array, the per-slot sequence stamps, the shared
//!   claim counter, and the registry of live readers
//! - [`Writer`]: claims sequence numbers, waits out the wrap check against
//!   the slowest reader, stores the value, and publishes via the slot stamp
//! - [`Reader`]: spins on the stamp of the next sequence it wants, loads the
//!   value, and advances its observed sequence (visible to writers as
//!   backpressure)
//!
//! Writers are serialized only by an atomic fetch-add on the claim counter;
//! payload stores and stamp publications may complete in any order across
//! writers. Each reader's equality check on the awaited stamp restores
//! sequence order on the way out.

pub mod ring;

// Re-export the main types for convenience
pub use ring::{
    is_power_of_two, Reader, ReaderIter, Result, Ring, RingError, RingFull, Sequence, Writer,
    INITIAL_SEQUENCE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the version of the `ringcast` library
#[must_use]
pub fn version() -> &'static str {
    VERSION
}
