//! Reader handle for the broadcast ring
//!
//! A reader observes every published sequence in order, at its own rate.
//! Each reader owns an observed-sequence cursor that only it advances;
//! writers consult the minimum of all cursors as backpressure. Readers
//! never coordinate with each other: two readers at different positions
//! load the same slots at different times.

use std::hint;
use std::sync::Arc;

use crate::ring::{Ring, Sequence};

/// A consumer handle for the ring
///
/// Created by [`Ring::create_reader`] during the setup phase. The payload
/// type must be `Clone`: a broadcast slot cannot be moved out while other
/// readers still await it, so every observation clones.
#[derive(Debug)]
pub struct Reader<T> {
    ring: Arc<Ring<T>>,
    /// Highest sequence this reader has fully consumed. Stored with
    /// release ordering so a writer that sees the new value also sees
    /// that the slot is free.
    cursor: Arc<Sequence>,
}

impl<T> Reader<T>
where
    T: Send + Sync,
{
    pub(crate) fn new(ring: Arc<Ring<T>>, cursor: Arc<Sequence>) -> Self {
        Self { ring, cursor }
    }

    /// Read the next value in publication order
    ///
    /// Busy-spins until the awaited sequence is published. Never fails; if
    /// no writer ever publishes it, this call spins forever.
    pub fn read(&mut self) -> T
    where
        T: Clone,
    {
        let sequence = self.next_read_sequence();
        let index = self.ring.index_from_sequence(sequence);

        self.wait_for_stamp(index, sequence);

        // SAFETY: the stamp equals the awaited sequence, and the writer's
        // release store on the stamp makes the payload store visible to
        // this acquire. No writer can reclaim the slot before this
        // reader's cursor passes sequence, which happens below.
        let value = unsafe { (*self.ring.slot(index)).clone() };

        self.advance(sequence);
        value
    }

    /// Read the next value in publication order into a caller-provided
    /// location
    ///
    /// Uses `clone_from`, so allocations owned by `output` can be reused.
    pub fn read_into(&mut self, output: &mut T)
    where
        T: Clone,
    {
        let sequence = self.next_read_sequence();
        let index = self.ring.index_from_sequence(sequence);

        self.wait_for_stamp(index, sequence);

        // SAFETY: as in read.
        unsafe {
            output.clone_from(&*self.ring.slot(index));
        }

        self.advance(sequence);
    }

    /// Try to read the next value without waiting
    ///
    /// # Returns
    /// `Some(value)` if the awaited sequence is already published, `None`
    /// otherwise
    pub fn try_read(&mut self) -> Option<T>
    where
        T: Clone,
    {
        let sequence = self.next_read_sequence();
        let index = self.ring.index_from_sequence(sequence);

        if self.ring.stamp_at(index) != sequence {
            return None;
        }

        // SAFETY: as in read.
        let value = unsafe { (*self.ring.slot(index)).clone() };

        self.advance(sequence);
        Some(value)
    }

    /// Try to read the next value into a caller-provided location
    ///
    /// # Returns
    /// True if a value was read
    pub fn try_read_into(&mut self, output: &mut T) -> bool
    where
        T: Clone,
    {
        let sequence = self.next_read_sequence();
        let index = self.ring.index_from_sequence(sequence);

        if self.ring.stamp_at(index) != sequence {
            return false;
        }

        // SAFETY: as in read.
        unsafe {
            output.clone_from(&*self.ring.slot(index));
        }

        self.advance(sequence);
        true
    }

    /// The highest sequence this reader has observed
    ///
    /// [`crate::ring::INITIAL_SEQUENCE`] before the first read.
    pub fn sequence(&self) -> i64 {
        self.cursor.get_relaxed()
    }

    /// A blocking iterator over the stream in publication order
    ///
    /// The iterator never ends: `next` always waits for the following
    /// sequence to be published. Bound it with [`Iterator::take`].
    pub fn iter(&mut self) -> ReaderIter<'_, T> {
        ReaderIter { reader: self }
    }

    /// The sequence this reader wants next
    ///
    /// A relaxed load is sufficient: this reader is the sole writer of its
    /// own cursor.
    #[inline]
    fn next_read_sequence(&self) -> i64 {
        self.cursor.get_relaxed() + 1
    }

    /// Spin until slot `index` carries exactly `sequence`
    ///
    /// Equality, not ≥: a larger stamp would mean the slot wrapped past
    /// this reader, which the writers' wrap check rules out for a live
    /// reader, and a smaller one means the sequence is not published yet.
    #[inline]
    fn wait_for_stamp(&self, index: usize, sequence: i64) {
        while self.ring.stamp_at(index) != sequence {
            hint::spin_loop();
        }
    }

    /// Release the slot to writers by advancing the cursor
    #[inline]
    fn advance(&self, sequence: i64) {
        self.cursor.set(sequence);
    }
}

/// Blocking iterator returned by [`Reader::iter`]
pub struct ReaderIter<'a, T> {
    reader: &'a mut Reader<T>,
}

impl<T> Iterator for ReaderIter<'_, T>
where
    T: Clone + Send + Sync,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.reader.read())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_in_publication_order() {
        let ring = Arc::new(Ring::<i64>::new(16).unwrap());
        let mut reader = ring.create_reader().unwrap();
        let mut writer = ring.create_writer().unwrap();

        for value in [3, 1, 4, 1, 5] {
            writer.write(value);
        }
        for expected in [3, 1, 4, 1, 5] {
            assert_eq!(reader.read(), expected);
        }
        assert_eq!(reader.sequence(), 4);
    }

    #[test]
    fn test_read_into_overwrites_caller_buffer() {
        let ring = Arc::new(Ring::<(i32, String, f64)>::new(16).unwrap());
        let mut reader = ring.create_reader().unwrap();
        let mut writer = ring.create_writer().unwrap();

        writer.write((10, String::from("hello"), 10.4));

        let mut output = (11, String::from("goodbye"), 96.8);
        reader.read_into(&mut output);
        assert_eq!(output.0, 10);
        assert_eq!(output.1, "hello");
        assert!((output.2 - 10.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_try_read_empty_then_published() {
        let ring = Arc::new(Ring::<i64>::new(8).unwrap());
        let mut reader = ring.create_reader().unwrap();
        let mut writer = ring.create_writer().unwrap();

        assert_eq!(reader.try_read(), None);

        writer.write(5);
        assert_eq!(reader.try_read(), Some(5));
        assert_eq!(reader.try_read(), None);
    }

    #[test]
    fn test_try_read_into() {
        let ring = Arc::new(Ring::<i64>::new(8).unwrap());
        let mut reader = ring.create_reader().unwrap();
        let mut writer = ring.create_writer().unwrap();

        let mut output = 0;
        assert!(!reader.try_read_into(&mut output));

        writer.write(9);
        assert!(reader.try_read_into(&mut output));
        assert_eq!(output, 9);
    }

    #[test]
    fn test_each_reader_sees_the_full_stream() {
        let ring = Arc::new(Ring::<i64>::new(8).unwrap());
        let mut first = ring.create_reader().unwrap();
        let mut second = ring.create_reader().unwrap();
        let mut writer = ring.create_writer().unwrap();

        for value in 0..4 {
            writer.write(value);
        }

        assert_eq!(first.iter().take(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(second.iter().take(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_capacity_one_alternates() {
        let ring = Arc::new(Ring::<i64>::new(1).unwrap());
        let mut reader = ring.create_reader().unwrap();
        let mut writer = ring.create_writer().unwrap();

        for value in 0..8 {
            writer.write(value);
            assert_eq!(reader.read(), value);
        }
    }
}
