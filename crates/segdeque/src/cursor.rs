//! Random-access positions into a deque.
//!
//! A [`Cursor`] names an element position as an index slot plus an
//! offset inside that slot's buffer. It holds no borrow: dereferencing
//! goes through the deque, which checks the cursor's generation stamp
//! first. All arithmetic is O(1) regardless of distance, and never
//! panics: a cursor may wander before the first slot or past the last,
//! and the deque rejects it when it is used.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use segdeque_core::Generation;

/// Position descriptor: `(slot, offset)` plus the buffer length needed
/// to step across buffer boundaries and the generation it was made in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    slot: isize,
    offset: usize,
    buffer_len: usize,
    generation: Generation,
}

impl Cursor {
    pub(crate) fn new(slot: usize, offset: usize, buffer_len: usize, generation: Generation) -> Self {
        debug_assert!(offset < buffer_len, "cursor offset outside its buffer");
        Self {
            // Index arrays never exceed isize::MAX bytes, so neither do slots.
            slot: slot as isize,
            offset,
            buffer_len,
            generation,
        }
    }

    /// Index slot of the buffer this cursor points into. Negative once
    /// the cursor has been moved before slot 0.
    pub fn slot(&self) -> isize {
        self.slot
    }

    /// Offset inside that buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Buffer length (`K`) of the deque this cursor came from.
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Generation stamp of the deque state this cursor belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Step forward one element, crossing into the next buffer at the
    /// end of this one.
    pub fn inc(&mut self) {
        self.offset += 1;
        if self.offset == self.buffer_len {
            self.slot = self.slot.saturating_add(1);
            self.offset = 0;
        }
    }

    /// Step back one element, crossing into the previous buffer at the
    /// start of this one.
    pub fn dec(&mut self) {
        if self.offset == 0 {
            self.slot = self.slot.saturating_sub(1);
            self.offset = self.buffer_len;
        }
        self.offset -= 1;
    }

    /// Move by `n` elements (negative moves backwards).
    #[must_use]
    pub fn offset_by(mut self, n: isize) -> Self {
        self += n;
        self
    }

    /// Signed element distance `self - origin`.
    pub fn distance_from(&self, origin: &Cursor) -> isize {
        let slots = self.slot.saturating_sub(origin.slot);
        slots
            .saturating_mul(self.buffer_len as isize)
            .saturating_add(self.offset as isize - origin.offset as isize)
    }
}

impl AddAssign<isize> for Cursor {
    fn add_assign(&mut self, n: isize) {
        let k = self.buffer_len as isize;
        let offset = n.saturating_add(self.offset as isize);
        if (0..k).contains(&offset) {
            self.offset = offset as usize;
        } else {
            // Euclidean division, so negative offsets land in earlier buffers.
            self.slot = self.slot.saturating_add(offset.div_euclid(k));
            self.offset = offset.rem_euclid(k) as usize;
        }
    }
}

impl SubAssign<isize> for Cursor {
    fn sub_assign(&mut self, n: isize) {
        *self += n.saturating_neg();
    }
}

impl Add<isize> for Cursor {
    type Output = Cursor;

    fn add(self, n: isize) -> Cursor {
        self.offset_by(n)
    }
}

impl Sub<isize> for Cursor {
    type Output = Cursor;

    fn sub(self, n: isize) -> Cursor {
        self.offset_by(n.saturating_neg())
    }
}

impl Sub<Cursor> for Cursor {
    type Output = isize;

    fn sub(self, origin: Cursor) -> isize {
        self.distance_from(&origin)
    }
}

/// Cursors compare by position. Cursors from different deque states are
/// unordered.
impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.generation != other.generation || self.buffer_len != other.buffer_len {
            return None;
        }
        Some(
            self.slot
                .cmp(&other.slot)
                .then(self.offset.cmp(&other.offset)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(slot: usize, offset: usize) -> Cursor {
        Cursor::new(slot, offset, 4, GEN.with(|g| *g))
    }

    thread_local! {
        static GEN: Generation = Generation::next();
    }

    #[test]
    fn inc_crosses_into_next_buffer() {
        let mut c = at(2, 3);
        c.inc();
        assert_eq!((c.slot(), c.offset()), (3, 0));
    }

    #[test]
    fn dec_crosses_into_previous_buffer() {
        let mut c = at(2, 0);
        c.dec();
        assert_eq!((c.slot(), c.offset()), (1, 3));
    }

    #[test]
    fn add_within_buffer_keeps_slot() {
        let c = at(2, 1) + 2;
        assert_eq!((c.slot(), c.offset()), (2, 3));
    }

    #[test]
    fn add_jumps_whole_buffers() {
        let c = at(2, 1) + 11;
        assert_eq!((c.slot(), c.offset()), (5, 0));
    }

    #[test]
    fn negative_offsets_floor_toward_earlier_buffers() {
        let c = at(5, 0) - 1;
        assert_eq!((c.slot(), c.offset()), (4, 3));
        let c = at(5, 0) - 4;
        assert_eq!((c.slot(), c.offset()), (4, 0));
        let c = at(5, 2) - 7;
        assert_eq!((c.slot(), c.offset()), (3, 3));
    }

    #[test]
    fn distance_counts_elements() {
        assert_eq!(at(5, 0) - at(3, 2), 6);
        assert_eq!(at(3, 2) - at(5, 0), -6);
        assert_eq!(at(3, 2) - at(3, 2), 0);
    }

    #[test]
    fn ordering_by_slot_then_offset() {
        assert!(at(2, 3) < at(3, 0));
        assert!(at(3, 1) > at(3, 0));
        let other = Cursor::new(3, 0, 4, Generation::next());
        assert_eq!(at(3, 0).partial_cmp(&other), None);
    }

    #[test]
    fn stepping_before_slot_zero_goes_negative() {
        let mut c = at(0, 0);
        c.dec();
        assert_eq!((c.slot(), c.offset()), (-1, 3));
        assert_eq!(c - at(0, 0), -1);
        assert!(c < at(0, 0));
        let c = at(0, 1) - 10;
        assert_eq!((c.slot(), c.offset()), (-3, 3));
        assert_eq!(c + 9, at(0, 0));
    }

    #[test]
    fn huge_moves_saturate() {
        let c = at(0, 0) + isize::MIN;
        assert!(c < at(0, 0));
        let c = at(3, 2) + isize::MAX;
        assert!(c > at(3, 2));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn add_matches_repeated_inc(
                k in 1usize..9,
                slot in 0usize..4,
                offset_seed in 0usize..9,
                n in 0usize..200,
            ) {
                let start = Cursor::new(slot, offset_seed % k, k, Generation::next());
                let mut stepped = start;
                for _ in 0..n {
                    stepped.inc();
                }
                prop_assert_eq!(start + n as isize, stepped);
            }

            #[test]
            fn sub_matches_repeated_dec(
                k in 1usize..9,
                offset_seed in 0usize..9,
                n in 0usize..200,
            ) {
                let start = Cursor::new(300, offset_seed % k, k, Generation::next());
                let mut stepped = start;
                for _ in 0..n {
                    stepped.dec();
                }
                prop_assert_eq!(start - n as isize, stepped);
            }

            #[test]
            fn add_distance_round_trips(
                k in 1usize..9,
                a_slot in 100usize..200,
                b_slot in 100usize..200,
                a_seed in 0usize..9,
                b_seed in 0usize..9,
            ) {
                let generation = Generation::next();
                let a = Cursor::new(a_slot, a_seed % k, k, generation);
                let b = Cursor::new(b_slot, b_seed % k, k, generation);
                prop_assert_eq!(a + (b - a), b);
            }
        }
    }
}
