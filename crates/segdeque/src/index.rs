//! The buffer index: a resizable array of buffer handles.
//!
//! The live buffers occupy one contiguous window `[first, first + used)`
//! of the array. Slots outside the window are empty. Growth at either end
//! first consumes slack, then slides the window ([`SlackPlan::Recenter`]),
//! and only then reallocates the array ([`SlackPlan::Regrow`]).

use segdeque_core::{DequeError, SlotAllocator};

use crate::buffer::Buffer;
use crate::growth::{has_slack, plan_slack, Side, SlackPlan};

/// Counters describing how an index has reshaped itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Times the handle array was reallocated.
    pub regrows: u64,
    /// Times the live window slid inside the existing array.
    pub recenters: u64,
}

/// Ordered array of buffer handles with a contiguous live window.
pub struct BufferIndex<T> {
    slots: Box<[Option<Buffer<T>>]>,
    /// First slot of the live window.
    first: usize,
    /// Number of live buffers.
    used: usize,
    stats: IndexStats,
}

impl<T> BufferIndex<T> {
    /// Build a `capacity`-slot index holding one fresh buffer of
    /// `buffer_len` slots in the middle.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if either the array or
    /// the buffer cannot be allocated; nothing is leaked.
    pub fn new<A: SlotAllocator>(
        capacity: usize,
        buffer_len: usize,
        alloc: &mut A,
    ) -> Result<Self, DequeError> {
        let mut slots = alloc.allocate::<Buffer<T>>(capacity.max(1))?;
        let buffer = match Buffer::allocate(buffer_len, alloc) {
            Ok(buffer) => buffer,
            Err(err) => {
                alloc.deallocate(slots);
                return Err(err);
            }
        };
        let first = (slots.len() - 1) / 2;
        slots[first] = Some(buffer);
        Ok(Self {
            slots,
            first,
            used: 1,
            stats: IndexStats::default(),
        })
    }

    /// Total number of handle slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live buffers.
    pub fn used(&self) -> usize {
        self.used
    }

    /// First slot of the live window.
    pub fn first_slot(&self) -> usize {
        self.first
    }

    /// Last slot of the live window.
    pub fn last_slot(&self) -> usize {
        self.first + self.used.saturating_sub(1)
    }

    /// Reshape counters.
    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// The buffer in `slot`, if that slot is live.
    pub fn buffer(&self, slot: usize) -> Option<&Buffer<T>> {
        self.slots.get(slot)?.as_ref()
    }

    /// The buffer in `slot`, mutably, if that slot is live.
    pub fn buffer_mut(&mut self, slot: usize) -> Option<&mut Buffer<T>> {
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Handles of the live window, front to back.
    pub(crate) fn window_mut(&mut self) -> &mut [Option<Buffer<T>>] {
        let end = self.first + self.used;
        &mut self.slots[self.first..end]
    }

    /// Guarantee at least `n` unused slots before the live window.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if a regrow is needed and
    /// the new array cannot be allocated; the index is then unchanged.
    pub fn ensure_slack_front<A: SlotAllocator>(
        &mut self,
        n: usize,
        alloc: &mut A,
    ) -> Result<(), DequeError> {
        self.ensure_slack(n, Side::Front, alloc)
    }

    /// Guarantee at least `n` unused slots after the live window.
    ///
    /// # Errors
    ///
    /// Same as [`ensure_slack_front`](Self::ensure_slack_front).
    pub fn ensure_slack_back<A: SlotAllocator>(
        &mut self,
        n: usize,
        alloc: &mut A,
    ) -> Result<(), DequeError> {
        self.ensure_slack(n, Side::Back, alloc)
    }

    fn ensure_slack<A: SlotAllocator>(
        &mut self,
        n: usize,
        side: Side,
        alloc: &mut A,
    ) -> Result<(), DequeError> {
        if has_slack(self.capacity(), self.first, self.used, n, side) {
            return Ok(());
        }
        match plan_slack(self.capacity(), self.used, n, side) {
            SlackPlan::Recenter { first } => {
                log::debug!(
                    "index recenter: window {}..{} -> {first} (capacity {}, {side:?} +{n})",
                    self.first,
                    self.first + self.used,
                    self.capacity()
                );
                self.move_window(first);
                self.stats.recenters += 1;
            }
            SlackPlan::Regrow { capacity, first } => {
                log::debug!(
                    "index regrow: capacity {} -> {capacity} ({} live, {side:?} +{n})",
                    self.capacity(),
                    self.used
                );
                self.reallocate(capacity, first, alloc)?;
                self.stats.regrows += 1;
            }
        }
        Ok(())
    }

    /// Slide the live window so it starts at `new_first`. Handles move
    /// ascending when sliding left and descending when sliding right, so
    /// overlapping source and destination never clobber each other.
    fn move_window(&mut self, new_first: usize) {
        if new_first < self.first {
            for i in 0..self.used {
                self.slots[new_first + i] = self.slots[self.first + i].take();
            }
        } else if new_first > self.first {
            for i in (0..self.used).rev() {
                self.slots[new_first + i] = self.slots[self.first + i].take();
            }
        }
        self.first = new_first;
    }

    /// Move the live window into a new `capacity`-slot array at `new_first`.
    fn reallocate<A: SlotAllocator>(
        &mut self,
        capacity: usize,
        new_first: usize,
        alloc: &mut A,
    ) -> Result<(), DequeError> {
        if new_first.saturating_add(self.used) > capacity {
            return Err(DequeError::InvariantViolation {
                context: "index window does not fit the reallocated array",
            });
        }
        let mut slots = alloc.allocate::<Buffer<T>>(capacity)?;
        for i in 0..self.used {
            slots[new_first + i] = self.slots[self.first + i].take();
        }
        let old = std::mem::replace(&mut self.slots, slots);
        alloc.deallocate(old);
        self.first = new_first;
        Ok(())
    }

    /// Place `buffer` in the slot just before the live window.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::InvariantViolation`] if no front slack was
    /// reserved beforehand.
    pub fn install_front(&mut self, buffer: Buffer<T>) -> Result<(), DequeError> {
        let slot = self.first.checked_sub(1).ok_or(DequeError::InvariantViolation {
            context: "install_front without front slack",
        })?;
        self.slots[slot] = Some(buffer);
        self.first = slot;
        self.used += 1;
        Ok(())
    }

    /// Place `buffer` in the slot just after the live window.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::InvariantViolation`] if no back slack was
    /// reserved beforehand.
    pub fn install_back(&mut self, buffer: Buffer<T>) -> Result<(), DequeError> {
        let slot = self.first + self.used;
        match self.slots.get_mut(slot) {
            Some(handle) => {
                *handle = Some(buffer);
                self.used += 1;
                Ok(())
            }
            None => Err(DequeError::InvariantViolation {
                context: "install_back without back slack",
            }),
        }
    }

    /// Detach the first live buffer. The last remaining buffer is never
    /// detached.
    pub fn release_front(&mut self) -> Option<Buffer<T>> {
        if self.used <= 1 {
            return None;
        }
        let buffer = self.slots[self.first].take();
        self.first += 1;
        self.used -= 1;
        buffer
    }

    /// Detach the last live buffer. The last remaining buffer is never
    /// detached.
    pub fn release_back(&mut self) -> Option<Buffer<T>> {
        if self.used <= 1 {
            return None;
        }
        let last = self.last_slot();
        self.used -= 1;
        self.slots[last].take()
    }

    /// Slide the live window to the middle of the array.
    pub fn recenter(&mut self) {
        let middle = (self.capacity() - self.used) / 2;
        if middle != self.first {
            self.move_window(middle);
            self.stats.recenters += 1;
        }
    }

    /// Reallocate the array down to `capacity` slots, window centered.
    /// Returns `false` without touching anything when `capacity` would
    /// not be a reduction or cannot hold the live window.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the smaller array
    /// cannot be allocated; the index is then unchanged.
    pub fn shrink_to<A: SlotAllocator>(
        &mut self,
        capacity: usize,
        alloc: &mut A,
    ) -> Result<bool, DequeError> {
        if capacity >= self.capacity() || capacity < self.used {
            return Ok(false);
        }
        log::debug!(
            "index shrink: capacity {} -> {capacity} ({} live)",
            self.capacity(),
            self.used
        );
        self.reallocate(capacity, (capacity - self.used) / 2, alloc)?;
        self.stats.regrows += 1;
        Ok(true)
    }

    /// Return every live buffer and then the array itself to `alloc`,
    /// leaving an empty, capacity-zero index.
    pub fn release_all<A: SlotAllocator>(&mut self, alloc: &mut A) {
        for handle in self.window_mut() {
            if let Some(buffer) = handle.take() {
                buffer.release(alloc);
            }
        }
        let old = std::mem::take(&mut self.slots);
        alloc.deallocate(old);
        self.first = 0;
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segdeque_core::{CountingAllocator, Global};

    fn index_with(capacity: usize) -> BufferIndex<u32> {
        BufferIndex::new(capacity, 2, &mut Global).unwrap()
    }

    fn grow_back(index: &mut BufferIndex<u32>, alloc: &mut impl SlotAllocator) {
        index.ensure_slack_back(1, alloc).unwrap();
        let buffer = Buffer::allocate(2, alloc).unwrap();
        index.install_back(buffer).unwrap();
    }

    fn grow_front(index: &mut BufferIndex<u32>, alloc: &mut impl SlotAllocator) {
        index.ensure_slack_front(1, alloc).unwrap();
        let buffer = Buffer::allocate(2, alloc).unwrap();
        index.install_front(buffer).unwrap();
    }

    fn window_is_contiguous(index: &BufferIndex<u32>) -> bool {
        (0..index.capacity()).all(|slot| {
            let live = slot >= index.first_slot() && slot <= index.last_slot();
            index.buffer(slot).is_some() == live
        })
    }

    #[test]
    fn new_index_centers_one_buffer() {
        let index = index_with(8);
        assert_eq!(index.capacity(), 8);
        assert_eq!(index.used(), 1);
        assert_eq!(index.first_slot(), 3);
        assert_eq!(index.last_slot(), 3);
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn back_growth_consumes_slack_before_reshaping() {
        let mut index = index_with(8);
        let mut alloc = Global;
        for _ in 0..4 {
            grow_back(&mut index, &mut alloc);
        }
        // Slots 3..=7 are live and nothing has moved yet.
        assert_eq!(index.first_slot(), 3);
        assert_eq!(index.stats(), IndexStats::default());
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn back_growth_regrows_when_tight() {
        let mut index = index_with(8);
        let mut alloc = Global;
        for _ in 0..5 {
            grow_back(&mut index, &mut alloc);
        }
        assert_eq!(index.used(), 6);
        assert_eq!(index.stats().regrows, 1);
        assert_eq!(index.capacity(), 18);
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn exhausted_back_slack_reshapes() {
        let mut index = index_with(20);
        let mut alloc = Global;
        // first = 9; back has 10 free slots.
        for _ in 0..11 {
            grow_back(&mut index, &mut alloc);
        }
        assert_eq!(index.used(), 12);
        assert_eq!(index.stats().regrows, 1);
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn recenter_moves_window_left_without_loss() {
        let mut index = index_with(40);
        let mut alloc = Global;
        // Push the window against the back edge.
        while index.last_slot() + 1 < index.capacity() {
            grow_back(&mut index, &mut alloc);
        }
        while index.used() > 3 {
            index.release_front();
        }
        assert_eq!(index.first_slot(), 37);
        let used = index.used();
        grow_back(&mut index, &mut alloc);
        assert_eq!(index.stats().recenters, 1);
        assert_eq!(index.stats().regrows, 0);
        assert_eq!(index.first_slot(), 18);
        assert_eq!(index.used(), used + 1);
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn recenter_moves_window_right_without_loss() {
        let mut index = index_with(40);
        let mut alloc = Global;
        while index.first_slot() > 0 {
            grow_front(&mut index, &mut alloc);
        }
        while index.used() > 3 {
            index.release_back();
        }
        let used = index.used();
        grow_front(&mut index, &mut alloc);
        assert_eq!(index.stats().recenters, 1);
        assert_eq!(index.stats().regrows, 0);
        assert_eq!(index.first_slot(), 18);
        assert_eq!(index.used(), used + 1);
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn buffers_keep_their_order_across_reshapes() {
        let mut index = index_with(8);
        let mut alloc = Global;
        for tag in 0..30u32 {
            index.ensure_slack_back(1, &mut alloc).unwrap();
            let mut buffer = Buffer::allocate(2, &mut alloc).unwrap();
            buffer.construct(0, tag, &mut alloc);
            index.install_back(buffer).unwrap();
        }
        let tags: Vec<u32> = (index.first_slot() + 1..=index.last_slot())
            .map(|slot| *index.buffer(slot).unwrap().get(0).unwrap())
            .collect();
        assert_eq!(tags, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn release_keeps_last_buffer() {
        let mut index = index_with(8);
        let mut alloc = Global;
        grow_back(&mut index, &mut alloc);
        assert!(index.release_back().is_some());
        assert!(index.release_back().is_none());
        assert!(index.release_front().is_none());
        assert_eq!(index.used(), 1);
    }

    #[test]
    fn install_without_slack_is_reported() {
        let mut index = index_with(1);
        let buffer = Buffer::allocate(2, &mut Global).unwrap();
        let err = index.install_back(buffer).unwrap_err();
        assert!(matches!(err, DequeError::InvariantViolation { .. }));
    }

    #[test]
    fn failed_regrow_leaves_index_intact() {
        let mut alloc = CountingAllocator::new();
        let mut index: BufferIndex<u32> = BufferIndex::new(8, 2, &mut alloc).unwrap();
        while index.last_slot() + 1 < index.capacity() {
            grow_back(&mut index, &mut alloc);
        }
        let (capacity, first, used) = (index.capacity(), index.first_slot(), index.used());
        alloc.fail_after(0);
        let err = index.ensure_slack_back(1, &mut alloc).unwrap_err();
        assert!(matches!(err, DequeError::AllocationFailure { .. }));
        assert_eq!(
            (index.capacity(), index.first_slot(), index.used()),
            (capacity, first, used)
        );
        assert!(window_is_contiguous(&index));
    }

    #[test]
    fn shrink_to_recenters_in_smaller_array() {
        let mut index = index_with(64);
        let mut alloc = Global;
        assert!(index.shrink_to(8, &mut alloc).unwrap());
        assert_eq!(index.capacity(), 8);
        assert_eq!(index.first_slot(), 3);
        assert!(!index.shrink_to(8, &mut alloc).unwrap());
        assert!(!index.shrink_to(0, &mut alloc).unwrap());
    }

    #[test]
    fn release_all_returns_every_block() {
        let mut alloc = CountingAllocator::new();
        let mut index: BufferIndex<u32> = BufferIndex::new(8, 2, &mut alloc).unwrap();
        for _ in 0..10 {
            grow_front(&mut index, &mut alloc);
        }
        index.release_all(&mut alloc);
        assert_eq!(alloc.ledger().live_blocks(), 0);
        assert_eq!(index.capacity(), 0);
    }

    #[test]
    fn failed_first_buffer_frees_array() {
        let mut alloc = CountingAllocator::new();
        alloc.fail_after(1);
        let result = BufferIndex::<u32>::new(8, 2, &mut alloc);
        assert!(result.is_err());
        assert_eq!(alloc.ledger().live_blocks(), 0);
    }
}
