//! Fixed-capacity element buffers.
//!
//! A [`Buffer`] is one chunk of `K` element slots obtained from the
//! allocator. It keeps no length: which slots are live is known only to
//! the deque that owns it.

use segdeque_core::{DequeError, SlotAllocator};

/// A contiguous run of `K` element slots.
///
/// Buffers are the fundamental storage unit of the deque. Slots start
/// empty and are filled and emptied one at a time by the owner through
/// [`construct`](Buffer::construct) and [`destroy`](Buffer::destroy).
pub struct Buffer<T> {
    slots: Box<[Option<T>]>,
}

impl<T> Buffer<T> {
    /// Obtain a buffer of `len` empty slots from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the allocator refuses.
    pub fn allocate<A: SlotAllocator>(len: usize, alloc: &mut A) -> Result<Self, DequeError> {
        Ok(Self {
            slots: alloc.allocate(len)?,
        })
    }

    /// Hand the storage back to `alloc`. Live elements are dropped.
    pub fn release<A: SlotAllocator>(self, alloc: &mut A) {
        alloc.deallocate(self.slots);
    }

    /// Number of slots (`K`).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Fill the empty slot at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= capacity()`.
    pub fn construct<A: SlotAllocator>(&mut self, offset: usize, value: T, alloc: &mut A) {
        alloc.construct(&mut self.slots[offset], value);
    }

    /// Move the element out of the slot at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= capacity()`.
    pub fn destroy<A: SlotAllocator>(&mut self, offset: usize, alloc: &mut A) -> Option<T> {
        alloc.destroy(&mut self.slots[offset])
    }

    /// The element at `offset`, if the slot is live.
    pub fn get(&self, offset: usize) -> Option<&T> {
        self.slots.get(offset)?.as_ref()
    }

    /// The element at `offset`, mutably, if the slot is live.
    pub fn get_mut(&mut self, offset: usize) -> Option<&mut T> {
        self.slots.get_mut(offset)?.as_mut()
    }

    /// Number of live slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether every slot is empty.
    pub fn is_vacant(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Raw slot access for element moves that are neither a construct
    /// nor a destroy.
    pub(crate) fn slot_mut(&mut self, offset: usize) -> &mut Option<T> {
        &mut self.slots[offset]
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<T>] {
        &mut self.slots
    }

    pub(crate) fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segdeque_core::{CountingAllocator, Global};

    #[test]
    fn fresh_buffer_is_vacant() {
        let buffer: Buffer<u32> = Buffer::allocate(4, &mut Global).unwrap();
        assert_eq!(buffer.capacity(), 4);
        assert!(buffer.is_vacant());
        assert_eq!(buffer.occupied(), 0);
    }

    #[test]
    fn construct_then_destroy() {
        let mut alloc = Global;
        let mut buffer = Buffer::allocate(4, &mut alloc).unwrap();
        buffer.construct(2, "two", &mut alloc);
        assert_eq!(buffer.get(2), Some(&"two"));
        assert_eq!(buffer.get(1), None);
        assert_eq!(buffer.occupied(), 1);
        assert_eq!(buffer.destroy(2, &mut alloc), Some("two"));
        assert!(buffer.is_vacant());
    }

    #[test]
    fn get_past_capacity_is_none() {
        let buffer: Buffer<u8> = Buffer::allocate(2, &mut Global).unwrap();
        assert_eq!(buffer.get(2), None);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut alloc = Global;
        let mut buffer = Buffer::allocate(2, &mut alloc).unwrap();
        buffer.construct(0, 10, &mut alloc);
        *buffer.get_mut(0).unwrap() += 5;
        assert_eq!(buffer.get(0), Some(&15));
    }

    #[test]
    fn release_returns_storage() {
        let mut alloc = CountingAllocator::new();
        let mut buffer = Buffer::allocate(8, &mut alloc).unwrap();
        buffer.construct(0, String::from("dropped on release"), &mut alloc);
        assert_eq!(alloc.ledger().live_blocks(), 1);
        buffer.release(&mut alloc);
        assert_eq!(alloc.ledger().live_blocks(), 0);
    }

    #[test]
    fn refused_allocation_surfaces() {
        let mut alloc = CountingAllocator::new();
        alloc.fail_after(0);
        let result = Buffer::<u64>::allocate(8, &mut alloc);
        assert!(matches!(result, Err(DequeError::AllocationFailure { .. })));
    }

    #[test]
    #[should_panic]
    fn construct_past_capacity_panics() {
        let mut alloc = Global;
        let mut buffer = Buffer::allocate(1, &mut alloc).unwrap();
        buffer.construct(1, 0u8, &mut alloc);
    }
}
