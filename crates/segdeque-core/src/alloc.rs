//! The allocator collaborator consumed by buffers and the index.
//!
//! A [`SlotAllocator`] hands out boxed slices of empty `Option<U>` slots
//! and takes them back. The element type is a method-level parameter, so
//! one allocator instance serves both the buffer layer (slots of `T`) and
//! the index layer (slots of buffer handles).
//!
//! Two implementations are provided:
//!
//! - [`Global`]: the process heap, with fallible reservation.
//! - [`CountingAllocator`]: wraps [`Global`] with shared counters, an
//!   optional byte cap, and one-shot failure injection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::DequeError;

/// Size in bytes of `n` slots of `U`.
pub fn slot_bytes<U>(n: usize) -> usize {
    std::mem::size_of::<Option<U>>().saturating_mul(n)
}

/// Source of slot storage for buffers and index arrays.
///
/// Slots are handed out empty. Filling and emptying an individual slot
/// goes through [`construct`](SlotAllocator::construct) and
/// [`destroy`](SlotAllocator::destroy), never implicitly.
pub trait SlotAllocator {
    /// Allocate `n` empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the memory source
    /// cannot satisfy the request.
    fn allocate<U>(&mut self, n: usize) -> Result<Box<[Option<U>]>, DequeError>;

    /// Return a block previously obtained from [`allocate`](SlotAllocator::allocate).
    ///
    /// Any values still inside the block are dropped.
    fn deallocate<U>(&mut self, block: Box<[Option<U>]>);

    /// Place `value` into an empty slot.
    fn construct<U>(&mut self, slot: &mut Option<U>, value: U) {
        debug_assert!(slot.is_none(), "construct into occupied slot");
        *slot = Some(value);
    }

    /// Move the value out of a slot, leaving it empty.
    fn destroy<U>(&mut self, slot: &mut Option<U>) -> Option<U> {
        slot.take()
    }
}

/// The process heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl SlotAllocator for Global {
    fn allocate<U>(&mut self, n: usize) -> Result<Box<[Option<U>]>, DequeError> {
        let mut slots: Vec<Option<U>> = Vec::new();
        if slots.try_reserve_exact(n).is_err() {
            let requested_bytes = slot_bytes::<U>(n);
            log::debug!("heap refused {requested_bytes} bytes for {n} slots");
            return Err(DequeError::AllocationFailure { requested_bytes });
        }
        slots.resize_with(n, || None);
        Ok(slots.into_boxed_slice())
    }

    fn deallocate<U>(&mut self, block: Box<[Option<U>]>) {
        drop(block);
    }
}

/// Shared counters behind a [`CountingAllocator`].
///
/// All clones of one allocator report into the same ledger, so a test can
/// keep a clone after handing the original to a deque and inspect it
/// once the deque is gone.
#[derive(Debug, Default)]
pub struct AllocLedger {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    constructs: AtomicUsize,
    destroys: AtomicUsize,
    /// 0 = disabled; otherwise the allocation that sees 1 fails.
    fail_countdown: AtomicUsize,
}

impl AllocLedger {
    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Deallocations so far.
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    /// Blocks currently outstanding.
    pub fn live_blocks(&self) -> usize {
        self.allocations().saturating_sub(self.deallocations())
    }

    /// Bytes currently outstanding.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Highest value `live_bytes` has reached.
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }

    /// Slots filled through `construct`.
    pub fn constructs(&self) -> usize {
        self.constructs.load(Ordering::Relaxed)
    }

    /// Slots emptied through `destroy`.
    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::Relaxed)
    }

    /// Consume one tick of the failure countdown. Returns `true` if this
    /// allocation must fail.
    fn should_fail(&self) -> bool {
        match self.fail_countdown.load(Ordering::Relaxed) {
            0 => false,
            1 => {
                self.fail_countdown.store(0, Ordering::Relaxed);
                true
            }
            n => {
                self.fail_countdown.store(n - 1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// Accounting allocator: [`Global`] plus shared counters, an optional
/// byte cap, and failure injection.
#[derive(Clone, Debug, Default)]
pub struct CountingAllocator {
    ledger: Arc<AllocLedger>,
    byte_limit: Option<usize>,
}

impl CountingAllocator {
    /// Create an uncapped counting allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator that refuses to hold more than `limit` bytes
    /// outstanding at once.
    pub fn with_byte_limit(limit: usize) -> Self {
        Self {
            ledger: Arc::default(),
            byte_limit: Some(limit),
        }
    }

    /// Let the next `n` allocations succeed, then fail exactly once.
    ///
    /// `fail_after(0)` fails the very next allocation.
    pub fn fail_after(&self, n: usize) {
        self.ledger
            .fail_countdown
            .store(n.saturating_add(1), Ordering::Relaxed);
    }

    /// The shared counters.
    pub fn ledger(&self) -> &AllocLedger {
        &self.ledger
    }
}

impl SlotAllocator for CountingAllocator {
    fn allocate<U>(&mut self, n: usize) -> Result<Box<[Option<U>]>, DequeError> {
        let requested_bytes = slot_bytes::<U>(n);
        if self.ledger.should_fail() {
            log::debug!("injected allocation failure for {requested_bytes} bytes");
            return Err(DequeError::AllocationFailure { requested_bytes });
        }
        let live = self.ledger.live_bytes();
        if let Some(limit) = self.byte_limit {
            if live.saturating_add(requested_bytes) > limit {
                log::debug!(
                    "byte limit {limit} refuses {requested_bytes} bytes ({live} outstanding)"
                );
                return Err(DequeError::AllocationFailure { requested_bytes });
            }
        }
        let block = Global.allocate(n)?;
        self.ledger.allocations.fetch_add(1, Ordering::Relaxed);
        let now = self
            .ledger
            .live_bytes
            .fetch_add(requested_bytes, Ordering::Relaxed)
            + requested_bytes;
        self.ledger.peak_bytes.fetch_max(now, Ordering::Relaxed);
        Ok(block)
    }

    fn deallocate<U>(&mut self, block: Box<[Option<U>]>) {
        let bytes = slot_bytes::<U>(block.len());
        self.ledger.deallocations.fetch_add(1, Ordering::Relaxed);
        self.ledger.live_bytes.fetch_sub(bytes, Ordering::Relaxed);
        Global.deallocate(block);
    }

    fn construct<U>(&mut self, slot: &mut Option<U>, value: U) {
        self.ledger.constructs.fetch_add(1, Ordering::Relaxed);
        debug_assert!(slot.is_none(), "construct into occupied slot");
        *slot = Some(value);
    }

    fn destroy<U>(&mut self, slot: &mut Option<U>) -> Option<U> {
        let value = slot.take();
        if value.is_some() {
            self.ledger.destroys.fetch_add(1, Ordering::Relaxed);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_hands_out_empty_slots() {
        let block: Box<[Option<u32>]> = Global.allocate(5).unwrap();
        assert_eq!(block.len(), 5);
        assert!(block.iter().all(Option::is_none));
    }

    #[test]
    fn global_rejects_impossible_request() {
        let result = Global.allocate::<u64>(usize::MAX);
        assert!(matches!(
            result,
            Err(DequeError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn construct_and_destroy_move_values() {
        let mut slot = None;
        Global.construct(&mut slot, 7u8);
        assert_eq!(slot, Some(7));
        assert_eq!(Global.destroy(&mut slot), Some(7));
        assert_eq!(slot, None);
    }

    #[test]
    fn counting_tracks_live_blocks_and_bytes() {
        let mut alloc = CountingAllocator::new();
        let a = alloc.allocate::<u32>(4).unwrap();
        let b = alloc.allocate::<u32>(2).unwrap();
        assert_eq!(alloc.ledger().live_blocks(), 2);
        assert_eq!(alloc.ledger().live_bytes(), slot_bytes::<u32>(6));
        alloc.deallocate(a);
        alloc.deallocate(b);
        assert_eq!(alloc.ledger().live_blocks(), 0);
        assert_eq!(alloc.ledger().live_bytes(), 0);
        assert_eq!(alloc.ledger().peak_bytes(), slot_bytes::<u32>(6));
    }

    #[test]
    fn clones_share_one_ledger() {
        let observer = CountingAllocator::new();
        let mut alloc = observer.clone();
        let block = alloc.allocate::<u8>(3).unwrap();
        assert_eq!(observer.ledger().allocations(), 1);
        alloc.deallocate(block);
        assert_eq!(observer.ledger().deallocations(), 1);
    }

    #[test]
    fn byte_limit_refuses_overflow() {
        let per_slot = slot_bytes::<u64>(1);
        let mut alloc = CountingAllocator::with_byte_limit(per_slot * 4);
        let block = alloc.allocate::<u64>(4).unwrap();
        let err = alloc.allocate::<u64>(1).unwrap_err();
        assert_eq!(
            err,
            DequeError::AllocationFailure {
                requested_bytes: per_slot
            }
        );
        alloc.deallocate(block);
        assert!(alloc.allocate::<u64>(1).is_ok());
    }

    #[test]
    fn fail_after_is_one_shot() {
        let mut alloc = CountingAllocator::new();
        alloc.fail_after(1);
        assert!(alloc.allocate::<u8>(1).is_ok());
        assert!(alloc.allocate::<u8>(1).is_err());
        assert!(alloc.allocate::<u8>(1).is_ok());
        assert_eq!(alloc.ledger().allocations(), 2);
    }

    #[test]
    fn counting_construct_destroy_counts() {
        let mut alloc = CountingAllocator::new();
        let mut slot = None;
        alloc.construct(&mut slot, "x");
        assert_eq!(alloc.destroy(&mut slot), Some("x"));
        assert_eq!(alloc.destroy(&mut slot), None);
        assert_eq!(alloc.ledger().constructs(), 1);
        assert_eq!(alloc.ledger().destroys(), 1);
    }
}
