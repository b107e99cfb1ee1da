//! The chunked double-ended queue.
//!
//! ```text
//! BufferIndex (handle array, live window [first, last])
//! ├── slot first → Buffer [ . . h x x x ]   h = head offset
//! ├── ...        → Buffer [ x x x x x x ]
//! └── slot last  → Buffer [ x x t . . . ]   t = tail offset (one past)
//! ```
//!
//! Both boundary positions always sit inside an allocated buffer with an
//! offset below `K`, so the tail buffer exists even when it holds nothing.
//!
//! # Failure policy
//!
//! Every fallible step (index slack, buffer allocation) runs before any
//! element is constructed or moved. Element shifts are plain moves
//! between `Option` slots and cannot fail, so a call that returns an
//! error leaves the deque exactly as it found it.

use smallvec::SmallVec;

use segdeque_core::alloc::slot_bytes;
use segdeque_core::{DequeConfig, DequeError, Generation, Global, SlotAllocator};

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::growth::Side;
use crate::index::{BufferIndex, IndexStats};

const MISSING_BUFFER: DequeError = DequeError::InvariantViolation {
    context: "live index slot without a buffer",
};

const MISSING_SPARE: DequeError = DequeError::InvariantViolation {
    context: "boundary growth without a reserved buffer",
};

/// Buffers allocated ahead of a push, consumed as the boundary crosses
/// into them.
type Spares<T> = SmallVec<[Buffer<T>; 2]>;

/// A double-ended queue stored in fixed-size buffers.
///
/// Pushes and pops at either end are amortized O(1), indexing is O(1),
/// and growth never moves existing elements: only the index of buffer
/// handles is reshaped.
pub struct Deque<T, A: SlotAllocator = Global> {
    pub(crate) index: BufferIndex<T>,
    /// Offset of the first element inside the first live buffer.
    pub(crate) head: usize,
    /// Offset one past the last element inside the last live buffer.
    pub(crate) tail: usize,
    config: DequeConfig,
    alloc: A,
    generation: Generation,
}

impl<T> Deque<T, Global> {
    /// Create an empty deque on the global heap with a buffer length
    /// suited to `T`.
    ///
    /// # Panics
    ///
    /// Panics if the initial index or buffer cannot be allocated. Use
    /// [`try_new`](Self::try_new) to handle that case.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(deque) => deque,
            Err(err) => panic!("deque construction failed: {err}"),
        }
    }

    /// Fallible form of [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the heap refuses.
    pub fn try_new() -> Result<Self, DequeError> {
        Self::with_config_and_allocator(DequeConfig::for_type::<T>(), Global)
    }

    /// Create an empty deque with an explicit sizing policy.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::InvalidConfig`] for a rejected policy, or
    /// [`DequeError::AllocationFailure`] if the heap refuses.
    pub fn with_config(config: DequeConfig) -> Result<Self, DequeError> {
        Self::with_config_and_allocator(config, Global)
    }

    /// Create an empty deque whose index is sized so that `capacity`
    /// pushes at either end never reshape it.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the heap refuses.
    pub fn with_capacity(capacity: usize) -> Result<Self, DequeError> {
        Self::with_capacity_in(capacity, DequeConfig::for_type::<T>(), Global)
    }
}

impl<T, A: SlotAllocator> Deque<T, A> {
    /// Create an empty deque drawing memory from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if `alloc` refuses.
    pub fn with_allocator(alloc: A) -> Result<Self, DequeError> {
        Self::with_config_and_allocator(DequeConfig::for_type::<T>(), alloc)
    }

    /// Create an empty deque with an explicit policy and allocator.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::InvalidConfig`] for a rejected policy, or
    /// [`DequeError::AllocationFailure`] if `alloc` refuses.
    pub fn with_config_and_allocator(config: DequeConfig, alloc: A) -> Result<Self, DequeError> {
        Self::with_capacity_in(0, config, alloc)
    }

    /// Create an empty deque whose index has room for `capacity`
    /// elements' worth of buffers on each side.
    ///
    /// # Errors
    ///
    /// Same as [`with_config_and_allocator`](Self::with_config_and_allocator).
    pub fn with_capacity_in(
        capacity: usize,
        config: DequeConfig,
        mut alloc: A,
    ) -> Result<Self, DequeError> {
        config.validate()?;
        let buffers = capacity / config.buffer_len + 1;
        let index_capacity = config.index_capacity_for(buffers.saturating_mul(2));
        let index = BufferIndex::new(index_capacity, config.buffer_len, &mut alloc)?;
        Ok(Self {
            index,
            head: 0,
            tail: 0,
            config,
            alloc,
            generation: Generation::next(),
        })
    }

    // ── Size and shape ─────────────────────────────────────────────

    /// Number of elements.
    pub fn len(&self) -> usize {
        let spanned = self.index.last_slot() - self.index.first_slot();
        spanned * self.buffer_len() + self.tail - self.head
    }

    /// Whether the deque holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper bound on the number of elements a deque of `T` can address.
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / std::mem::size_of::<T>().max(1)
    }

    /// Element slots per buffer (`K`).
    pub fn buffer_len(&self) -> usize {
        self.config.buffer_len
    }

    /// Number of allocated buffers.
    pub fn buffer_count(&self) -> usize {
        self.index.used()
    }

    /// Number of handle slots in the index.
    pub fn index_capacity(&self) -> usize {
        self.index.capacity()
    }

    /// How often the index has been reallocated or recentered.
    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// The sizing policy this deque was built with.
    pub fn config(&self) -> &DequeConfig {
        &self.config
    }

    /// The allocator backing this deque.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Stamp of the current structural state. Changes on every mutation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn touch(&mut self) {
        self.generation = Generation::next();
    }

    // ── Element access ─────────────────────────────────────────────

    /// `(slot, offset)` of the element at position `i`, where `i` may be
    /// `len()` to name the end position.
    fn locate(&self, i: usize) -> (usize, usize) {
        let k = self.buffer_len();
        let pos = self.head + i;
        (self.index.first_slot() + pos / k, pos % k)
    }

    /// The element at position `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<&T> {
        if i >= self.len() {
            return None;
        }
        let (slot, offset) = self.locate(i);
        self.index.buffer(slot)?.get(offset)
    }

    /// The element at position `i`, mutably, or `None` past the end.
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        if i >= self.len() {
            return None;
        }
        let (slot, offset) = self.locate(i);
        self.index.buffer_mut(slot)?.get_mut(offset)
    }

    /// Checked access.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] when `i >= len()`.
    pub fn at(&self, i: usize) -> Result<&T, DequeError> {
        let len = self.len();
        self.get(i)
            .ok_or(DequeError::OutOfRange { index: i, len })
    }

    /// Checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] when `i >= len()`.
    pub fn at_mut(&mut self, i: usize) -> Result<&mut T, DequeError> {
        let len = self.len();
        self.get_mut(i)
            .ok_or(DequeError::OutOfRange { index: i, len })
    }

    /// First element.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// First element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Last element.
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let last = self.len().checked_sub(1)?;
        self.get_mut(last)
    }

    // ── Cursors ────────────────────────────────────────────────────

    /// Cursor at the first element (equal to [`end`](Self::end) when empty).
    pub fn begin(&self) -> Cursor {
        Cursor::new(
            self.index.first_slot(),
            self.head,
            self.buffer_len(),
            self.generation,
        )
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> Cursor {
        Cursor::new(
            self.index.last_slot(),
            self.tail,
            self.buffer_len(),
            self.generation,
        )
    }

    /// Cursor at position `i`; `i == len()` yields [`end`](Self::end).
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] when `i > len()`.
    pub fn cursor_at(&self, i: usize) -> Result<Cursor, DequeError> {
        let len = self.len();
        if i > len {
            return Err(DequeError::OutOfRange { index: i, len });
        }
        let (slot, offset) = self.locate(i);
        Ok(Cursor::new(slot, offset, self.buffer_len(), self.generation))
    }

    /// Element position named by `cursor`, in `0..=len()`.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::StaleCursor`] if the deque changed since the
    /// cursor was made (or it belongs to another deque), and
    /// [`DequeError::CursorOutOfBounds`] if it lies outside `[begin, end]`.
    pub fn position_of(&self, cursor: Cursor) -> Result<usize, DequeError> {
        if cursor.generation() != self.generation {
            return Err(DequeError::StaleCursor {
                cursor_generation: cursor.generation().get(),
                current_generation: self.generation.get(),
            });
        }
        let len = self.len();
        let distance = cursor - self.begin();
        match usize::try_from(distance) {
            Ok(i) if i <= len => Ok(i),
            _ => Err(DequeError::CursorOutOfBounds { distance, len }),
        }
    }

    /// Dereference a cursor.
    ///
    /// # Errors
    ///
    /// Everything [`position_of`](Self::position_of) reports, plus
    /// [`DequeError::OutOfRange`] for the end cursor.
    pub fn get_at(&self, cursor: Cursor) -> Result<&T, DequeError> {
        let i = self.position_of(cursor)?;
        self.at(i)
    }

    /// Dereference a cursor mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get_at`](Self::get_at).
    pub fn get_at_mut(&mut self, cursor: Cursor) -> Result<&mut T, DequeError> {
        let i = self.position_of(cursor)?;
        self.at_mut(i)
    }

    /// The element `n` positions away from `cursor` (`cursor[n]`).
    ///
    /// # Errors
    ///
    /// Same as [`get_at`](Self::get_at), for the shifted position.
    pub fn get_at_offset(&self, cursor: Cursor, n: isize) -> Result<&T, DequeError> {
        let i = self.position_of(cursor)?;
        let len = self.len();
        let target = i
            .checked_add_signed(n)
            .ok_or(DequeError::CursorOutOfBounds {
                distance: (i as isize).saturating_add(n),
                len,
            })?;
        self.at(target)
    }

    // ── Growth ─────────────────────────────────────────────────────

    /// Make room for `count` new buffers on `side` and allocate them.
    /// On failure every buffer obtained so far goes back to the allocator.
    fn reserve_buffers(&mut self, count: usize, side: Side) -> Result<Spares<T>, DequeError> {
        if count == 0 {
            return Ok(Spares::new());
        }
        match side {
            Side::Front => self.index.ensure_slack_front(count, &mut self.alloc)?,
            Side::Back => self.index.ensure_slack_back(count, &mut self.alloc)?,
        }
        let k = self.buffer_len();
        let mut spares = Spares::with_capacity(count);
        for _ in 0..count {
            match Buffer::allocate(k, &mut self.alloc) {
                Ok(buffer) => spares.push(buffer),
                Err(err) => {
                    self.release_spares(spares);
                    return Err(err);
                }
            }
        }
        Ok(spares)
    }

    fn release_spares(&mut self, spares: Spares<T>) {
        for buffer in spares {
            buffer.release(&mut self.alloc);
        }
    }

    /// Buffers needed to push `n` more elements at the back.
    fn back_buffers_for(&self, n: usize) -> usize {
        self.tail.saturating_add(n) / self.buffer_len()
    }

    /// Buffers needed to push `n` more elements at the front.
    fn front_buffers_for(&self, n: usize) -> usize {
        n.saturating_sub(self.head).div_ceil(self.buffer_len())
    }

    /// Construct at the tail and advance it, installing a reserved buffer
    /// when the tail crosses out of its buffer.
    fn push_back_with(&mut self, value: T, spares: &mut Spares<T>) -> Result<(), DequeError> {
        let last = self.index.last_slot();
        if self.tail + 1 == self.buffer_len() {
            // Secure the next buffer before the value goes in.
            let next = spares.pop().ok_or(MISSING_SPARE)?;
            self.index.install_back(next)?;
            self.index
                .buffer_mut(last)
                .ok_or(MISSING_BUFFER)?
                .construct(self.tail, value, &mut self.alloc);
            self.tail = 0;
        } else {
            self.index
                .buffer_mut(last)
                .ok_or(MISSING_BUFFER)?
                .construct(self.tail, value, &mut self.alloc);
            self.tail += 1;
        }
        Ok(())
    }

    /// Retreat the head and construct there, installing a reserved buffer
    /// when the head crosses out of its buffer.
    fn push_front_with(&mut self, value: T, spares: &mut Spares<T>) -> Result<(), DequeError> {
        if self.head == 0 {
            let next = spares.pop().ok_or(MISSING_SPARE)?;
            self.index.install_front(next)?;
            self.head = self.buffer_len();
        }
        self.head -= 1;
        let first = self.index.first_slot();
        self.index
            .buffer_mut(first)
            .ok_or(MISSING_BUFFER)?
            .construct(self.head, value, &mut self.alloc);
        Ok(())
    }

    /// Hand back unused spares and stamp a new generation, whether or not
    /// the pushes made with them succeeded.
    fn settle_growth(
        &mut self,
        spares: Spares<T>,
        pushed: Result<(), DequeError>,
    ) -> Result<(), DequeError> {
        self.release_spares(spares);
        self.touch();
        pushed
    }

    fn push_clones_back(
        &mut self,
        n: usize,
        value: T,
        spares: &mut Spares<T>,
    ) -> Result<(), DequeError>
    where
        T: Clone,
    {
        for _ in 1..n {
            self.push_back_with(value.clone(), spares)?;
        }
        self.push_back_with(value, spares)
    }

    fn push_clones_front(
        &mut self,
        n: usize,
        value: T,
        spares: &mut Spares<T>,
    ) -> Result<(), DequeError>
    where
        T: Clone,
    {
        for _ in 1..n {
            self.push_front_with(value.clone(), spares)?;
        }
        self.push_front_with(value, spares)
    }

    /// Append an element.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if a new buffer or a
    /// larger index is needed and cannot be allocated. The deque is then
    /// unchanged and `value` is dropped.
    pub fn push_back(&mut self, value: T) -> Result<(), DequeError> {
        self.emplace_back(|| value)
    }

    /// Prepend an element.
    ///
    /// # Errors
    ///
    /// Same as [`push_back`](Self::push_back).
    pub fn push_front(&mut self, value: T) -> Result<(), DequeError> {
        self.emplace_front(|| value)
    }

    /// Append the value built by `make`, called only once space is secured.
    ///
    /// # Errors
    ///
    /// Same as [`push_back`](Self::push_back); `make` is not called.
    pub fn emplace_back<F: FnOnce() -> T>(&mut self, make: F) -> Result<(), DequeError> {
        let mut spares = self.reserve_buffers(self.back_buffers_for(1), Side::Back)?;
        let pushed = self.push_back_with(make(), &mut spares);
        self.settle_growth(spares, pushed)
    }

    /// Prepend the value built by `make`, called only once space is secured.
    ///
    /// # Errors
    ///
    /// Same as [`push_back`](Self::push_back); `make` is not called.
    pub fn emplace_front<F: FnOnce() -> T>(&mut self, make: F) -> Result<(), DequeError> {
        let mut spares = self.reserve_buffers(self.front_buffers_for(1), Side::Front)?;
        let pushed = self.push_front_with(make(), &mut spares);
        self.settle_growth(spares, pushed)
    }

    // ── Shrinking ──────────────────────────────────────────────────

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        if self.tail == 0 {
            // The tail buffer is empty; step back into the previous one.
            let emptied = self.index.release_back()?;
            emptied.release(&mut self.alloc);
            self.tail = self.buffer_len();
        }
        self.tail -= 1;
        let last = self.index.last_slot();
        let value = self
            .index
            .buffer_mut(last)?
            .destroy(self.tail, &mut self.alloc);
        self.touch();
        value
    }

    /// Remove and return the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let first = self.index.first_slot();
        let value = self
            .index
            .buffer_mut(first)?
            .destroy(self.head, &mut self.alloc);
        self.head += 1;
        if self.head == self.buffer_len() {
            if let Some(emptied) = self.index.release_front() {
                emptied.release(&mut self.alloc);
            }
            self.head = 0;
        }
        self.touch();
        value
    }

    /// Drop elements from the back until at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        while self.len() > len {
            drop(self.pop_back());
        }
    }

    /// Drop every element, keep a single buffer, and recenter it in the
    /// index.
    pub fn clear(&mut self) {
        self.truncate(0);
        self.head = 0;
        self.tail = 0;
        self.index.recenter();
        self.touch();
        log::trace!("deque cleared; index capacity {}", self.index.capacity());
    }

    /// Shrink the index to the smallest capacity the policy allows for
    /// the current number of buffers. Buffers themselves are already
    /// exact: only those holding elements are allocated.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the smaller index
    /// cannot be allocated; the deque is then unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<(), DequeError> {
        let target = self.config.index_capacity_for(self.index.used());
        if self.index.shrink_to(target, &mut self.alloc)? {
            self.touch();
        }
        Ok(())
    }

    /// Exchange contents with `other` in O(1). Cursors into either deque
    /// become stale.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
        self.touch();
        other.touch();
    }

    // ── Element moves ──────────────────────────────────────────────

    /// Exchange the elements at positions `a` and `b`.
    fn swap_elements(&mut self, a: usize, b: usize) -> Result<(), DequeError> {
        let (slot_a, offset_a) = self.locate(a);
        let (slot_b, offset_b) = self.locate(b);
        if slot_a == slot_b {
            self.index
                .buffer_mut(slot_a)
                .ok_or(MISSING_BUFFER)?
                .swap_slots(offset_a, offset_b);
            return Ok(());
        }
        let moving = self
            .index
            .buffer_mut(slot_a)
            .ok_or(MISSING_BUFFER)?
            .slot_mut(offset_a)
            .take();
        let displaced = std::mem::replace(
            self.index
                .buffer_mut(slot_b)
                .ok_or(MISSING_BUFFER)?
                .slot_mut(offset_b),
            moving,
        );
        *self
            .index
            .buffer_mut(slot_a)
            .ok_or(MISSING_BUFFER)?
            .slot_mut(offset_a) = displaced;
        Ok(())
    }

    /// Move the elements in `start..end` by `shift` positions toward the
    /// front (negative) or back (positive), trading places with whatever
    /// occupies the destination. Walks ascending for front-ward moves and
    /// descending for back-ward moves so aliasing ranges stay intact.
    fn shift_range(&mut self, start: usize, end: usize, shift: isize) -> Result<(), DequeError> {
        let distance = shift.unsigned_abs();
        if shift < 0 {
            for i in start..end {
                self.swap_elements(i, i - distance)?;
            }
        } else {
            for i in (start..end).rev() {
                self.swap_elements(i, i + distance)?;
            }
        }
        Ok(())
    }

    // ── Insertion ──────────────────────────────────────────────────

    /// Insert `value` before `pos`, returning a cursor to it.
    ///
    /// The shorter side of the sequence moves; the other side is untouched.
    ///
    /// # Errors
    ///
    /// Cursor errors from [`position_of`](Self::position_of), or
    /// [`DequeError::AllocationFailure`] with the deque unchanged.
    pub fn insert(&mut self, pos: Cursor, value: T) -> Result<Cursor, DequeError> {
        let i = self.position_of(pos)?;
        self.emplace_at(i, || value)
    }

    /// [`insert`](Self::insert) with a deferred value.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert); `make` is not called on failure.
    pub fn emplace<F: FnOnce() -> T>(&mut self, pos: Cursor, make: F) -> Result<Cursor, DequeError> {
        let i = self.position_of(pos)?;
        self.emplace_at(i, make)
    }

    /// Insert `value` at position `i`, shifting later elements back.
    ///
    /// # Errors
    ///
    /// [`DequeError::OutOfRange`] when `i > len()`, or
    /// [`DequeError::AllocationFailure`] with the deque unchanged.
    pub fn insert_at(&mut self, i: usize, value: T) -> Result<Cursor, DequeError> {
        self.emplace_at(i, || value)
    }

    /// [`insert_at`](Self::insert_at) with a deferred value.
    ///
    /// # Errors
    ///
    /// Same as [`insert_at`](Self::insert_at).
    pub fn emplace_at<F: FnOnce() -> T>(&mut self, i: usize, make: F) -> Result<Cursor, DequeError> {
        let len = self.len();
        if i > len {
            return Err(DequeError::OutOfRange { index: i, len });
        }
        if i < len - i {
            let mut spares = self.reserve_buffers(self.front_buffers_for(1), Side::Front)?;
            let pushed = self.push_front_with(make(), &mut spares);
            self.settle_growth(spares, pushed)?;
            // New value sits at 0; the prefix moves one step toward the front.
            self.shift_range(1, i + 1, -1)?;
        } else {
            let mut spares = self.reserve_buffers(self.back_buffers_for(1), Side::Back)?;
            let pushed = self.push_back_with(make(), &mut spares);
            self.settle_growth(spares, pushed)?;
            // New value sits at len; the suffix moves one step toward the back.
            self.shift_range(i, len, 1)?;
        }
        self.cursor_at(i)
    }

    /// Insert `n` clones of `value` before `pos`, returning a cursor to the
    /// first of them.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn insert_n(&mut self, pos: Cursor, n: usize, value: T) -> Result<Cursor, DequeError>
    where
        T: Clone,
    {
        let i = self.position_of(pos)?;
        self.insert_n_at(i, n, value)
    }

    /// Insert `n` clones of `value` at position `i`.
    ///
    /// Inserting at either end only constructs; otherwise the shorter
    /// side is moved `n` places in one pass.
    ///
    /// # Errors
    ///
    /// Same as [`insert_at`](Self::insert_at). On failure nothing was
    /// constructed and nothing moved.
    pub fn insert_n_at(&mut self, i: usize, n: usize, value: T) -> Result<Cursor, DequeError>
    where
        T: Clone,
    {
        let len = self.len();
        if i > len {
            return Err(DequeError::OutOfRange { index: i, len });
        }
        if n == 0 {
            return self.cursor_at(i);
        }
        let too_many = DequeError::AllocationFailure {
            requested_bytes: slot_bytes::<T>(n),
        };
        match len.checked_add(n) {
            Some(total) if total <= self.max_size() => {}
            _ => return Err(too_many),
        }
        let shift = isize::try_from(n).map_err(|_| too_many)?;
        if i != len && (i == 0 || i < len - i) {
            let mut spares = self.reserve_buffers(self.front_buffers_for(n), Side::Front)?;
            let pushed = self.push_clones_front(n, value, &mut spares);
            self.settle_growth(spares, pushed)?;
            self.shift_range(n, n + i, -shift)?;
        } else {
            let mut spares = self.reserve_buffers(self.back_buffers_for(n), Side::Back)?;
            let pushed = self.push_clones_back(n, value, &mut spares);
            self.settle_growth(spares, pushed)?;
            self.shift_range(i, len, shift)?;
        }
        self.cursor_at(i)
    }

    // ── Removal ────────────────────────────────────────────────────

    /// Move the survivors of removing `start..end` over the gap, leaving
    /// the doomed elements at whichever end moved. Returns that end.
    fn close_gap(&mut self, start: usize, end: usize) -> Result<Side, DequeError> {
        let len = self.len();
        let removed = (end - start) as isize;
        if start < len - end {
            self.shift_range(0, start, removed)?;
            Ok(Side::Front)
        } else {
            self.shift_range(end, len, -removed)?;
            Ok(Side::Back)
        }
    }

    fn pop_side(&mut self, side: Side) -> Option<T> {
        match side {
            Side::Front => self.pop_front(),
            Side::Back => self.pop_back(),
        }
    }

    /// Remove the element at `pos`, returning a cursor to the element that
    /// followed it.
    ///
    /// # Errors
    ///
    /// Cursor errors from [`position_of`](Self::position_of), or
    /// [`DequeError::OutOfRange`] for the end cursor.
    pub fn erase(&mut self, pos: Cursor) -> Result<Cursor, DequeError> {
        let i = self.position_of(pos)?;
        let len = self.len();
        if i >= len {
            return Err(DequeError::OutOfRange { index: i, len });
        }
        self.erase_range_at(i, i + 1)
    }

    /// Remove `[first, last)`, returning a cursor to the element that
    /// followed the range.
    ///
    /// # Errors
    ///
    /// Cursor errors from [`position_of`](Self::position_of), or
    /// [`DequeError::InvalidRange`] when `first` is after `last`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, DequeError> {
        let start = self.position_of(first)?;
        let end = self.position_of(last)?;
        self.erase_range_at(start, end)
    }

    /// Remove positions `start..end`.
    ///
    /// # Errors
    ///
    /// [`DequeError::InvalidRange`] when `start > end`, or
    /// [`DequeError::OutOfRange`] when `end > len()`.
    pub fn erase_range_at(&mut self, start: usize, end: usize) -> Result<Cursor, DequeError> {
        let len = self.len();
        if start > end {
            return Err(DequeError::InvalidRange { start, end });
        }
        if end > len {
            return Err(DequeError::OutOfRange { index: end, len });
        }
        if start == end {
            return self.cursor_at(start);
        }
        let side = self.close_gap(start, end)?;
        for _ in start..end {
            drop(self.pop_side(side));
        }
        self.cursor_at(start)
    }

    /// Remove and return the element at position `i`.
    ///
    /// # Errors
    ///
    /// [`DequeError::OutOfRange`] when `i >= len()`.
    pub fn remove(&mut self, i: usize) -> Result<T, DequeError> {
        let len = self.len();
        if i >= len {
            return Err(DequeError::OutOfRange { index: i, len });
        }
        let side = self.close_gap(i, i + 1)?;
        self.pop_side(side).ok_or(DequeError::InvariantViolation {
            context: "removed element missing after gap close",
        })
    }

    // ── Bulk ───────────────────────────────────────────────────────

    /// Append every item of `iter`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`DequeError::AllocationFailure`]; items pushed
    /// before it stay in the deque.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<(), DequeError> {
        for item in iter {
            self.push_back(item)?;
        }
        Ok(())
    }

    pub(crate) fn window_mut(&mut self) -> &mut [Option<Buffer<T>>] {
        self.index.window_mut()
    }
}

impl<T, A: SlotAllocator> Drop for Deque<T, A> {
    fn drop(&mut self) {
        self.index.release_all(&mut self.alloc);
    }
}
