//! Iterators over a [`Deque`].
//!
//! [`Iter`] walks with a pair of cursors and reads through the index.
//! [`IterMut`] flattens the live window of buffers, because mutable
//! borrows of distinct elements must come from splitting slices rather
//! than repeated lookups. [`IntoIter`] pops from the owned deque.

use std::iter::FusedIterator;

use segdeque_core::SlotAllocator;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::deque::Deque;
use crate::index::BufferIndex;

impl<T, A: SlotAllocator> Deque<T, A> {
    /// Front-to-back iterator over shared references.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            index: &self.index,
            front: self.begin(),
            back: self.end(),
            remaining: self.len(),
        }
    }

    /// Front-to-back iterator over mutable references.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let remaining = self.len();
        IterMut {
            buffers: self.window_mut().iter_mut(),
            front: Default::default(),
            back: Default::default(),
            remaining,
        }
    }
}

/// Shared iterator returned by [`Deque::iter`].
pub struct Iter<'a, T> {
    index: &'a BufferIndex<T>,
    front: Cursor,
    /// One past the next element yielded from the back.
    back: Cursor,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let item = self
            .index
            .buffer(usize::try_from(self.front.slot()).ok()?)?
            .get(self.front.offset());
        self.front.inc();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.back.dec();
        self.remaining -= 1;
        self.index
            .buffer(usize::try_from(self.back.slot()).ok()?)?
            .get(self.back.offset())
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator returned by [`Deque::iter_mut`].
pub struct IterMut<'a, T> {
    buffers: std::slice::IterMut<'a, Option<Buffer<T>>>,
    /// Slots of the buffer currently being consumed from the front.
    front: std::slice::IterMut<'a, Option<T>>,
    /// Slots of the buffer currently being consumed from the back.
    back: std::slice::IterMut<'a, Option<T>>,
    remaining: usize,
}

fn first_live<'a, T>(slots: &mut std::slice::IterMut<'a, Option<T>>) -> Option<&'a mut T> {
    slots.find_map(Option::as_mut)
}

fn last_live<'a, T>(slots: &mut std::slice::IterMut<'a, Option<T>>) -> Option<&'a mut T> {
    while let Some(slot) = slots.next_back() {
        if let Some(item) = slot.as_mut() {
            return Some(item);
        }
    }
    None
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(item) = first_live(&mut self.front) {
                self.remaining -= 1;
                return Some(item);
            }
            match self.buffers.next() {
                Some(handle) => {
                    if let Some(buffer) = handle.as_mut() {
                        self.front = buffer.slots_mut().iter_mut();
                    }
                }
                None => {
                    // The back half holds whatever is left.
                    let item = first_live(&mut self.back)?;
                    self.remaining -= 1;
                    return Some(item);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(item) = last_live(&mut self.back) {
                self.remaining -= 1;
                return Some(item);
            }
            match self.buffers.next_back() {
                Some(handle) => {
                    if let Some(buffer) = handle.as_mut() {
                        self.back = buffer.slots_mut().iter_mut();
                    }
                }
                None => {
                    let item = last_live(&mut self.front)?;
                    self.remaining -= 1;
                    return Some(item);
                }
            }
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator returned by [`Deque::into_iter`](IntoIterator::into_iter).
pub struct IntoIter<T, A: SlotAllocator = segdeque_core::Global> {
    deque: Deque<T, A>,
}

impl<T, A: SlotAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.deque.len();
        (len, Some(len))
    }
}

impl<T, A: SlotAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, A: SlotAllocator> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: SlotAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: SlotAllocator> IntoIterator for Deque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter { deque: self }
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
