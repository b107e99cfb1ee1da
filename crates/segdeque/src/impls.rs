//! Standard trait implementations for [`Deque`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use segdeque_core::{DequeConfig, DequeError, Global, SlotAllocator};

use crate::deque::Deque;

impl<T> Default for Deque<T, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for Deque<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone, A: SlotAllocator + Clone> Deque<T, A> {
    /// Fallible [`Clone`]: a copy with the same policy and a clone of the
    /// allocator.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailure`] if the copy cannot be
    /// allocated. Nothing is leaked.
    pub fn try_clone(&self) -> Result<Self, DequeError> {
        let mut copy =
            Self::with_capacity_in(self.len(), *self.config(), self.allocator().clone())?;
        copy.try_extend(self.iter().cloned())?;
        Ok(copy)
    }
}

/// # Panics
///
/// Panics if the copy cannot be allocated. Use
/// [`try_clone`](Deque::try_clone) to handle that case.
impl<T: Clone, A: SlotAllocator + Clone> Clone for Deque<T, A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("deque clone failed: {err}"),
        }
    }
}

impl<T, U, A, B> PartialEq<Deque<U, B>> for Deque<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator,
    B: SlotAllocator,
{
    fn eq(&self, other: &Deque<U, B>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, A: SlotAllocator> Eq for Deque<T, A> {}

impl<T, U, A> PartialEq<[U]> for Deque<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator,
{
    fn eq(&self, other: &[U]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<T, U, A> PartialEq<Vec<U>> for Deque<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator,
{
    fn eq(&self, other: &Vec<U>) -> bool {
        *self == other[..]
    }
}

impl<T, U, A, const N: usize> PartialEq<[U; N]> for Deque<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator,
{
    fn eq(&self, other: &[U; N]) -> bool {
        *self == other[..]
    }
}

impl<T: PartialOrd, A: SlotAllocator> PartialOrd for Deque<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: SlotAllocator> Ord for Deque<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: SlotAllocator> Hash for Deque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for item in self {
            item.hash(state);
        }
    }
}

/// # Panics
///
/// Panics when `i >= len()`.
impl<T, A: SlotAllocator> Index<usize> for Deque<T, A> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match self.at(i) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

/// # Panics
///
/// Panics when `i >= len()`.
impl<T, A: SlotAllocator> IndexMut<usize> for Deque<T, A> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match self.at_mut(i) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

/// # Panics
///
/// Panics if a buffer cannot be allocated. Use
/// [`try_extend`](Deque::try_extend) to handle that case.
impl<T, A: SlotAllocator> Extend<T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("deque extend failed: {err}");
        }
    }
}

impl<'a, T: Copy + 'a, A: SlotAllocator> Extend<&'a T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Deque<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut deque =
            match Self::with_capacity_in(lower, DequeConfig::for_type::<T>(), Global) {
                Ok(deque) => deque,
                Err(err) => panic!("deque construction failed: {err}"),
            };
        deque.extend(iter);
        deque
    }
}

impl<T> From<Vec<T>> for Deque<T, Global> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T, Global> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T, A: SlotAllocator> From<Deque<T, A>> for Vec<T> {
    fn from(deque: Deque<T, A>) -> Self {
        deque.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    use segdeque_core::CountingAllocator;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_ignores_layout() {
        let mut a: Deque<i32> = Deque::with_config(DequeConfig::with_buffer_len(2)).unwrap();
        let mut b: Deque<i32> = Deque::with_config(DequeConfig::with_buffer_len(5)).unwrap();
        for v in 0..7 {
            a.push_back(v).unwrap();
        }
        for v in (0..7).rev() {
            b.push_front(v).unwrap();
        }
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        b.pop_back();
        assert_ne!(a, b);
    }

    #[test]
    fn compares_with_slices_and_vecs() {
        let d = Deque::from([1, 2, 3]);
        assert_eq!(d, [1, 2, 3]);
        assert_eq!(d, vec![1, 2, 3]);
        assert!(d == [1, 2, 3][..]);
        assert_ne!(d, [1, 2]);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Deque::from([1, 2, 3]);
        let b = Deque::from([1, 2, 4]);
        let c = Deque::from([1, 2]);
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn debug_lists_elements() {
        let d = Deque::from(vec!["a", "b"]);
        assert_eq!(format!("{d:?}"), r#"["a", "b"]"#);
    }

    #[test]
    fn index_reads_and_writes() {
        let mut d: Deque<i32> = (0..20).collect();
        d[7] = 70;
        assert_eq!(d[7], 70);
        assert_eq!(d[19], 19);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_past_end_panics() {
        let d = Deque::from([1]);
        let _ = d[1];
    }

    #[test]
    fn clone_is_deep_and_independent() {
        let mut a: Deque<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let b = a.clone();
        a[0].push('!');
        assert_eq!(b[0], "x");
        assert_eq!(a[0], "x!");
    }

    #[test]
    fn try_clone_shares_the_allocator() {
        let alloc = CountingAllocator::new();
        let mut a =
            Deque::with_config_and_allocator(DequeConfig::with_buffer_len(2), alloc.clone())
                .unwrap();
        a.extend([1, 2, 3, 4, 5]);
        let before = alloc.ledger().live_blocks();
        let b = a.try_clone().unwrap();
        assert_eq!(a, b);
        assert!(alloc.ledger().live_blocks() > before);
        drop(b);
        assert_eq!(alloc.ledger().live_blocks(), before);
    }

    #[test]
    fn failed_try_clone_leaks_nothing() {
        let alloc = CountingAllocator::new();
        let mut a =
            Deque::with_config_and_allocator(DequeConfig::with_buffer_len(2), alloc.clone())
                .unwrap();
        a.extend(0..9);
        let before = alloc.ledger().live_blocks();
        alloc.fail_after(3);
        assert!(a.try_clone().is_err());
        assert_eq!(alloc.ledger().live_blocks(), before);
    }

    #[test]
    fn extend_by_reference() {
        let mut d: Deque<u8> = Deque::new();
        d.extend(&[1, 2, 3]);
        d.extend([4].iter());
        assert_eq!(d, [1, 2, 3, 4]);
    }

    #[test]
    fn converts_to_and_from_vec() {
        let d = Deque::from((0..30).collect::<Vec<_>>());
        let v: Vec<i32> = d.into();
        assert_eq!(v, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn default_is_empty() {
        let d: Deque<()> = Deque::default();
        assert!(d.is_empty());
    }
}
