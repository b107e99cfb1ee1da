//! Test utilities for segdeque development.
//!
//! Provides a drop-counting element type ([`Tracked`]), a reference
//! model driven by [`Op`] sequences, and both proptest strategies and
//! seeded generators for those sequences.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod model;

pub use model::{apply_op, assert_matches_model, op_strategy, seeded_ops, Op};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts how many [`Tracked`] values made by it are alive.
///
/// Every construction and clone increments the count, every drop
/// decrements it, so a container that leaks or double-drops shows up as
/// a nonzero (or underflowed) count once it is gone.
#[derive(Clone, Debug, Default)]
pub struct DropCounter {
    live: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a tracked value carrying `id`.
    pub fn make(&self, id: i64) -> Tracked {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst);
        Tracked {
            id,
            counter: self.clone(),
        }
    }

    /// Values currently alive.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Values ever created, clones included.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

/// Element type whose lifetime is recorded by a [`DropCounter`].
#[derive(Debug)]
pub struct Tracked {
    pub id: i64,
    counter: DropCounter,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.counter.make(self.id)
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counter.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_follows_clones_and_drops() {
        let counter = DropCounter::new();
        let a = counter.make(1);
        let b = a.clone();
        assert_eq!(counter.live(), 2);
        assert_eq!(counter.created(), 2);
        drop(a);
        assert_eq!(counter.live(), 1);
        assert_eq!(b.id, 1);
        drop(b);
        assert_eq!(counter.live(), 0);
    }
}
