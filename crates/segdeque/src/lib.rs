//! Double-ended queue stored in fixed-size buffers.
//!
//! Elements live in buffers of `K` slots each. An index of buffer
//! handles keeps the buffers in sequence order, so pushing or popping
//! at either end is amortized O(1), indexing is O(1), and growing never
//! moves an element that is already stored.
//!
//! # Architecture
//!
//! ```text
//! Deque (head offset, tail offset, generation)
//! ├── BufferIndex (handle array with a contiguous live window)
//! │   ├── growth: slack check, recenter or regrow plan
//! │   └── Buffer × used (K slots each, from the SlotAllocator)
//! └── Cursor (slot, offset, K, generation), validated on use
//! ```
//!
//! # Memory safety
//!
//! Slots are `Option<T>`, so a buffer's vacant slots need no
//! uninitialized memory and the crate contains no `unsafe` code.
//!
//! # Failure safety
//!
//! Every operation that can fail secures its memory first. A call that
//! returns [`DequeError::AllocationFailure`] leaves the deque unchanged.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod cursor;
pub mod deque;
pub mod growth;
mod impls;
pub mod index;
pub mod iter;

pub use cursor::Cursor;
pub use deque::Deque;
pub use index::IndexStats;
pub use iter::{IntoIter, Iter, IterMut};
pub use segdeque_core::{
    AllocLedger, CountingAllocator, DequeConfig, DequeError, Generation, Global, SlotAllocator,
};
