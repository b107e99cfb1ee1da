//! Core types and policy for the `segdeque` workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the pieces every other crate agrees on: the error type, the policy
//! constants that shape buffers and the index, generation stamps for
//! cursor validation, and the allocator collaborator trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod config;
pub mod error;
pub mod id;

pub use alloc::{AllocLedger, CountingAllocator, Global, SlotAllocator};
pub use config::DequeConfig;
pub use error::DequeError;
pub use id::Generation;
