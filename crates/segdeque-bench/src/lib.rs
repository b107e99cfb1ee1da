//! Workload profiles for benchmarking segdeque.
//!
//! - [`Workload`]: the push patterns the benches compare.
//! - [`build`]: run a push pattern into a fresh deque.
//! - [`replay`]: drive a deque with a seeded op stream from
//!   `segdeque-test-utils`, without the reference model.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use segdeque::Deque;
use segdeque_core::{DequeConfig, DequeError, SlotAllocator};
use segdeque_test_utils::Op;

/// Element counts used across the benches.
pub const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// How elements enter the deque.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workload {
    /// Every element pushed at the back.
    BackOnly,
    /// Every element pushed at the front.
    FrontOnly,
    /// Back and front in turn.
    Alternating,
    /// Push at the back, and pop the front once the deque holds 64.
    Queue,
}

impl Workload {
    /// Every workload, in the order benches report them.
    pub const ALL: [Workload; 4] = [
        Workload::BackOnly,
        Workload::FrontOnly,
        Workload::Alternating,
        Workload::Queue,
    ];

    /// Short name for bench ids.
    pub fn name(self) -> &'static str {
        match self {
            Workload::BackOnly => "back_only",
            Workload::FrontOnly => "front_only",
            Workload::Alternating => "alternating",
            Workload::Queue => "queue",
        }
    }
}

/// Run `workload` for `n` elements into a new deque with `config`.
///
/// # Errors
///
/// Any construction or push failure.
pub fn build(workload: Workload, n: usize, config: DequeConfig) -> Result<Deque<u64>, DequeError> {
    let mut deque = Deque::with_config(config)?;
    for v in 0..n as u64 {
        match workload {
            Workload::BackOnly => deque.push_back(v)?,
            Workload::FrontOnly => deque.push_front(v)?,
            Workload::Alternating if v % 2 == 0 => deque.push_back(v)?,
            Workload::Alternating => deque.push_front(v)?,
            Workload::Queue => {
                deque.push_back(v)?;
                if deque.len() > 64 {
                    deque.pop_front();
                }
            }
        }
    }
    Ok(deque)
}

/// Apply `ops` to `deque` alone. Positions wrap against the current
/// length the same way the reference model does.
///
/// # Errors
///
/// The first failing operation.
pub fn replay<A: SlotAllocator>(deque: &mut Deque<i32, A>, ops: &[Op]) -> Result<(), DequeError> {
    for op in ops {
        let len = deque.len();
        match *op {
            Op::PushBack(value) => deque.push_back(value)?,
            Op::PushFront(value) => deque.push_front(value)?,
            Op::PopBack => {
                deque.pop_back();
            }
            Op::PopFront => {
                deque.pop_front();
            }
            Op::Insert { at, value } => {
                deque.insert_at(at % (len + 1), value)?;
            }
            Op::InsertN { at, count, value } => {
                deque.insert_n_at(at % (len + 1), count, value)?;
            }
            Op::Erase { at, count } => {
                let start = at % (len + 1);
                deque.erase_range_at(start, (start + count).min(len))?;
            }
            Op::Remove { at } if len > 0 => {
                deque.remove(at % len)?;
            }
            Op::Set { at, value } if len > 0 => *deque.at_mut(at % len)? = value,
            Op::Remove { .. } | Op::Set { .. } => {}
            Op::Truncate { len } => deque.truncate(len),
            Op::Clear => deque.clear(),
            Op::ShrinkToFit => deque.shrink_to_fit()?,
        }
    }
    Ok(())
}
