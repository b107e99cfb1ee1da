//! Reference-model testing.
//!
//! An [`Op`] is applied to both a [`Deque`] and a `VecDeque`; after any
//! sequence the two must hold the same elements. Positions inside an op
//! are seeds, reduced against the current length when applied, so every
//! generated sequence is valid whatever came before it.

use std::collections::VecDeque;

use proptest::prelude::*;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use segdeque::Deque;
use segdeque_core::{DequeError, SlotAllocator};

/// One mutation of a deque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    PushBack(i32),
    PushFront(i32),
    PopBack,
    PopFront,
    Insert { at: usize, value: i32 },
    InsertN { at: usize, count: usize, value: i32 },
    Erase { at: usize, count: usize },
    Remove { at: usize },
    Set { at: usize, value: i32 },
    Truncate { len: usize },
    Clear,
    ShrinkToFit,
}

/// Apply `op` to `deque` and, if that succeeds, to `model`.
///
/// Pops and removals also check that both sides yield the same value.
///
/// # Errors
///
/// Whatever the deque operation returned. `model` is then untouched, so
/// a caller can check that the deque is unchanged too.
pub fn apply_op<A: SlotAllocator>(
    deque: &mut Deque<i32, A>,
    model: &mut VecDeque<i32>,
    op: &Op,
) -> Result<(), DequeError> {
    let len = model.len();
    match *op {
        Op::PushBack(value) => {
            deque.push_back(value)?;
            model.push_back(value);
        }
        Op::PushFront(value) => {
            deque.push_front(value)?;
            model.push_front(value);
        }
        Op::PopBack => assert_eq!(deque.pop_back(), model.pop_back()),
        Op::PopFront => assert_eq!(deque.pop_front(), model.pop_front()),
        Op::Insert { at, value } => {
            let at = at % (len + 1);
            deque.insert_at(at, value)?;
            model.insert(at, value);
        }
        Op::InsertN { at, count, value } => {
            let at = at % (len + 1);
            deque.insert_n_at(at, count, value)?;
            for _ in 0..count {
                model.insert(at, value);
            }
        }
        Op::Erase { at, count } => {
            let start = at % (len + 1);
            let end = (start + count).min(len);
            deque.erase_range_at(start, end)?;
            model.drain(start..end);
        }
        Op::Remove { at } => {
            if len > 0 {
                let at = at % len;
                let removed = deque.remove(at)?;
                assert_eq!(Some(removed), model.remove(at));
            }
        }
        Op::Set { at, value } => {
            if len > 0 {
                let at = at % len;
                *deque.at_mut(at)? = value;
                model[at] = value;
            }
        }
        Op::Truncate { len } => {
            deque.truncate(len);
            model.truncate(len);
        }
        Op::Clear => {
            deque.clear();
            model.clear();
        }
        Op::ShrinkToFit => deque.shrink_to_fit()?,
    }
    Ok(())
}

/// Panic unless `deque` and `model` hold the same sequence, checked by
/// length, by index, and by iteration in both directions.
pub fn assert_matches_model<A: SlotAllocator>(deque: &Deque<i32, A>, model: &VecDeque<i32>) {
    assert_eq!(deque.len(), model.len(), "length differs from model");
    assert_eq!(deque.is_empty(), model.is_empty());
    for (i, expected) in model.iter().enumerate() {
        assert_eq!(deque.get(i), Some(expected), "element {i} differs");
    }
    assert_eq!(deque.get(model.len()), None);
    assert!(deque.iter().eq(model.iter()), "forward iteration differs");
    assert!(
        deque.iter().rev().eq(model.iter().rev()),
        "reverse iteration differs"
    );
    assert_eq!(deque.front(), model.front());
    assert_eq!(deque.back(), model.back());
    assert_eq!(deque.end() - deque.begin(), model.len() as isize);
}

/// Strategy producing ops weighted toward pushes so sequences grow.
pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::PushBack),
        4 => any::<i32>().prop_map(Op::PushFront),
        2 => Just(Op::PopBack),
        2 => Just(Op::PopFront),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(at, value)| Op::Insert { at, value }),
        1 => (any::<usize>(), 0usize..12, any::<i32>())
            .prop_map(|(at, count, value)| Op::InsertN { at, count, value }),
        1 => (any::<usize>(), 0usize..12).prop_map(|(at, count)| Op::Erase { at, count }),
        1 => any::<usize>().prop_map(|at| Op::Remove { at }),
        1 => (0usize..48).prop_map(|len| Op::Truncate { len }),
        1 => prop_oneof![
            (any::<usize>(), any::<i32>()).prop_map(|(at, value)| Op::Set { at, value }),
            Just(Op::Clear),
            Just(Op::ShrinkToFit),
        ],
    ]
}

/// A reproducible op sequence for soak tests and benchmarks.
pub fn seeded_ops(seed: u64, count: usize) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let value = rng.next_u32() as i32;
            let at = rng.next_u64() as usize;
            match rng.next_u32() % 20 {
                0..=4 => Op::PushBack(value),
                5..=9 => Op::PushFront(value),
                10 | 11 => Op::PopBack,
                12 | 13 => Op::PopFront,
                14 => Op::Insert { at, value },
                15 => Op::InsertN {
                    at,
                    count: (rng.next_u32() % 8) as usize,
                    value,
                },
                16 => Op::Erase {
                    at,
                    count: (rng.next_u32() % 8) as usize,
                },
                17 => Op::Remove { at },
                18 => Op::Set { at, value },
                _ if rng.next_u32() % 8 == 0 => Op::Clear,
                _ => Op::ShrinkToFit,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use segdeque_core::DequeConfig;

    #[test]
    fn seeded_ops_are_reproducible() {
        assert_eq!(seeded_ops(7, 200), seeded_ops(7, 200));
        assert_ne!(seeded_ops(7, 200), seeded_ops(8, 200));
    }

    #[test]
    fn seeded_sequence_matches_model() {
        let mut deque = Deque::with_config(DequeConfig::with_buffer_len(3)).unwrap();
        let mut model = VecDeque::new();
        for op in seeded_ops(42, 2_000) {
            apply_op(&mut deque, &mut model, &op).unwrap();
            assert_matches_model(&deque, &model);
        }
    }

    #[test]
    fn positions_wrap_against_length() {
        let mut deque = Deque::with_config(DequeConfig::with_buffer_len(2)).unwrap();
        let mut model = VecDeque::new();
        let ops = [
            Op::Insert { at: 99, value: 1 },
            Op::Remove { at: 5 },
            Op::Set { at: 3, value: 4 },
            Op::InsertN {
                at: 10,
                count: 3,
                value: 2,
            },
            Op::Erase { at: 7, count: 100 },
        ];
        for op in &ops {
            apply_op(&mut deque, &mut model, op).unwrap();
        }
        assert_matches_model(&deque, &model);
    }
}
