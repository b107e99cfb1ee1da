//! Sliding-window maximum over a stream.
//!
//! Demonstrates: monotonic deque of indices → push at the back, pop from
//! both ends → cursor walk over the final window → index statistics.

use segdeque::{Deque, DequeConfig};

const WINDOW: usize = 50;

fn main() {
    println!("=== segdeque sliding window example ===\n");

    let samples: Vec<u64> = (0..10_000u64)
        .map(|i| i.wrapping_mul(2_654_435_761) % 1_000)
        .collect();

    // Indices of samples in decreasing value order; the front is the max.
    let mut candidates: Deque<usize> = Deque::with_config(DequeConfig::with_buffer_len(16)).unwrap();
    let mut maxima = Vec::with_capacity(samples.len());

    for (i, &value) in samples.iter().enumerate() {
        while candidates.back().is_some_and(|&j| samples[j] <= value) {
            candidates.pop_back();
        }
        candidates.push_back(i).unwrap();
        if candidates.front().is_some_and(|&j| j + WINDOW <= i) {
            candidates.pop_front();
        }
        if i + 1 >= WINDOW {
            if let Some(&j) = candidates.front() {
                maxima.push(samples[j]);
            }
        }
    }

    println!("windows evaluated: {}", maxima.len());
    println!("first maxima: {:?}", &maxima[..10]);

    let mut cursor = candidates.begin();
    let mut window = Vec::new();
    while cursor != candidates.end() {
        if let Ok(&j) = candidates.get_at(cursor) {
            window.push(samples[j]);
        }
        cursor.inc();
    }
    println!("final candidate values: {window:?}");

    let stats = candidates.index_stats();
    println!(
        "\nindex: capacity {}, {} buffers, {} regrows, {} recenters",
        candidates.index_capacity(),
        candidates.buffer_count(),
        stats.regrows,
        stats.recenters
    );
}
