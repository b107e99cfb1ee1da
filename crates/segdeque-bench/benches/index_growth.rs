//! Criterion benchmarks isolating index reshaping: how buffer length and
//! initial sizing change the cost of growth.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use segdeque::{Deque, DequeConfig};
use segdeque_bench::{build, Workload};

/// Benchmark: alternating fill of 100K elements at several buffer lengths.
fn bench_buffer_len(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_len");
    for k in [1usize, 4, 8, 64, 512] {
        let config = DequeConfig::with_buffer_len(k);
        group.bench_with_input(BenchmarkId::from_parameter(k), &config, |b, &config| {
            b.iter(|| black_box(build(Workload::Alternating, 100_000, config).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: pre-sized index against on-demand growth.
fn bench_presized(c: &mut Criterion) {
    c.bench_function("push_back_100k_presized", |b| {
        b.iter(|| {
            let mut deque = Deque::with_capacity(100_000).unwrap();
            for v in 0..100_000u64 {
                deque.push_back(v).unwrap();
            }
            black_box(deque.index_stats())
        });
    });
}

/// Benchmark: drain to a handful of buffers, then shrink the index.
fn bench_shrink(c: &mut Criterion) {
    c.bench_function("shrink_to_fit_after_drain", |b| {
        b.iter(|| {
            let mut deque =
                build(Workload::BackOnly, 50_000, DequeConfig::with_buffer_len(8)).unwrap();
            deque.truncate(10);
            deque.shrink_to_fit().unwrap();
            black_box(deque.index_capacity())
        });
    });
}

criterion_group!(benches, bench_buffer_len, bench_presized, bench_shrink);
criterion_main!(benches);
