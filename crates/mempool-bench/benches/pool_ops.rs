//! Criterion micro-benchmarks for pool allocation and free paths.

use criterion::{criterion_group, criterion_main, Criterion};
use mempool_arena::{AllocPolicy, Pool, Registry};
use mempool_bench::{churn_script, run_script};
use mempool_test_utils::pool_with_gaps;
use std::hint::black_box;

const SEED: u64 = 0x5eed;

/// Benchmark: 10K-op churn on a 64 KiB pool, first-fit vs best-fit.
fn bench_churn(c: &mut Criterion) {
    let script = churn_script(SEED, 10_000, 256);
    let mut group = c.benchmark_group("churn_10k");
    for policy in [AllocPolicy::FirstFit, AllocPolicy::BestFit] {
        group.bench_function(policy.to_string(), |b| {
            b.iter(|| {
                let mut pool = Pool::new(64 * 1024, policy).unwrap();
                let placed = run_script(&mut pool, &script).unwrap();
                black_box(placed);
            });
        });
    }
    group.finish();
}

/// Benchmark: allocate then free one block in a pool with 1K gaps.
fn bench_alloc_free_fragmented(c: &mut Criterion) {
    let sizes: Vec<usize> = (0..1_000).map(|i| 8 + (i * 37) % 120).collect();
    let mut group = c.benchmark_group("alloc_free_1k_gaps");
    for policy in [AllocPolicy::FirstFit, AllocPolicy::BestFit] {
        let mut fx = pool_with_gaps(policy, &sizes).unwrap();
        group.bench_function(policy.to_string(), |b| {
            b.iter(|| {
                let h = fx.pool.allocate(black_box(100)).unwrap();
                fx.pool.free(h).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark: open and close 100 pools on one registry.
fn bench_open_close(c: &mut Criterion) {
    c.bench_function("registry_open_close_100", |b| {
        b.iter(|| {
            let mut reg = Registry::new();
            reg.init().unwrap();
            let ids: Vec<_> = (0..100)
                .map(|_| reg.open(1024, AllocPolicy::BestFit).unwrap())
                .collect();
            for id in ids {
                reg.close(id).unwrap();
            }
            reg.teardown().unwrap();
        });
    });
}

/// Benchmark: inspect a pool holding 1K gaps and 1K fences.
fn bench_inspect(c: &mut Criterion) {
    let sizes = vec![16; 1_000];
    let fx = pool_with_gaps(AllocPolicy::FirstFit, &sizes).unwrap();
    c.bench_function("inspect_2k_segments", |b| {
        b.iter(|| black_box(fx.pool.inspect()));
    });
}

criterion_group!(
    benches,
    bench_churn,
    bench_alloc_free_fragmented,
    bench_open_close,
    bench_inspect
);
criterion_main!(benches);
