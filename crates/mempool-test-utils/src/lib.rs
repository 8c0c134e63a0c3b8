//! Test utilities for mempool development.
//!
//! Provides [`assert_invariants`] for checking a pool after every step of a
//! scenario, and the fixtures in [`fixtures`] for building pools whose gaps
//! sit at known sizes, addresses and node-heap slots.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use mempool_arena::Pool;

pub use fixtures::{pool_with_gaps, GapFixture};

/// Panic with a readable message unless every pool invariant holds.
///
/// Runs [`Pool::validate`] and additionally cross-checks the inspection
/// snapshot against the aggregate counters.
#[track_caller]
pub fn assert_invariants(pool: &Pool) {
    if let Err(e) = pool.validate() {
        panic!("pool invariant violated: {e}\nsegments: {:?}", pool.inspect());
    }
    let stats = pool.stats();
    let segments = pool.inspect();
    assert_eq!(segments.len(), stats.used_slots, "one segment per used slot");
    assert_eq!(
        segments.iter().map(|s| s.size).sum::<usize>(),
        stats.capacity,
        "segments cover the arena"
    );
    assert_eq!(
        segments.iter().filter(|s| !s.allocated).count(),
        stats.gaps,
        "gap counter matches segments"
    );
    let mut sorted = pool.gaps();
    sorted.sort_unstable();
    assert_eq!(pool.gaps(), sorted, "gap index sorted by (size, offset)");
}

/// The `(size, allocated)` pairs of a pool in address order.
pub fn layout(pool: &Pool) -> Vec<(usize, bool)> {
    pool.inspect()
        .iter()
        .map(|s| (s.size, s.allocated))
        .collect()
}
