//! Benchmark workloads for the mempool allocator.
//!
//! Provides deterministic allocate/free scripts for benchmarking:
//!
//! - [`churn_script`]: seeded mix of allocations and frees of random live blocks
//! - [`run_script`]: replay a script against a [`Pool`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mempool_arena::Pool;
use mempool_core::{AllocHandle, PoolError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a benchmark script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate this many bytes.
    Allocate(usize),
    /// Free the live allocation at this position, modulo the live count.
    Free(usize),
}

/// Build a churn script of `len` operations.
///
/// Roughly 60% of operations allocate between 1 and `max_size` bytes; the
/// rest free a randomly chosen live block. The same seed always produces
/// the same script.
pub fn churn_script(seed: u64, len: usize, max_size: usize) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.random_range(0..10u32) < 6 {
                Op::Allocate(rng.random_range(1..=max_size.max(1)))
            } else {
                Op::Free(rng.random_range(0..usize::MAX))
            }
        })
        .collect()
}

/// Replay `script` against `pool`, then free everything still live.
///
/// Allocations that fail with `NoSpace` are skipped, which is the expected
/// outcome once the pool fragments. Returns the number of allocations that
/// succeeded.
pub fn run_script(pool: &mut Pool, script: &[Op]) -> Result<usize, PoolError> {
    let mut live: Vec<AllocHandle> = Vec::new();
    let mut placed = 0;
    for op in script {
        match *op {
            Op::Allocate(size) => match pool.allocate(size) {
                Ok(handle) => {
                    live.push(handle);
                    placed += 1;
                }
                Err(PoolError::NoSpace { .. }) => {}
                Err(e) => return Err(e),
            },
            Op::Free(pick) => {
                if !live.is_empty() {
                    let handle = live.swap_remove(pick % live.len());
                    pool.free(handle)?;
                }
            }
        }
    }
    for handle in live {
        pool.free(handle)?;
    }
    Ok(placed)
}
