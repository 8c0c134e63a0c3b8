//! Pools prepared with a known gap layout.
//!
//! [`pool_with_gaps`] carves the requested gap sizes out of a fresh pool in
//! order, separating consecutive gaps with one-byte allocated fences, then
//! frees the gap allocations. The result has exactly one gap per requested
//! size, at increasing addresses, with the gaps' node-heap slots in the
//! same order as the requested sizes.

use mempool_arena::{Pool, PoolError};
use mempool_core::{AllocHandle, AllocPolicy};

/// A pool whose gaps were laid out by [`pool_with_gaps`].
#[derive(Debug)]
pub struct GapFixture {
    pub pool: Pool,
    /// Fence allocations in address order; one after each gap.
    pub fences: Vec<AllocHandle>,
    /// Arena offset of each gap, in the order the sizes were given.
    pub gap_offsets: Vec<usize>,
}

impl GapFixture {
    /// Free every fence, which must coalesce the pool back to one gap.
    pub fn release(mut self) -> Result<Pool, PoolError> {
        for fence in self.fences.drain(..) {
            self.pool.free(fence)?;
        }
        Ok(self.pool)
    }
}

/// Build a pool whose only gaps have the given sizes.
///
/// The pool capacity is `sum(sizes) + sizes.len()`: every gap is followed
/// by a one-byte fence, so no two gaps are adjacent and none of them
/// coalesce.
pub fn pool_with_gaps(policy: AllocPolicy, sizes: &[usize]) -> Result<GapFixture, PoolError> {
    let capacity = sizes.iter().sum::<usize>() + sizes.len();
    let mut pool = Pool::new(capacity, policy)?;

    let mut gaps = Vec::with_capacity(sizes.len());
    let mut fences = Vec::with_capacity(sizes.len());
    let mut gap_offsets = Vec::with_capacity(sizes.len());
    let mut offset = 0;
    for &size in sizes {
        gaps.push(pool.allocate(size)?);
        gap_offsets.push(offset);
        fences.push(pool.allocate(1)?);
        offset += size + 1;
    }
    for gap in gaps {
        pool.free(gap)?;
    }
    Ok(GapFixture {
        pool,
        fences,
        gap_offsets,
    })
}
