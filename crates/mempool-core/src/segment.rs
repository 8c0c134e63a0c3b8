//! Point-in-time descriptions of pool contents.

use crate::policy::AllocPolicy;

/// One contiguous byte range of a pool's arena, as reported by inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Byte offset of the segment from the start of the arena.
    pub offset: usize,
    /// Length of the segment in bytes.
    pub size: usize,
    /// `true` for a live allocation, `false` for a gap.
    pub allocated: bool,
}

impl SegmentInfo {
    /// One past the last byte of the segment.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Aggregate counters of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    /// Arena capacity in bytes.
    pub capacity: usize,
    /// Bytes currently handed out to live allocations.
    pub allocated_bytes: usize,
    /// Number of live allocations.
    pub allocations: usize,
    /// Number of gaps (free segments).
    pub gaps: usize,
    /// Number of node-heap slots currently describing a segment.
    pub used_slots: usize,
    /// Placement policy of the pool.
    pub policy: AllocPolicy,
}

impl PoolStats {
    /// Bytes not held by any allocation.
    pub fn free_bytes(&self) -> usize {
        self.capacity - self.allocated_bytes
    }
}
