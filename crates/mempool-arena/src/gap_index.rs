//! Size-sorted index of a pool's gaps.
//!
//! [`GapIndex`] holds one [`GapEntry`] per gap slot of the owning pool's
//! [`NodeHeap`], kept sorted by size ascending and, on equal size, by the
//! referenced slot's arena offset ascending. The first entry whose size is
//! at least N is therefore the best-fit gap for a request of N bytes.
//!
//! Entries reference node-heap slots by index. The index never owns or
//! moves slots; the pool removes an entry before the slot it references is
//! merged away or allocated.

use mempool_core::PoolError;

use crate::config::GrowthPolicy;
use crate::node_heap::NodeHeap;

/// A gap's size and the node-heap slot describing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapEntry {
    /// Size of the gap in bytes.
    pub size: usize,
    /// Node-heap slot describing the gap.
    pub slot: usize,
}

/// Sorted, growable collection of gap references for one pool.
#[derive(Debug)]
pub struct GapIndex {
    entries: Vec<GapEntry>,
    /// Logical capacity driving the growth policy.
    capacity: usize,
    growth: GrowthPolicy,
}

impl GapIndex {
    /// Create an empty index with room for `capacity` entries.
    pub fn new(capacity: usize, growth: GrowthPolicy) -> Result<Self, PoolError> {
        let capacity = capacity.max(1);
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|_| PoolError::ResourceExhausted {
                requested: capacity,
            })?;
        Ok(Self {
            entries,
            capacity,
            growth,
        })
    }

    /// Number of entries, equal to the pool's gap count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool has no gaps.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current logical capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries in sorted order.
    pub fn entries(&self) -> &[GapEntry] {
        &self.entries
    }

    /// Size of the largest gap, or 0 if there are none.
    pub fn largest(&self) -> usize {
        self.entries.last().map_or(0, |e| e.size)
    }

    /// Grow the backing storage if `occupied` entries exceed the fill factor.
    ///
    /// [`insert`](Self::insert) calls this with the current length. Callers
    /// that must not fail halfway through a multi-step update call it up
    /// front with the length the index will have at insertion time.
    pub fn reserve(&mut self, occupied: usize) -> Result<(), PoolError> {
        if !self.growth.should_grow(occupied, self.capacity) {
            return Ok(());
        }
        let old = self.capacity;
        let new = self.growth.grown(old);
        self.entries
            .try_reserve_exact(new.saturating_sub(self.entries.len()))
            .map_err(|_| PoolError::ResourceExhausted { requested: new })?;
        self.capacity = new;
        tracing::debug!(old, new, occupied, "gap index grown");
        Ok(())
    }

    /// Slot of the smallest gap of at least `size` bytes.
    pub fn best_fit(&self, size: usize) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.size >= size)
            .map(|entry| entry.slot)
    }

    /// Add the gap described by `slot`.
    ///
    /// Appends the entry, then bubbles it toward the front while it sorts
    /// before its predecessor.
    pub fn insert(&mut self, nodes: &NodeHeap, slot: usize) -> Result<(), PoolError> {
        self.reserve(self.entries.len())?;
        self.entries.push(GapEntry {
            size: nodes[slot].size,
            slot,
        });
        let mut i = self.entries.len() - 1;
        while i > 0 && Self::sorts_before(nodes, &self.entries[i], &self.entries[i - 1]) {
            self.entries.swap(i, i - 1);
            i -= 1;
        }
        Ok(())
    }

    /// Position of the entry referencing `slot`.
    ///
    /// A missing entry means the index and the node heap disagree, which
    /// is reported as `Inconsistent`.
    pub fn position(&self, slot: usize) -> Result<usize, PoolError> {
        self.entries
            .iter()
            .position(|entry| entry.slot == slot)
            .ok_or_else(|| PoolError::Inconsistent {
                reason: format!("gap index has no entry for slot {slot}"),
            })
    }

    /// Remove the entry at `pos`, as returned by [`position`](Self::position).
    ///
    /// Later entries shift down by one, so removing several entries must go
    /// from the highest position to the lowest.
    pub fn remove_at(&mut self, pos: usize) -> GapEntry {
        self.entries.remove(pos)
    }

    /// Remove the entry referencing `slot`.
    pub fn remove(&mut self, slot: usize) -> Result<GapEntry, PoolError> {
        let pos = self.position(slot)?;
        Ok(self.remove_at(pos))
    }

    /// Whether every adjacent pair is in (size, offset) order.
    pub fn is_sorted(&self, nodes: &NodeHeap) -> bool {
        self.entries
            .windows(2)
            .all(|pair| !Self::sorts_before(nodes, &pair[1], &pair[0]))
    }

    fn sorts_before(nodes: &NodeHeap, a: &GapEntry, b: &GapEntry) -> bool {
        (a.size, nodes[a.slot].offset) < (b.size, nodes[b.slot].offset)
    }
}
