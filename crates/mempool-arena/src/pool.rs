//! A single fixed-capacity arena and its allocation bookkeeping.
//!
//! A [`Pool`] owns one zero-initialised byte arena, the [`NodeHeap`] that
//! partitions it into allocations and gaps, and the [`GapIndex`] used for
//! best-fit search. The aggregate counters kept here always equal the sums
//! derivable from the node heap; [`Pool::validate`] re-derives them.
//!
//! Every fallible storage growth an operation can need is reserved before
//! the operation mutates anything, so a `ResourceExhausted` failure leaves
//! the pool exactly as it was.

use mempool_core::{AllocHandle, AllocPolicy, PoolError, PoolSerial, PoolStats, SegmentInfo};

use crate::config::PoolConfig;
use crate::gap_index::{GapEntry, GapIndex};
use crate::node_heap::{NodeHeap, HEAD};

/// A fixed-capacity arena carved into variable-size allocations.
///
/// Not synchronised: every mutation takes `&mut self`. Sharing a pool
/// across threads requires an external lock chosen by the caller.
#[derive(Debug)]
pub struct Pool {
    arena: Vec<u8>,
    nodes: NodeHeap,
    gaps: GapIndex,
    policy: AllocPolicy,
    allocated_bytes: usize,
    allocations: usize,
}

impl Pool {
    /// Open a pool of `capacity` bytes with default table sizing.
    pub fn new(capacity: usize, policy: AllocPolicy) -> Result<Self, PoolError> {
        Self::with_config(capacity, policy, PoolConfig::default())
    }

    /// Open a pool of `capacity` bytes.
    ///
    /// The whole arena starts as a single gap. Fails with
    /// `ResourceExhausted` if the arena or either table cannot be
    /// allocated; nothing acquired by the call outlives the failure.
    pub fn with_config(
        capacity: usize,
        policy: AllocPolicy,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        let mut arena = Vec::new();
        arena
            .try_reserve_exact(capacity)
            .map_err(|_| PoolError::ResourceExhausted {
                requested: capacity,
            })?;
        arena.resize(capacity, 0);
        let nodes = NodeHeap::new(capacity, config.node_heap_capacity, config.growth)?;
        let mut gaps = GapIndex::new(config.gap_index_capacity, config.growth)?;
        gaps.insert(&nodes, HEAD)?;
        Ok(Self {
            arena,
            nodes,
            gaps,
            policy,
            allocated_bytes: 0,
            allocations: 0,
        })
    }

    /// Carve an allocation of `size` bytes out of a gap.
    ///
    /// The gap is chosen by the pool's policy. Any remainder of the chosen
    /// gap stays behind as a new gap directly after the allocation.
    pub fn allocate(&mut self, size: usize) -> Result<AllocHandle, PoolError> {
        if self.gaps.is_empty() {
            return Err(PoolError::NoSpace {
                requested: size,
                largest_gap: 0,
            });
        }
        self.nodes.grow_if_needed()?;

        let candidate = match self.policy {
            AllocPolicy::FirstFit => self.nodes.first_fit(size),
            AllocPolicy::BestFit => self.gaps.best_fit(size),
        };
        let Some(candidate) = candidate else {
            return Err(PoolError::NoSpace {
                requested: size,
                largest_gap: self.gaps.largest(),
            });
        };

        let remainder = self.nodes[candidate].size - size;
        let spare = if remainder != 0 {
            let spare = self
                .nodes
                .unused_slot()
                .ok_or(PoolError::ResourceExhausted {
                    requested: self.nodes.used() + 1,
                })?;
            // The candidate's entry leaves before the remainder's arrives.
            self.gaps.reserve(self.gaps.len() - 1)?;
            Some(spare)
        } else {
            None
        };

        self.gaps.remove(candidate)?;
        self.nodes.split(candidate, size, spare)?;
        self.allocations += 1;
        self.allocated_bytes += size;
        if let Some(spare) = spare {
            self.gaps.insert(&self.nodes, spare)?;
        }

        tracing::trace!(
            size,
            offset = self.nodes[candidate].offset,
            remainder,
            policy = %self.policy,
            "allocated"
        );
        Ok(self.nodes.handle(candidate))
    }

    /// Return an allocation to the pool, merging it with adjacent gaps.
    ///
    /// A following gap is merged into the freed segment first, then the
    /// result is merged into a preceding gap. Exactly one gap entry is
    /// added for whatever segment remains.
    pub fn free(&mut self, handle: AllocHandle) -> Result<(), PoolError> {
        let slot = self.nodes.resolve(handle)?;
        let size = self.nodes[slot].size;
        let next = self.nodes.next_gap(slot);
        let prev = self.nodes.prev_gap(slot);

        // Both entries are located before either is removed.
        let next_pos = next
            .map(|next| {
                self.gaps.position(next).inspect_err(|e| {
                    tracing::warn!(
                        slot = next,
                        error = %e,
                        "forward merge found no gap entry"
                    );
                })
            })
            .transpose()?;
        let prev_pos = prev
            .map(|prev| {
                self.gaps.position(prev).inspect_err(|e| {
                    tracing::warn!(
                        slot = prev,
                        error = %e,
                        "backward merge found no gap entry"
                    );
                })
            })
            .transpose()?;

        let merges = usize::from(next.is_some()) + usize::from(prev.is_some());
        self.gaps.reserve(self.gaps.len().saturating_sub(merges))?;
        let mut doomed = [next_pos, prev_pos];
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for pos in doomed.into_iter().flatten() {
            self.gaps.remove_at(pos);
        }

        self.nodes.release(slot);
        self.allocations -= 1;
        self.allocated_bytes -= size;

        let mut merged = slot;
        if next.is_some() {
            self.nodes.absorb_next(slot)?;
        }
        if let Some(prev) = prev {
            self.nodes.absorb_next(prev)?;
            merged = prev;
        }
        self.gaps.insert(&self.nodes, merged)?;

        tracing::trace!(
            size,
            merged_size = self.nodes[merged].size,
            forward = next.is_some(),
            backward = prev.is_some(),
            "freed"
        );
        Ok(())
    }

    /// Describe every segment in address order.
    ///
    /// The returned vector is a snapshot; its length equals the number of
    /// used node-heap slots.
    pub fn inspect(&self) -> Vec<SegmentInfo> {
        let mut segments = Vec::with_capacity(self.nodes.used());
        segments.extend(self.nodes.chain().map(|(_, node)| SegmentInfo {
            offset: node.offset,
            size: node.size,
            allocated: node.allocated,
        }));
        segments
    }

    /// Aggregate counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.arena.len(),
            allocated_bytes: self.allocated_bytes,
            allocations: self.allocations,
            gaps: self.gaps.len(),
            used_slots: self.nodes.used(),
            policy: self.policy,
        }
    }

    /// Gaps as `(size, offset)` pairs in gap-index order.
    pub fn gaps(&self) -> Vec<(usize, usize)> {
        self.gaps
            .entries()
            .iter()
            .map(|entry| (entry.size, self.nodes[entry.slot].offset))
            .collect()
    }

    /// Process-unique serial carried by every handle this pool issues.
    pub fn serial(&self) -> PoolSerial {
        self.nodes.owner()
    }

    /// Placement policy fixed at open time.
    pub fn policy(&self) -> AllocPolicy {
        self.policy
    }

    /// Arena capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Whether the pool is back to a single gap covering the whole arena.
    pub fn is_pristine(&self) -> bool {
        self.allocations == 0 && self.gaps.len() == 1
    }

    /// Current node-heap slot count (used and unused).
    pub fn node_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Current gap-index capacity.
    pub fn gap_capacity(&self) -> usize {
        self.gaps.capacity()
    }

    /// Where a live allocation sits in the arena.
    pub fn segment(&self, handle: AllocHandle) -> Result<SegmentInfo, PoolError> {
        let node = &self.nodes[self.nodes.resolve(handle)?];
        Ok(SegmentInfo {
            offset: node.offset,
            size: node.size,
            allocated: true,
        })
    }

    /// The arena bytes of a live allocation.
    pub fn bytes(&self, handle: AllocHandle) -> Result<&[u8], PoolError> {
        let slot = self.nodes.resolve(handle)?;
        let node = &self.nodes[slot];
        Ok(&self.arena[node.offset..node.offset + node.size])
    }

    /// The arena bytes of a live allocation, mutably.
    pub fn bytes_mut(&mut self, handle: AllocHandle) -> Result<&mut [u8], PoolError> {
        let slot = self.nodes.resolve(handle)?;
        let (offset, size) = (self.nodes[slot].offset, self.nodes[slot].size);
        Ok(&mut self.arena[offset..offset + size])
    }

    /// Check every bookkeeping invariant from scratch.
    ///
    /// Verifies that the chain partitions the arena, that the counters
    /// match the chain, that the gap index holds exactly one correctly
    /// sized entry per gap, and that it is sorted.
    pub fn validate(&self) -> Result<(), PoolError> {
        let fail = |reason: String| Err(PoolError::Inconsistent { reason });

        let mut expected_offset = 0;
        let mut prev = None;
        let mut chain_len = 0;
        let mut allocated_bytes = 0;
        let mut allocations = 0;
        let mut gaps = 0;
        for (slot, node) in self.nodes.chain() {
            if !node.used {
                return fail(format!("unused slot {slot} is linked into the chain"));
            }
            if node.prev != prev {
                return fail(format!("slot {slot} has a broken back link"));
            }
            if node.offset != expected_offset {
                return fail(format!(
                    "slot {slot} starts at {} but the previous segment ends at {expected_offset}",
                    node.offset
                ));
            }
            if node.allocated {
                allocations += 1;
                allocated_bytes += node.size;
            } else {
                gaps += 1;
            }
            expected_offset += node.size;
            prev = Some(slot);
            chain_len += 1;
            if chain_len > self.nodes.capacity() {
                return fail("chain contains a cycle".to_string());
            }
        }

        if expected_offset != self.arena.len() {
            return fail(format!(
                "segments cover {expected_offset} bytes of a {}-byte arena",
                self.arena.len()
            ));
        }
        let used = self.nodes.slots().iter().filter(|n| n.used).count();
        if chain_len != used || used != self.nodes.used() {
            return fail(format!(
                "chain has {chain_len} segments, {used} slots are used, counter says {}",
                self.nodes.used()
            ));
        }
        if allocations != self.allocations || allocated_bytes != self.allocated_bytes {
            return fail(format!(
                "counters say {} allocations / {} bytes, chain has {allocations} / {allocated_bytes}",
                self.allocations, self.allocated_bytes
            ));
        }
        if gaps != self.gaps.len() {
            return fail(format!(
                "chain has {gaps} gaps, gap index has {} entries",
                self.gaps.len()
            ));
        }
        for &GapEntry { size, slot } in self.gaps.entries() {
            match self.nodes.get(slot) {
                Some(node) if node.is_gap() && node.size == size => {}
                _ => return fail(format!("gap entry for slot {slot} is stale")),
            }
        }
        let mut referenced: Vec<usize> = self.gaps.entries().iter().map(|e| e.slot).collect();
        referenced.sort_unstable();
        referenced.dedup();
        if referenced.len() != self.gaps.len() {
            return fail("gap index references a slot twice".to_string());
        }
        if !self.gaps.is_sorted(&self.nodes) {
            return fail("gap index is out of order".to_string());
        }
        Ok(())
    }
}
