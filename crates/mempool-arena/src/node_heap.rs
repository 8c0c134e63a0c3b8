//! Segment-descriptor slots and their address-ordered chain.
//!
//! A [`NodeHeap`] is a growable table of [`Node`] slots. Every used slot
//! describes one contiguous byte range of the arena, either a live
//! allocation or a gap. Used slots are linked through `prev`/`next` slot
//! indices in ascending address order; together they partition the arena.
//!
//! Links are slot indices, never references, so growing the table (which
//! may move every slot) leaves the chain and any gap-index entry intact.
//!
//! Slots are not deleted when two gaps merge. The absorbed slot is cleared
//! back to unused and becomes the first candidate of the next
//! [`unused_slot`](NodeHeap::unused_slot) search.

use mempool_core::{AllocHandle, PoolError, PoolSerial};

use crate::config::GrowthPolicy;

/// Slot 0 always describes offset 0: it is the initial gap, splits only
/// append after it, and merges only ever absorb a slot into its predecessor.
pub const HEAD: usize = 0;

/// One node-heap slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Node {
    /// Byte offset of the described range within the arena.
    pub offset: usize,
    /// Length of the described range in bytes.
    pub size: usize,
    /// Whether the slot currently describes a segment.
    pub used: bool,
    /// Live allocation (`true`) or gap (`false`). Meaningless when unused.
    pub allocated: bool,
    /// Previous used slot in address order.
    pub prev: Option<usize>,
    /// Next used slot in address order.
    pub next: Option<usize>,
    /// Bumped each time an allocation held in this slot is freed.
    pub generation: u32,
}

impl Node {
    /// Whether the slot is a gap.
    pub fn is_gap(&self) -> bool {
        self.used && !self.allocated
    }

    /// Return the slot to the unused state, keeping its generation.
    fn clear(&mut self) {
        *self = Node {
            generation: self.generation,
            ..Node::default()
        };
    }
}

/// Growable table of segment-descriptor slots for one pool.
#[derive(Debug)]
pub struct NodeHeap {
    slots: Vec<Node>,
    used: usize,
    growth: GrowthPolicy,
    owner: PoolSerial,
}

impl NodeHeap {
    /// Create a heap of `capacity` slots whose head slot is a single gap
    /// spanning `arena_len` bytes.
    ///
    /// Every heap draws a fresh [`PoolSerial`]; handles it issues carry it.
    pub fn new(arena_len: usize, capacity: usize, growth: GrowthPolicy) -> Result<Self, PoolError> {
        let capacity = capacity.max(1);
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| PoolError::ResourceExhausted {
                requested: capacity,
            })?;
        slots.resize(capacity, Node::default());
        slots[HEAD] = Node {
            offset: 0,
            size: arena_len,
            used: true,
            allocated: false,
            prev: None,
            next: None,
            generation: 0,
        };
        Ok(Self {
            slots,
            used: 1,
            growth,
            owner: PoolSerial::next(),
        })
    }

    /// Serial stamped into every handle this heap issues.
    pub fn owner(&self) -> PoolSerial {
        self.owner
    }

    /// Total number of slots, used or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of used slots.
    pub fn used(&self) -> usize {
        self.used
    }

    /// The slot at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.slots.get(index)
    }

    /// All slots in storage order.
    pub fn slots(&self) -> &[Node] {
        &self.slots
    }

    /// Double the slot table when more than the fill factor is in use.
    ///
    /// Called before every allocation search so that a split always finds
    /// an unused slot. New slots are unused.
    pub fn grow_if_needed(&mut self) -> Result<(), PoolError> {
        let old = self.slots.len();
        if !self.growth.should_grow(self.used, old) {
            return Ok(());
        }
        let new = self.growth.grown(old);
        // Handles carry the slot index as u32.
        if new > u32::MAX as usize {
            return Err(PoolError::ResourceExhausted { requested: new });
        }
        self.slots
            .try_reserve_exact(new - old)
            .map_err(|_| PoolError::ResourceExhausted { requested: new })?;
        self.slots.resize(new, Node::default());
        tracing::debug!(old, new, used = self.used, "node heap grown");
        Ok(())
    }

    /// First gap of at least `size` bytes in storage order.
    pub fn first_fit(&self, size: usize) -> Option<usize> {
        self.slots
            .iter()
            .position(|node| node.is_gap() && node.size >= size)
    }

    /// Lowest-indexed unused slot.
    pub fn unused_slot(&self) -> Option<usize> {
        self.slots.iter().position(|node| !node.used)
    }

    /// Resolve an allocation handle to its slot index.
    ///
    /// Fails with `InvalidHandle` unless the handle was issued by this
    /// heap, the slot exists, holds a live allocation, and is still at the
    /// handle's generation.
    pub fn resolve(&self, handle: AllocHandle) -> Result<usize, PoolError> {
        if handle.pool() != self.owner {
            return Err(PoolError::InvalidHandle);
        }
        let index = handle.slot() as usize;
        match self.slots.get(index) {
            Some(node)
                if node.used && node.allocated && node.generation == handle.generation() =>
            {
                Ok(index)
            }
            _ => Err(PoolError::InvalidHandle),
        }
    }

    /// Handle for the allocation currently held in `index`.
    pub fn handle(&self, index: usize) -> AllocHandle {
        AllocHandle::new(self.owner, index as u32, self.slots[index].generation)
    }

    /// Turn the gap at `index` into an allocation of exactly `size` bytes.
    ///
    /// When the gap was larger, `spare` (an unused slot) becomes a new gap
    /// holding the remainder, linked directly after `index`. Returns the
    /// remainder slot if one was created.
    pub fn split(
        &mut self,
        index: usize,
        size: usize,
        spare: Option<usize>,
    ) -> Result<Option<usize>, PoolError> {
        let node = self.slots[index];
        let remainder = node.size - size;
        if remainder == 0 {
            self.slots[index].allocated = true;
            return Ok(None);
        }
        let spare = match spare {
            Some(spare) if !self.slots[spare].used => spare,
            _ => {
                return Err(PoolError::Inconsistent {
                    reason: format!("no unused slot for the remainder of slot {index}"),
                })
            }
        };
        self.slots[index].size = size;
        self.slots[index].allocated = true;
        self.slots[spare] = Node {
            offset: node.offset + size,
            size: remainder,
            used: true,
            allocated: false,
            prev: Some(index),
            next: node.next,
            generation: self.slots[spare].generation,
        };
        if let Some(next) = node.next {
            self.slots[next].prev = Some(spare);
        }
        self.slots[index].next = Some(spare);
        self.used += 1;
        Ok(Some(spare))
    }

    /// Turn the allocation at `index` back into a gap.
    ///
    /// Advances the slot generation so outstanding handles go stale.
    pub fn release(&mut self, index: usize) {
        let node = &mut self.slots[index];
        node.allocated = false;
        node.generation = node.generation.wrapping_add(1);
    }

    /// The successor of `index` in address order, if it is a gap.
    pub fn next_gap(&self, index: usize) -> Option<usize> {
        self.slots[index]
            .next
            .filter(|&next| self.slots[next].is_gap())
    }

    /// The predecessor of `index` in address order, if it is a gap.
    pub fn prev_gap(&self, index: usize) -> Option<usize> {
        self.slots[index]
            .prev
            .filter(|&prev| self.slots[prev].is_gap())
    }

    /// Merge the successor of `index` into `index`.
    ///
    /// The successor's bytes are added to `index`, the successor is
    /// unlinked and cleared back to unused. Returns the absorbed slot.
    pub fn absorb_next(&mut self, index: usize) -> Result<usize, PoolError> {
        let absorbed = self.slots[index]
            .next
            .ok_or_else(|| PoolError::Inconsistent {
                reason: format!("slot {index} has no successor to absorb"),
            })?;
        let victim = self.slots[absorbed];
        self.slots[index].size += victim.size;
        self.slots[index].next = victim.next;
        if let Some(after) = victim.next {
            self.slots[after].prev = Some(index);
        }
        self.slots[absorbed].clear();
        self.used -= 1;
        Ok(absorbed)
    }

    /// Iterate used slots in address order, starting at the head.
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            heap: self,
            cursor: Some(HEAD),
        }
    }
}

impl std::ops::Index<usize> for NodeHeap {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.slots[index]
    }
}

/// Address-order iterator over used slots; yields `(slot, node)`.
#[derive(Debug)]
pub struct Chain<'a> {
    heap: &'a NodeHeap,
    cursor: Option<usize>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.heap.slots.get(index)?;
        self.cursor = node.next;
        Some((index, node))
    }
}
