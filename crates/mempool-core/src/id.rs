//! Strongly-typed pool and allocation handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies an open pool within a registry.
///
/// Pools are assigned sequential IDs as they are opened. IDs are never
/// reused: closing a pool leaves its registry slot empty, so a `PoolId`
/// that outlives its pool resolves to nothing rather than to a newer pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub u32);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PoolId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`PoolSerial`] allocation.
static POOL_SERIAL_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one pool instance.
///
/// Allocated from a monotonic atomic counter via [`PoolSerial::next`].
/// Unlike [`PoolId`], which is only unique within one registry, two pools
/// never share a serial, whether they live in different registries or were
/// built standalone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolSerial(u64);

impl PoolSerial {
    /// Allocate a fresh, unique serial.
    ///
    /// Each call returns a value never returned before within this
    /// process. Thread-safe.
    pub fn next() -> Self {
        Self(POOL_SERIAL_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Refers to one live allocation inside a pool.
///
/// Encodes the serial of the issuing pool, the node-heap slot describing
/// the allocation, and that slot's generation at allocation time. A pool
/// rejects handles carrying another pool's serial. The slot's generation
/// advances when the allocation is freed, so a handle kept past its `free`
/// no longer resolves and is reported as invalid instead of aliasing
/// whatever reuses the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct AllocHandle {
    pool: PoolSerial,
    slot: u32,
    generation: u32,
}

impl AllocHandle {
    /// Create a handle from its raw parts.
    ///
    /// Handles are normally obtained from an allocate call; constructing
    /// one by hand is only useful for tests and foreign bindings.
    pub fn new(pool: PoolSerial, slot: u32, generation: u32) -> Self {
        Self {
            pool,
            slot,
            generation,
        }
    }

    /// Serial of the pool that issued this handle.
    pub fn pool(&self) -> PoolSerial {
        self.pool
    }

    /// Index of the node-heap slot describing this allocation.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation of the slot when the allocation was made.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for AllocHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AllocHandle(pool={}, slot={}, gen={})",
            self.pool, self.slot, self.generation
        )
    }
}
