//! The pool registry: an explicitly owned table of open pools.
//!
//! A [`Registry`] starts uninitialized. [`init`](Registry::init) allocates
//! its handle table, [`teardown`](Registry::teardown) releases it again and
//! refuses while any pool is still open. Each registry is independent, so
//! tests and embedders can run as many as they like side by side.
//!
//! The handle table only ever appends. Closing a pool empties its slot but
//! never compacts or reuses it, so a [`PoolId`] always names the pool it was
//! issued for (or nothing, once that pool is closed).

use mempool_core::{AllocHandle, AllocPolicy, PoolError, PoolId, PoolStats, SegmentInfo};

use crate::config::RegistryConfig;
use crate::pool::Pool;

/// Append-only table of optional pools with a logical capacity.
#[derive(Debug)]
struct PoolTable {
    pools: Vec<Option<Pool>>,
    capacity: usize,
}

/// Owner of every open pool.
///
/// Not synchronised. Wrap it in a `Mutex` to share it between threads.
#[derive(Debug)]
pub struct Registry {
    config: RegistryConfig,
    table: Option<PoolTable>,
}

impl Registry {
    /// Create an uninitialized registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an uninitialized registry.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            table: None,
        }
    }

    /// Configuration the registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Whether [`init`](Self::init) has been called without a matching
    /// [`teardown`](Self::teardown).
    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Allocate the pool handle table.
    pub fn init(&mut self) -> Result<(), PoolError> {
        if self.table.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }
        let capacity = self.config.pool_table_capacity.max(1);
        let mut pools = Vec::new();
        pools
            .try_reserve_exact(capacity)
            .map_err(|_| PoolError::ResourceExhausted {
                requested: capacity,
            })?;
        self.table = Some(PoolTable { pools, capacity });
        tracing::debug!(capacity, "registry initialized");
        Ok(())
    }

    /// Release the handle table. Every pool must already be closed.
    pub fn teardown(&mut self) -> Result<(), PoolError> {
        let table = self.table.as_ref().ok_or(PoolError::AlreadyTornDown)?;
        let open_pools = table.pools.iter().flatten().count();
        if open_pools != 0 {
            return Err(PoolError::NotEmpty { open_pools });
        }
        self.table = None;
        tracing::debug!("registry torn down");
        Ok(())
    }

    /// Open a new pool of `capacity` bytes under `policy`.
    ///
    /// The pool is fully built before the handle table grows, so a failure
    /// at any step leaves the registry unchanged.
    pub fn open(&mut self, capacity: usize, policy: AllocPolicy) -> Result<PoolId, PoolError> {
        let growth = self.config.growth;
        let pool_config = self.config.pool;
        let table = self.table.as_mut().ok_or(PoolError::Uninitialized)?;

        let pool = Pool::with_config(capacity, policy, pool_config)?;
        let index = table.pools.len();
        let id = u32::try_from(index)
            .map(PoolId)
            .map_err(|_| PoolError::ResourceExhausted { requested: index })?;

        if growth.should_grow(index, table.capacity) {
            let old = table.capacity;
            let new = growth.grown(old);
            table
                .pools
                .try_reserve_exact(new.saturating_sub(index))
                .map_err(|_| PoolError::ResourceExhausted { requested: new })?;
            table.capacity = new;
            tracing::debug!(old, new, "pool table grown");
        }
        table.pools.push(Some(pool));

        tracing::debug!(pool = %id, capacity, %policy, "pool opened");
        Ok(id)
    }

    /// Close a pool and release its arena.
    ///
    /// Fails with `NotFree`, leaving the pool open and untouched, unless it
    /// has no live allocations and a single gap.
    pub fn close(&mut self, id: PoolId) -> Result<(), PoolError> {
        let table = self.table.as_mut().ok_or(PoolError::Uninitialized)?;
        let slot = table
            .pools
            .get_mut(id.0 as usize)
            .ok_or(PoolError::InvalidHandle)?;
        let pool = slot.as_ref().ok_or(PoolError::InvalidHandle)?;
        if !pool.is_pristine() {
            let stats = pool.stats();
            return Err(PoolError::NotFree {
                allocations: stats.allocations,
                gaps: stats.gaps,
            });
        }
        *slot = None;
        tracing::debug!(pool = %id, "pool closed");
        Ok(())
    }

    /// Borrow an open pool.
    pub fn pool(&self, id: PoolId) -> Result<&Pool, PoolError> {
        let table = self.table.as_ref().ok_or(PoolError::Uninitialized)?;
        table
            .pools
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PoolError::InvalidHandle)
    }

    /// Mutably borrow an open pool.
    pub fn pool_mut(&mut self, id: PoolId) -> Result<&mut Pool, PoolError> {
        let table = self.table.as_mut().ok_or(PoolError::Uninitialized)?;
        table
            .pools
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PoolError::InvalidHandle)
    }

    /// Logical capacity of the pool handle table, or `None` before
    /// [`init`](Self::init).
    pub fn table_capacity(&self) -> Option<usize> {
        self.table.as_ref().map(|t| t.capacity)
    }

    /// Number of pools currently open.
    pub fn open_pools(&self) -> usize {
        self.table
            .as_ref()
            .map_or(0, |t| t.pools.iter().flatten().count())
    }

    /// Allocate `size` bytes from pool `id`.
    pub fn allocate(&mut self, id: PoolId, size: usize) -> Result<AllocHandle, PoolError> {
        self.pool_mut(id)?.allocate(size)
    }

    /// Free an allocation of pool `id`.
    pub fn free(&mut self, id: PoolId, handle: AllocHandle) -> Result<(), PoolError> {
        self.pool_mut(id)?.free(handle)
    }

    /// Snapshot the segments of pool `id` in address order.
    pub fn inspect(&self, id: PoolId) -> Result<Vec<SegmentInfo>, PoolError> {
        Ok(self.pool(id)?.inspect())
    }

    /// Aggregate counters of pool `id`.
    pub fn stats(&self, id: PoolId) -> Result<PoolStats, PoolError> {
        Ok(self.pool(id)?.stats())
    }

    /// Bytes of an allocation in pool `id`.
    pub fn bytes(&self, id: PoolId, handle: AllocHandle) -> Result<&[u8], PoolError> {
        self.pool(id)?.bytes(handle)
    }

    /// Bytes of an allocation in pool `id`, mutably.
    pub fn bytes_mut(&mut self, id: PoolId, handle: AllocHandle) -> Result<&mut [u8], PoolError> {
        self.pool_mut(id)?.bytes_mut(handle)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> Registry {
        let mut reg = Registry::new();
        reg.init().unwrap();
        reg
    }

    #[test]
    fn init_twice_fails() {
        let mut reg = ready();
        assert_eq!(reg.init(), Err(PoolError::AlreadyInitialized));
    }

    #[test]
    fn teardown_without_init_fails() {
        let mut reg = Registry::new();
        assert_eq!(reg.teardown(), Err(PoolError::AlreadyTornDown));
        reg.init().unwrap();
        reg.teardown().unwrap();
        assert_eq!(reg.teardown(), Err(PoolError::AlreadyTornDown));
    }

    #[test]
    fn open_requires_init() {
        let mut reg = Registry::new();
        assert_eq!(
            reg.open(64, AllocPolicy::FirstFit),
            Err(PoolError::Uninitialized)
        );
    }

    #[test]
    fn teardown_refuses_open_pools() {
        let mut reg = ready();
        let id = reg.open(64, AllocPolicy::BestFit).unwrap();
        assert_eq!(reg.teardown(), Err(PoolError::NotEmpty { open_pools: 1 }));
        reg.close(id).unwrap();
        reg.teardown().unwrap();
        assert!(!reg.is_initialized());
    }

    #[test]
    fn close_refuses_live_allocations() {
        let mut reg = ready();
        let id = reg.open(64, AllocPolicy::FirstFit).unwrap();
        let h = reg.allocate(id, 8).unwrap();
        let before = reg.inspect(id).unwrap();
        assert_eq!(
            reg.close(id),
            Err(PoolError::NotFree {
                allocations: 1,
                gaps: 1
            })
        );
        assert_eq!(reg.inspect(id).unwrap(), before);
        reg.free(id, h).unwrap();
        reg.close(id).unwrap();
    }

    #[test]
    fn closed_pool_handle_is_invalid() {
        let mut reg = ready();
        let id = reg.open(16, AllocPolicy::FirstFit).unwrap();
        reg.close(id).unwrap();
        assert_eq!(reg.close(id), Err(PoolError::InvalidHandle));
        assert_eq!(reg.allocate(id, 1), Err(PoolError::InvalidHandle));
        assert_eq!(reg.inspect(id), Err(PoolError::InvalidHandle));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut reg = ready();
        let a = reg.open(16, AllocPolicy::FirstFit).unwrap();
        reg.close(a).unwrap();
        let b = reg.open(16, AllocPolicy::FirstFit).unwrap();
        assert_ne!(a, b);
        assert_eq!(reg.open_pools(), 1);
    }

    #[test]
    fn pools_are_independent() {
        let mut reg = ready();
        let a = reg.open(32, AllocPolicy::FirstFit).unwrap();
        let b = reg.open(32, AllocPolicy::BestFit).unwrap();
        let _ha = reg.allocate(a, 32).unwrap();
        assert_eq!(reg.stats(b).unwrap().allocations, 0);
        assert_eq!(reg.stats(b).unwrap().policy, AllocPolicy::BestFit);
        assert!(reg.allocate(b, 32).is_ok());
    }

    #[test]
    fn handle_table_grows_past_three_quarters() {
        let config = RegistryConfig {
            pool_table_capacity: 4,
            ..RegistryConfig::default()
        };
        let mut reg = Registry::with_config(config);
        reg.init().unwrap();
        assert_eq!(reg.table_capacity(), Some(4));

        let mut ids: Vec<PoolId> = (0..4)
            .map(|_| reg.open(8, AllocPolicy::FirstFit).unwrap())
            .collect();
        // The fourth open saw 3 of 4 occupied, which does not exceed 75%.
        assert_eq!(reg.table_capacity(), Some(4));

        ids.push(reg.open(8, AllocPolicy::FirstFit).unwrap());
        assert_eq!(reg.table_capacity(), Some(8));

        // 6 of 8 is exactly 75%; the eighth open sees 7 and doubles again.
        ids.extend((0..2).map(|_| reg.open(8, AllocPolicy::FirstFit).unwrap()));
        assert_eq!(reg.table_capacity(), Some(8));
        ids.push(reg.open(8, AllocPolicy::FirstFit).unwrap());
        assert_eq!(reg.table_capacity(), Some(16));

        assert_eq!(reg.open_pools(), 8);
        for id in ids {
            reg.close(id).unwrap();
        }
        reg.teardown().unwrap();
    }

    #[test]
    fn table_capacity_is_none_until_init() {
        let mut reg = Registry::new();
        assert_eq!(reg.table_capacity(), None);
        reg.init().unwrap();
        assert_eq!(
            reg.table_capacity(),
            Some(RegistryConfig::DEFAULT_POOL_TABLE_CAPACITY)
        );
        reg.teardown().unwrap();
        assert_eq!(reg.table_capacity(), None);
    }

    #[test]
    fn free_through_wrong_pool_is_invalid_handle() {
        let mut reg = ready();
        let a = reg.open(64, AllocPolicy::FirstFit).unwrap();
        let b = reg.open(64, AllocPolicy::FirstFit).unwrap();
        let ha = reg.allocate(a, 16).unwrap();
        let hb = reg.allocate(b, 32).unwrap();

        let before = reg.stats(b).unwrap();
        assert_eq!(reg.free(b, ha), Err(PoolError::InvalidHandle));
        assert_eq!(reg.stats(b).unwrap(), before);
        assert_eq!(reg.bytes(b, hb).unwrap().len(), 32);

        reg.free(a, ha).unwrap();
        reg.free(b, hb).unwrap();
        reg.close(a).unwrap();
        reg.close(b).unwrap();
    }

    #[test]
    fn independent_registries_do_not_interfere() {
        let mut one = ready();
        let mut two = ready();
        let id = one.open(8, AllocPolicy::FirstFit).unwrap();
        assert_eq!(two.teardown(), Ok(()));
        assert_eq!(one.open_pools(), 1);
        one.close(id).unwrap();
    }
}
