//! Registry and pool configuration parameters.

/// When and how far a growable table expands.
///
/// A table grows once its occupancy strictly exceeds
/// `fill_numerator / fill_denominator` of its capacity, and the new
/// capacity is `expand_factor` times the old one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Numerator of the fill factor. Default: 3.
    pub fill_numerator: usize,
    /// Denominator of the fill factor. Default: 4.
    pub fill_denominator: usize,
    /// Capacity multiplier applied on growth. Default: 2.
    pub expand_factor: usize,
}

impl GrowthPolicy {
    /// Default fill factor numerator (0.75 overall).
    pub const DEFAULT_FILL_NUMERATOR: usize = 3;

    /// Default fill factor denominator.
    pub const DEFAULT_FILL_DENOMINATOR: usize = 4;

    /// Default capacity multiplier.
    pub const DEFAULT_EXPAND_FACTOR: usize = 2;

    /// Create the default policy: grow ×2 above 75% occupancy.
    pub const fn new() -> Self {
        Self {
            fill_numerator: Self::DEFAULT_FILL_NUMERATOR,
            fill_denominator: Self::DEFAULT_FILL_DENOMINATOR,
            expand_factor: Self::DEFAULT_EXPAND_FACTOR,
        }
    }

    /// Whether `occupied` entries out of `capacity` exceed the fill factor.
    pub fn should_grow(&self, occupied: usize, capacity: usize) -> bool {
        occupied.saturating_mul(self.fill_denominator)
            > capacity.saturating_mul(self.fill_numerator)
    }

    /// Capacity after one growth step. Always strictly larger than `capacity`.
    pub fn grown(&self, capacity: usize) -> usize {
        capacity
            .saturating_mul(self.expand_factor)
            .max(capacity.saturating_add(1))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-pool table sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Initial number of node-heap slots. Default: 40.
    pub node_heap_capacity: usize,
    /// Initial gap-index capacity. Default: 40.
    pub gap_index_capacity: usize,
    /// Growth policy for both tables.
    pub growth: GrowthPolicy,
}

impl PoolConfig {
    /// Default initial node-heap capacity.
    pub const DEFAULT_NODE_HEAP_CAPACITY: usize = 40;

    /// Default initial gap-index capacity.
    pub const DEFAULT_GAP_INDEX_CAPACITY: usize = 40;

    /// Create a pool config with default values.
    pub const fn new() -> Self {
        Self {
            node_heap_capacity: Self::DEFAULT_NODE_HEAP_CAPACITY,
            gap_index_capacity: Self::DEFAULT_GAP_INDEX_CAPACITY,
            growth: GrowthPolicy::new(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`Registry`](crate::Registry).
///
/// All values are copied into the registry at construction and are
/// immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Initial capacity of the pool handle table. Default: 20.
    pub pool_table_capacity: usize,
    /// Growth policy for the pool handle table.
    pub growth: GrowthPolicy,
    /// Sizing applied to every pool the registry opens.
    pub pool: PoolConfig,
}

impl RegistryConfig {
    /// Default initial pool handle table capacity.
    pub const DEFAULT_POOL_TABLE_CAPACITY: usize = 20;

    /// Create a registry config with default values.
    pub const fn new() -> Self {
        Self {
            pool_table_capacity: Self::DEFAULT_POOL_TABLE_CAPACITY,
            growth: GrowthPolicy::new(),
            pool: PoolConfig::new(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
