//! Fixed-capacity memory pools with first-fit and best-fit placement.
//!
//! A [`Registry`] owns any number of independent [`Pool`]s. Each pool owns
//! one byte arena and carves variable-size allocations out of it; freeing
//! an allocation coalesces it with free neighbours.
//!
//! # Architecture
//!
//! ```text
//! Registry
//! └── PoolTable: Vec<Option<Pool>> (append-only, closed slots stay None)
//!     └── Pool
//!         ├── arena: Vec<u8> (fixed at open time)
//!         ├── NodeHeap: Vec<Node> (slots linked in address order by index)
//!         └── GapIndex: Vec<GapEntry> (sorted by size, then offset)
//! ```
//!
//! All three tables grow ×2 once more than 75% of their capacity is in use
//! (see [`GrowthPolicy`]). Gap entries and chain links are slot indices, so
//! growth never invalidates them.
//!
//! # Concurrency
//!
//! Nothing here locks. Every mutating operation takes `&mut self`; callers
//! that need cross-thread access wrap the registry in their own mutex.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod gap_index;
pub mod node_heap;
pub mod pool;
pub mod registry;

// Public re-exports for the primary API surface.
pub use config::{GrowthPolicy, PoolConfig, RegistryConfig};
pub use pool::Pool;
pub use registry::Registry;

pub use mempool_core::{
    AllocHandle, AllocPolicy, PoolError, PoolId, PoolSerial, PoolStats, SegmentInfo, Status,
};
