//! Mempool: fixed-capacity memory pools with first-fit and best-fit placement.
//!
//! This is the top-level facade crate that re-exports the public API from the
//! mempool sub-crates. For most users, adding `mempool` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use mempool::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.init().unwrap();
//!
//! let pool = registry.open(100, AllocPolicy::BestFit).unwrap();
//! let a = registry.allocate(pool, 40).unwrap();
//! let b = registry.allocate(pool, 60).unwrap();
//! assert_eq!(registry.stats(pool).unwrap().free_bytes(), 0);
//!
//! registry.bytes_mut(pool, a).unwrap()[..5].copy_from_slice(b"hello");
//! assert_eq!(&registry.bytes(pool, a).unwrap()[..5], b"hello");
//!
//! registry.free(pool, a).unwrap();
//! registry.free(pool, b).unwrap();
//! assert_eq!(
//!     registry.inspect(pool).unwrap(),
//!     vec![SegmentInfo { offset: 0, size: 100, allocated: false }]
//! );
//!
//! registry.close(pool).unwrap();
//! registry.teardown().unwrap();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `mempool-arena` | Registry, pools, node heap, gap index, sizing config |
//! | [`types`] | `mempool-core` | Handles, placement policy, segments, errors, status codes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Registry, pools and their bookkeeping tables (`mempool-arena`).
///
/// Most users only need [`arena::Registry`] and [`arena::Pool`]; both are
/// also available in the [`prelude`].
pub use mempool_arena as arena;

/// Handles, policies, segment descriptions and errors (`mempool-core`).
///
/// [`types::Status`] maps every [`types::PoolError`] to a stable integer
/// code for callers that want one.
pub use mempool_core as types;

/// Common imports for typical mempool usage.
///
/// ```rust
/// use mempool::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use mempool_arena::{Pool, Registry};

    // Configuration
    pub use mempool_arena::{GrowthPolicy, PoolConfig, RegistryConfig};

    // Handles and descriptions
    pub use mempool_core::{AllocHandle, AllocPolicy, PoolId, PoolSerial, PoolStats, SegmentInfo};

    // Errors
    pub use mempool_core::{PoolError, Status};
}
