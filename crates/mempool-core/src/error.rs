//! Error types for registry and pool operations.

use std::error::Error;
use std::fmt;

/// Errors returned by registry lifecycle and pool operations.
///
/// Every failure is reported synchronously to the immediate caller; none
/// is retried internally. `NoSpace` is an ordinary policy outcome,
/// `Inconsistent` indicates a bug in the allocator's bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// `init()` was called on a registry that is already initialized.
    AlreadyInitialized,
    /// `teardown()` was called on a registry that is not initialized.
    AlreadyTornDown,
    /// A pool operation was attempted before `init()`.
    Uninitialized,
    /// The registry still owns open pools.
    NotEmpty {
        /// Number of pools that are still open.
        open_pools: usize,
    },
    /// The pool still has live allocations or a fragmented arena, so it
    /// cannot be closed.
    NotFree {
        /// Live allocations in the pool.
        allocations: usize,
        /// Gaps in the pool (a closable pool has exactly one).
        gaps: usize,
    },
    /// The pool or allocation handle does not refer to anything live.
    InvalidHandle,
    /// Growing the arena or one of the bookkeeping tables failed.
    ResourceExhausted {
        /// Number of elements the failed reservation asked for.
        requested: usize,
    },
    /// An internal invariant was found violated.
    Inconsistent {
        /// What was found to be wrong.
        reason: String,
    },
    /// No gap satisfies the request under the pool's placement policy.
    NoSpace {
        /// Number of bytes requested.
        requested: usize,
        /// Size of the largest gap in the pool at the time of the request.
        largest_gap: usize,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "registry is already initialized"),
            Self::AlreadyTornDown => write!(f, "registry is not initialized"),
            Self::Uninitialized => write!(f, "registry has not been initialized"),
            Self::NotEmpty { open_pools } => {
                write!(f, "registry still owns {open_pools} open pool(s)")
            }
            Self::NotFree { allocations, gaps } => {
                write!(
                    f,
                    "pool is not free: {allocations} live allocation(s), {gaps} gap(s)"
                )
            }
            Self::InvalidHandle => write!(f, "handle does not refer to a live object"),
            Self::ResourceExhausted { requested } => {
                write!(f, "storage growth failed: requested {requested} elements")
            }
            Self::Inconsistent { reason } => write!(f, "pool is inconsistent: {reason}"),
            Self::NoSpace {
                requested,
                largest_gap,
            } => {
                write!(
                    f,
                    "no space: requested {requested} bytes, largest gap {largest_gap} bytes"
                )
            }
        }
    }
}

impl Error for PoolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_sizes() {
        let err = PoolError::NoSpace {
            requested: 64,
            largest_gap: 32,
        };
        assert_eq!(
            err.to_string(),
            "no space: requested 64 bytes, largest gap 32 bytes"
        );
    }

    #[test]
    fn not_free_reports_counters() {
        let err = PoolError::NotFree {
            allocations: 2,
            gaps: 3,
        };
        assert!(err.to_string().contains("2 live allocation(s)"));
        assert!(err.to_string().contains("3 gap(s)"));
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: Error>(_: &E) {}
        assert_error(&PoolError::InvalidHandle);
    }
}
