//! Stable integer status codes.
//!
//! [`Status`] collapses the outcome of any registry or pool operation into a
//! `repr(i32)` code: `Ok` is 0, every error is negative. Codes never change
//! meaning, so they can be logged, compared across versions, or handed to
//! foreign callers.

use crate::error::PoolError;

/// Outcome of a registry or pool operation as a stable code.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Success.
    Ok = 0,
    /// Registry initialized twice without a teardown in between.
    AlreadyInitialized = -1,
    /// Registry torn down while not initialized.
    AlreadyTornDown = -2,
    /// Operation attempted on an uninitialized registry.
    Uninitialized = -3,
    /// Teardown attempted while pools are still open.
    NotEmpty = -4,
    /// Close attempted on a pool that still has allocations or several gaps.
    NotFree = -5,
    /// Pool or allocation handle does not exist.
    InvalidHandle = -6,
    /// Storage growth failed.
    ResourceExhausted = -7,
    /// Internal bookkeeping was found violated.
    Inconsistent = -8,
    /// No sufficient gap under the active policy.
    NoSpace = -9,
}

impl Status {
    /// Whether this status reports success.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl From<&PoolError> for Status {
    fn from(e: &PoolError) -> Self {
        match e {
            PoolError::AlreadyInitialized => Status::AlreadyInitialized,
            PoolError::AlreadyTornDown => Status::AlreadyTornDown,
            PoolError::Uninitialized => Status::Uninitialized,
            PoolError::NotEmpty { .. } => Status::NotEmpty,
            PoolError::NotFree { .. } => Status::NotFree,
            PoolError::InvalidHandle => Status::InvalidHandle,
            PoolError::ResourceExhausted { .. } => Status::ResourceExhausted,
            PoolError::Inconsistent { .. } => Status::Inconsistent,
            PoolError::NoSpace { .. } => Status::NoSpace,
        }
    }
}

impl<T> From<&Result<T, PoolError>> for Status {
    fn from(r: &Result<T, PoolError>) -> Self {
        match r {
            Ok(_) => Status::Ok,
            Err(e) => Status::from(e),
        }
    }
}
