//! Core types for the mempool allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary the allocation engine consumes and produces: pool and
//! allocation handles, the placement policy, segment descriptions, error
//! types and their stable status codes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod policy;
pub mod segment;
pub mod status;

pub use error::PoolError;
pub use id::{AllocHandle, PoolId, PoolSerial};
pub use policy::AllocPolicy;
pub use segment::{PoolStats, SegmentInfo};
pub use status::Status;
