//! Placement policies.

use std::fmt;

/// How a pool chooses the gap an allocation is carved from.
///
/// Fixed when the pool is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AllocPolicy {
    /// Take the first sufficient gap in node-heap *storage* order.
    ///
    /// Storage order follows slot indices, not arena addresses: a gap whose
    /// slot was recycled by an earlier split can be found before a
    /// lower-addressed gap.
    #[default]
    FirstFit,
    /// Take the smallest sufficient gap, lowest address on ties.
    BestFit,
}

impl fmt::Display for AllocPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstFit => write!(f, "first-fit"),
            Self::BestFit => write!(f, "best-fit"),
        }
    }
}
