//! Self-checks for graph bookkeeping.
//!
//! Structures that keep redundant views of the same data (the forward and
//! reverse adjacency of [`DiGraph`](crate::topology::graph::DiGraph) and
//! their shared vertex order) implement [`DebugInvariants`] so that callers can verify
//! the views agree after building or mutating them.

use crate::geo_error::GeoSeqError;

/// Consistency checks over redundant internal state.
pub trait DebugInvariants {
    /// Panic on the first broken invariant. Compiled out of release builds
    /// unless the `strict-invariants` feature is on.
    fn debug_assert_invariants(&self);
    /// Report the first broken invariant as
    /// [`GeoSeqError::InvariantViolation`].
    fn validate_invariants(&self) -> Result<(), GeoSeqError>;
}

/// Validate `$target` and panic with `$ctx` in the message if it is
/// inconsistent. Expands to nothing in release builds without
/// `strict-invariants`.
#[macro_export]
macro_rules! debug_invariants {
    ($target:expr, $ctx:literal) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        {
            use $crate::debug_invariants::DebugInvariants as _;
            if let Err(e) = $target.validate_invariants() {
                panic!(concat!("[invariants] ", $ctx, ": {}"), e);
            }
        }
    };
}
