//! Common bound aliases used across topology code.
//!
//! These traits have blanket impls, so any type satisfying the underlying
//! bounds will automatically implement them. They are zero-cost and only
//! reduce duplication in `where` clauses.

/// Canonical bound set for graph vertex identifiers.
///
/// - `Clone` so string-like ids can be copied into working graphs
/// - `Eq + Hash` for `HashMap`-backed adjacencies
/// - `Debug` for diagnostics and invariant checks
pub trait VertexLike: Clone + Eq + std::hash::Hash + std::fmt::Debug {}
impl<T> VertexLike for T where T: Clone + Eq + std::hash::Hash + std::fmt::Debug {}

/// Minimal bound we expect for per-edge weights.
///
/// `Default` supplies the weight of edges added without an explicit one.
pub trait WeightLike: Clone + Default {}
impl<T: Clone + Default> WeightLike for T {}
