//! Top-level module for dependency topology.
//!
//! This module provides the graph types and ordering algorithms used to turn
//! entity dependencies into a construction order:
//! - [`graph::DiGraph`], a directed graph with mirrored forward/reverse adjacency
//! - [`sequence`], the layered Kahn sequencer over a `DiGraph`
//! - bound aliases for vertex ids and edge weights

pub(crate) mod _debug_invariants;
pub mod bounds;
pub mod graph;
pub mod sequence;

pub use bounds::{VertexLike, WeightLike};
pub use graph::DiGraph;
pub use sequence::{Layering, layers, sequence};
