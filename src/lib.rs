#![cfg_attr(docsrs, feature(doc_cfg))]
//! # geoseq
//!
//! geoseq turns a declarative description of geometric entities (points,
//! curves, surfaces, volumes) into a safe construction order and drives an
//! external geometry kernel through it to obtain a mesh.
//!
//! ## Features
//! - Order-preserving JSON descriptions decoded into typed entity kinds
//! - A directed dependency graph with mirrored forward/reverse adjacency
//! - Deterministic layered topological sequencing with explicit cycle detection
//! - A kernel trait with a scoped session guard, plus an in-memory recording kernel
//!
//! ## Determinism
//!
//! Sequencing emits every vertex that is ready in a round as one batch, in
//! insertion order, so the same description always yields the same order:
//! entities at the same dependency depth keep their declaration order.
//!
//! ## Usage
//! ```rust
//! use geoseq::prelude::*;
//!
//! let entities = EntityMap::from_json_str(r#"{
//!     "x1": {"type": "point", "data": [0, 0, 0]},
//!     "x2": {"type": "point", "data": [1, 0, 0]},
//!     "l1": {"type": "line",  "data": ["x1", "x2"]}
//! }"#).unwrap();
//! let order = construction_order(&entities).unwrap();
//! assert_eq!(order.last().map(EntityId::as_str), Some("l1"));
//!
//! let mut kernel = RecordingKernel::new();
//! let mesh = mesh_entities(&mut kernel, &entities, &PipelineOptions::default()).unwrap();
//! assert_eq!(mesh.nodes.len(), 2);
//! ```

pub mod debug_invariants;
pub mod geo_error;
pub mod geometry;
pub mod pipeline;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use geo_error::GeoSeqError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geo_error::GeoSeqError;
    pub use crate::geometry::builder::{build_graph, construction_layers, construction_order};
    pub use crate::geometry::entity::{Dimension, Entity, EntityId, EntityKind, EntityMap};
    pub use crate::pipeline::construct::{FemMesh, mesh_entities, mesh_entities_with_hook};
    pub use crate::pipeline::kernel::{GeometryKernel, Handle, KernelSession};
    pub use crate::pipeline::options::{PipelineOptions, Visualization};
    pub use crate::pipeline::recording::RecordingKernel;
    pub use crate::topology::graph::DiGraph;
    pub use crate::topology::sequence::{Layering, layers, sequence};
}
