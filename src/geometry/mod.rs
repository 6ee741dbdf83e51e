//! Declarative geometry descriptions and their dependency graphs.

pub mod builder;
pub mod entity;

pub use builder::{GeometryGraph, build_graph, construction_layers, construction_order};
pub use entity::{Dimension, Entity, EntityId, EntityKind, EntityMap};
