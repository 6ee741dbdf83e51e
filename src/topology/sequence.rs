//! Layered topological sequencing for dependency graphs.
//!
//! This module provides [`layers`], which peels a [`DiGraph`] into ready
//! batches with a layered variant of Kahn's algorithm, [`sequence`], the
//! flattened construction order, and [`Layering`], a summary of the batches
//! with per-vertex depth lookups.
//!
//! Each round collects *every* vertex whose in-degree is currently zero, in
//! the graph's insertion order, and then deletes the whole batch. Vertices at
//! the same dependency depth therefore come out together and keep their
//! declaration order, and batches are emitted in increasing depth.
//!
//! # Errors
//! * [`GeoSeqError::CyclicDependency`]: a round found no ready vertex while
//!   vertices remained. The error lists every vertex still in the graph.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::geo_error::GeoSeqError;
use crate::topology::bounds::{VertexLike, WeightLike};
use crate::topology::graph::DiGraph;

/// Ready batches of a graph together with the depth of each vertex.
#[derive(Clone, Debug)]
pub struct Layering<V: VertexLike> {
    /// `layers[d]` holds the vertices at dependency depth `d`, in insertion order.
    pub layers: Vec<Vec<V>>,
    /// Map from vertex to the index of its layer.
    pub depth: HashMap<V, u32>,
}

impl<V: VertexLike> Layering<V> {
    /// Layer index of `v`, if it is part of the graph.
    #[inline]
    pub fn depth_of(&self, v: &V) -> Option<u32> {
        self.depth.get(v).copied()
    }

    /// Number of layers (0 for an empty graph).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total number of vertices across all layers.
    #[inline]
    pub fn len(&self) -> usize {
        self.depth.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Flatten the layers into a single construction order.
    pub fn into_sequence(self) -> Vec<V> {
        self.layers.into_iter().flatten().collect()
    }
}

/// Compute the ready batches of `graph`.
///
/// The caller's graph is left untouched; all deletions happen on a private
/// clone.
///
/// ## Complexity
/// - Time: **O(L · (|V| + |E|))** for `L` layers: every round scans the
///   remaining vertices once and removes its batch in a single pass.
/// - Space: **O(|V| + |E|)** for the working copy.
///
/// # Errors
/// * [`GeoSeqError::CyclicDependency`]: the remaining vertices can never reach
///   in-degree zero.
pub fn layers<V, W>(graph: &DiGraph<V, W>) -> Result<Layering<V>, GeoSeqError>
where
    V: VertexLike + std::fmt::Display,
    W: WeightLike,
{
    crate::debug_invariants!(graph, "graph to sequence");
    let mut work = graph.clone();
    let mut out = Vec::new();
    let mut depth = HashMap::with_capacity(graph.num_vertices());

    while !work.is_empty() {
        let ready: IndexSet<V> = work
            .vertices()
            .filter(|v| work.in_degree(v) == Some(0))
            .cloned()
            .collect();

        if ready.is_empty() {
            let remaining: Vec<String> = work.vertices().map(ToString::to_string).collect();
            log::warn!(
                "Dependency cycle detected after {} layers; {} entities remain",
                out.len(),
                remaining.len()
            );
            return Err(GeoSeqError::CyclicDependency { remaining });
        }

        let round = u32::try_from(out.len()).unwrap_or(u32::MAX);
        log::debug!("layer {round}: {} ready", ready.len());
        work.del_vertices(&ready);
        depth.extend(ready.iter().map(|v| (v.clone(), round)));
        out.push(ready.into_iter().collect());
    }

    Ok(Layering { layers: out, depth })
}

/// Compute a construction order for `graph`.
///
/// For every edge `u → v` the result places `u` strictly before `v`, and it
/// contains every vertex exactly once. Equivalent to flattening [`layers`].
///
/// # Errors
/// * [`GeoSeqError::CyclicDependency`]: the graph contains a cycle.
pub fn sequence<V, W>(graph: &DiGraph<V, W>) -> Result<Vec<V>, GeoSeqError>
where
    V: VertexLike + std::fmt::Display,
    W: WeightLike,
{
    layers(graph).map(Layering::into_sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_follow_declaration_order() {
        let mut g = DiGraph::<u32>::new();
        g.add_edge(0, 1);
        g.add_edge(2, 1);
        g.add_edge(3, 1);
        g.add_edge(1, 4);
        g.add_edge(1, 5);
        g.add_edge(4, 6);
        g.add_edge(6, 7);
        g.add_edge(5, 7);
        let layering = layers(&g).unwrap();
        assert_eq!(
            layering.layers,
            vec![vec![0, 2, 3], vec![1], vec![4, 5], vec![6], vec![7]]
        );
        assert_eq!(layering.depth_of(&7), Some(4));
        assert_eq!(layering.num_layers(), 5);
        assert_eq!(sequence(&g).unwrap(), vec![0, 2, 3, 1, 4, 5, 6, 7]);
    }

    #[test]
    fn wide_bipartite_graph_peels_in_two_layers() {
        // 2000 sources, each feeding two of 2000 sinks
        let n = 2000u32;
        let mut g = DiGraph::<u32>::new();
        for u in 0..n {
            g.add_edge(u, n + u);
            g.add_edge(u, n + (u + 1) % n);
        }
        let layering = layers(&g).unwrap();
        assert_eq!(layering.num_layers(), 2);
        assert_eq!(layering.layers[0], (0..n).collect::<Vec<_>>());
        assert_eq!(layering.layers[1].len(), n as usize);
        assert_eq!(layering.depth_of(&(2 * n - 1)), Some(1));
        assert_eq!(g.num_edges(), 2 * n as usize);
    }

    #[test]
    fn caller_graph_is_untouched() {
        let mut g = DiGraph::<u32>::new();
        g.add_edge(1, 2);
        g.add_vertex(3);
        let _ = sequence(&g).unwrap();
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.in_degree(&2), Some(1));
    }

    #[test]
    fn empty_graph_sequences_to_nothing() {
        let g = DiGraph::<u32>::new();
        let layering = layers(&g).unwrap();
        assert!(layering.is_empty());
        assert_eq!(layering.num_layers(), 0);
        assert!(sequence(&g).unwrap().is_empty());
    }

    #[test]
    fn cycle_names_stuck_vertices() {
        let mut g = DiGraph::<u32>::new();
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.add_edge(3, 2);
        g.add_edge(3, 4);
        let err = sequence(&g).unwrap_err();
        assert_eq!(
            err,
            GeoSeqError::CyclicDependency {
                remaining: vec!["2".into(), "3".into(), "4".into()]
            }
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut g = DiGraph::<u32>::new();
        g.add_vertex(1);
        g.add_edge(2, 2);
        let err = sequence(&g).unwrap_err();
        assert_eq!(
            err,
            GeoSeqError::CyclicDependency {
                remaining: vec!["2".into()]
            }
        );
    }
}
