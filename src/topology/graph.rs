//! Directed dependency graph with mirrored adjacency.
//!
//! [`DiGraph`] stores every edge `u → v` twice: once in the forward map
//! (`u → {v: weight}`) and once in the reverse map (`v → {u}`), so that both
//! successor and predecessor queries are O(1) lookups. Both maps are
//! [`IndexMap`]s keyed by vertex in first-insertion order, and removals use
//! order-preserving `shift_remove`/`retain`, so [`DiGraph::vertices`] always
//! iterates in insertion order. That is what makes sequencing deterministic.
//!
//! Queries about a vertex that is not in the graph return `None` instead of
//! panicking.

use indexmap::{IndexMap, IndexSet};

use crate::debug_invariants::DebugInvariants;
use crate::geo_error::GeoSeqError;
use crate::topology::_debug_invariants::{
    first_unmirrored, forward_pairs, inv_assert, inv_assert_eq, reverse_pairs,
};
use crate::topology::bounds::{VertexLike, WeightLike};

/// Directed graph over vertex ids `V` with per-edge weights `W`.
#[derive(Clone, Debug)]
pub struct DiGraph<V, W = ()>
where
    V: VertexLike,
{
    adjacency_out: IndexMap<V, IndexMap<V, W>>,
    adjacency_in: IndexMap<V, IndexSet<V>>,
}

impl<V, W> Default for DiGraph<V, W>
where
    V: VertexLike,
{
    fn default() -> Self {
        Self {
            adjacency_out: IndexMap::new(),
            adjacency_in: IndexMap::new(),
        }
    }
}

impl<V: VertexLike, W: WeightLike> DiGraph<V, W> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an isolated vertex. Returns `false` if it was already present.
    pub fn add_vertex(&mut self, v: V) -> bool {
        if self.adjacency_out.contains_key(&v) {
            return false;
        }
        self.adjacency_out.insert(v.clone(), IndexMap::new());
        self.adjacency_in.insert(v, IndexSet::new());
        true
    }

    /// Record `u → v` with the default weight, adding missing endpoints.
    pub fn add_edge(&mut self, u: V, v: V) {
        self.add_edge_weighted(u, v, W::default());
    }

    /// Record `u → v` with `weight`. Re-adding an existing edge overwrites its
    /// weight and otherwise leaves the graph unchanged.
    pub fn add_edge_weighted(&mut self, u: V, v: V, weight: W) {
        self.add_vertex(u.clone());
        self.add_vertex(v.clone());
        if let Some(outs) = self.adjacency_out.get_mut(&u) {
            outs.insert(v.clone(), weight);
        }
        if let Some(ins) = self.adjacency_in.get_mut(&v) {
            ins.insert(u.clone());
        }
        self.debug_assert_mirrored(&u);
        self.debug_assert_mirrored(&v);
    }

    /// Remove `v` together with every incident edge.
    ///
    /// Returns the removed vertex, or `None` if it was not present.
    pub fn del_vertex(&mut self, v: &V) -> Option<V> {
        let (removed, outs) = self.adjacency_out.shift_remove_entry(v)?;
        let ins = self.adjacency_in.shift_remove(v).unwrap_or_default();
        self.scrub(v, outs.keys(), ins.iter());
        inv_assert_eq!(
            self.adjacency_out.len(),
            self.adjacency_in.len(),
            "vertex sets diverged after removing {v:?}"
        );
        Some(removed)
    }

    /// Remove every vertex of `batch` with its incident edges in one pass,
    /// keeping the relative order of the survivors.
    pub fn del_vertices(&mut self, batch: &IndexSet<V>) {
        for v in batch {
            let outs = self.adjacency_out.get(v).map(|m| m.keys().cloned().collect::<Vec<_>>());
            let ins = self.adjacency_in.get(v).map(|s| s.iter().cloned().collect::<Vec<_>>());
            self.scrub(v, outs.iter().flatten(), ins.iter().flatten());
        }
        self.adjacency_out.retain(|v, _| !batch.contains(v));
        self.adjacency_in.retain(|v, _| !batch.contains(v));
        inv_assert_eq!(
            self.adjacency_out.len(),
            self.adjacency_in.len(),
            "vertex sets diverged after batch removal"
        );
    }

    /// Remove the single edge `u → v`, returning its weight if it existed.
    pub fn del_edge(&mut self, u: &V, v: &V) -> Option<W> {
        let weight = self.adjacency_out.get_mut(u)?.shift_remove(v)?;
        if let Some(ins) = self.adjacency_in.get_mut(v) {
            ins.shift_remove(u);
        }
        self.debug_assert_mirrored(u);
        Some(weight)
    }

    /// Whether `v` is a vertex of the graph.
    #[inline]
    pub fn contains(&self, v: &V) -> bool {
        self.adjacency_out.contains_key(v)
    }

    /// Number of distinct predecessors of `v`.
    #[inline]
    pub fn in_degree(&self, v: &V) -> Option<usize> {
        self.adjacency_in.get(v).map(IndexSet::len)
    }

    /// Number of distinct successors of `v`.
    #[inline]
    pub fn out_degree(&self, v: &V) -> Option<usize> {
        self.adjacency_out.get(v).map(IndexMap::len)
    }

    /// Weight of the edge `u → v`, if present.
    pub fn weight(&self, u: &V, v: &V) -> Option<&W> {
        self.adjacency_out.get(u)?.get(v)
    }

    /// Vertex ids in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.adjacency_out.keys()
    }

    /// Successors of `v`, in vertex insertion order.
    pub fn successors(&self, v: &V) -> Option<Vec<&V>> {
        let outs = self.adjacency_out.get(v)?;
        Some(self.by_position(outs.keys()))
    }

    /// Predecessors of `v`, in vertex insertion order.
    pub fn predecessors(&self, v: &V) -> Option<Vec<&V>> {
        let ins = self.adjacency_in.get(v)?;
        Some(self.by_position(ins.iter()))
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.adjacency_out.len()
    }

    /// Total number of edges.
    pub fn num_edges(&self) -> usize {
        self.adjacency_out.values().map(IndexMap::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacency_out.is_empty()
    }

    fn by_position<'a>(&'a self, it: impl Iterator<Item = &'a V>) -> Vec<&'a V> {
        let mut ranked: Vec<(usize, &V)> = it
            .filter_map(|q| self.adjacency_out.get_index_of(q).map(|i| (i, q)))
            .collect();
        ranked.sort_unstable_by_key(|&(i, _)| i);
        ranked.into_iter().map(|(_, q)| q).collect()
    }

    /// Drop `v` from the neighbour sets of its former successors and
    /// predecessors.
    fn scrub<'a>(&mut self, v: &V, outs: impl Iterator<Item = &'a V>, ins: impl Iterator<Item = &'a V>)
    where
        V: 'a,
    {
        for dst in outs {
            if let Some(set) = self.adjacency_in.get_mut(dst) {
                set.shift_remove(v);
            }
        }
        for src in ins {
            if let Some(map) = self.adjacency_out.get_mut(src) {
                map.shift_remove(v);
            }
        }
    }

    /// Check the mirror invariant around `v` only.
    fn debug_assert_mirrored(&self, v: &V) {
        if !cfg!(any(debug_assertions, feature = "strict-invariants")) {
            return;
        }
        if let Some(outs) = self.adjacency_out.get(v) {
            for dst in outs.keys() {
                inv_assert!(
                    self.adjacency_in.get(dst).is_some_and(|s| s.contains(v)),
                    "edge {v:?} -> {dst:?} has no reverse entry"
                );
            }
        }
        if let Some(ins) = self.adjacency_in.get(v) {
            for src in ins {
                inv_assert!(
                    self.adjacency_out.get(src).is_some_and(|m| m.contains_key(v)),
                    "reverse entry {src:?} -> {v:?} has no forward edge"
                );
            }
        }
    }
}

impl<V: VertexLike, W: WeightLike> DebugInvariants for DiGraph<V, W> {
    fn debug_assert_invariants(&self) {
        if let Err(e) = self.validate_invariants() {
            inv_assert!(false, "{e}");
        }
    }

    fn validate_invariants(&self) -> Result<(), GeoSeqError> {
        if !self.adjacency_out.keys().eq(self.adjacency_in.keys()) {
            return Err(GeoSeqError::InvariantViolation(format!(
                "forward map has {} vertices, reverse map {}, or their order differs",
                self.adjacency_out.len(),
                self.adjacency_in.len()
            )));
        }
        let fwd = forward_pairs(&self.adjacency_out);
        let rev = reverse_pairs(&self.adjacency_in);
        if let Some((u, v)) = first_unmirrored(&fwd, &rev) {
            return Err(GeoSeqError::InvariantViolation(format!(
                "edge {u:?} -> {v:?} has no reverse entry"
            )));
        }
        if let Some((u, v)) = first_unmirrored(&rev, &fwd) {
            return Err(GeoSeqError::InvariantViolation(format!(
                "reverse entry {u:?} -> {v:?} has no forward edge"
            )));
        }
        Ok(())
    }
}
