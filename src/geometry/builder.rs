//! Dependency graph construction from an [`EntityMap`].
//!
//! Every entity becomes a vertex. Leaf kinds (points, circles) are added as
//! isolated vertices; every other kind adds one edge `dependency → entity`
//! per referenced id, so that dependencies always precede their dependents
//! once the graph is sequenced.
//!
//! References are resolved against the map before any edge is added for an
//! entity, and the first undeclared id aborts the whole build with
//! [`GeoSeqError::DanglingReference`]; no partial graph is returned.

use crate::geo_error::GeoSeqError;
use crate::geometry::entity::{EntityId, EntityKind, EntityMap};
use crate::topology::graph::DiGraph;
use crate::topology::sequence::{Layering, layers, sequence};

/// Dependency graph over entity ids.
pub type GeometryGraph = DiGraph<EntityId>;

/// Build the dependency graph of `entities`.
///
/// The input is not modified. Vertices are inserted in declaration order,
/// except that an edge may introduce a not-yet-visited dependency first.
///
/// # Errors
/// * [`GeoSeqError::DanglingReference`]: an entity references an id that is
///   not declared in `entities`.
pub fn build_graph(entities: &EntityMap) -> Result<GeometryGraph, GeoSeqError> {
    let mut graph = GeometryGraph::new();
    for entity in entities {
        match &entity.kind {
            EntityKind::Point { .. } | EntityKind::Circle { .. } => {
                graph.add_vertex(entity.id.clone());
            }
            EntityKind::Line { .. }
            | EntityKind::SurfaceFilling { .. }
            | EntityKind::PlaneSurface { .. }
            | EntityKind::Volume { .. } => {
                let deps = entity.dependencies();
                if let Some(missing) = deps.iter().find(|d| !entities.contains(d.as_str())) {
                    return Err(GeoSeqError::DanglingReference {
                        entity: entity.id.to_string(),
                        missing: missing.to_string(),
                    });
                }
                for dep in deps {
                    graph.add_edge(dep.clone(), entity.id.clone());
                }
            }
        }
    }
    crate::debug_invariants!(graph, "geometry graph");
    log::debug!(
        "geometry graph: {} vertices, {} edges",
        graph.num_vertices(),
        graph.num_edges()
    );
    Ok(graph)
}

/// Build the graph of `entities` and return its construction order.
///
/// # Errors
/// Any error of [`build_graph`] or [`sequence`].
pub fn construction_order(entities: &EntityMap) -> Result<Vec<EntityId>, GeoSeqError> {
    sequence(&build_graph(entities)?)
}

/// Build the graph of `entities` and return its ready batches.
///
/// # Errors
/// Any error of [`build_graph`] or [`layers`].
pub fn construction_layers(entities: &EntityMap) -> Result<Layering<EntityId>, GeoSeqError> {
    layers(&build_graph(entities)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::entity::Entity;

    fn ids(v: &[EntityId]) -> Vec<&str> {
        v.iter().map(EntityId::as_str).collect()
    }

    #[test]
    fn leaves_become_isolated_vertices() {
        let map = EntityMap::from_entities([
            Entity::point("p", [0.0; 3]),
            Entity::circle("c", [0.0; 3], 1.0),
        ])
        .unwrap();
        let g = build_graph(&map).unwrap();
        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.num_edges(), 0);
    }

    #[test]
    fn loops_add_edges_for_contour_and_holes() {
        let map = EntityMap::from_entities([
            Entity::circle("outer", [0.0; 3], 2.0),
            Entity::circle("inner1", [0.0; 3], 0.5),
            Entity::circle("inner2", [1.0, 0.0, 0.0], 0.2),
            Entity::plane_surface(
                "s",
                ["outer"],
                vec![vec!["inner1".into()], vec!["inner2".into()]],
            ),
        ])
        .unwrap();
        let g = build_graph(&map).unwrap();
        assert_eq!(g.in_degree(&"s".into()), Some(3));
        let preds = g.predecessors(&"s".into()).unwrap();
        assert_eq!(preds.len(), 3);
    }

    #[test]
    fn dangling_reference_aborts_build() {
        let map = EntityMap::from_entities([
            Entity::point("a", [0.0; 3]),
            Entity::line("l", "a", "b"),
        ])
        .unwrap();
        assert_eq!(
            build_graph(&map).unwrap_err(),
            GeoSeqError::DanglingReference {
                entity: "l".into(),
                missing: "b".into()
            }
        );
    }

    #[test]
    fn forward_references_are_allowed() {
        let map = EntityMap::from_entities([
            Entity::line("l", "a", "b"),
            Entity::point("b", [1.0, 0.0, 0.0]),
            Entity::point("a", [0.0; 3]),
        ])
        .unwrap();
        let order = construction_order(&map).unwrap();
        assert_eq!(ids(&order), vec!["a", "b", "l"]);
    }

    #[test]
    fn shared_point_appears_once_before_dependents() {
        let map = EntityMap::from_entities([
            Entity::point("o", [0.0; 3]),
            Entity::point("a", [1.0, 0.0, 0.0]),
            Entity::point("b", [0.0, 1.0, 0.0]),
            Entity::line("ob", "o", "b"),
            Entity::line("oa", "o", "a"),
        ])
        .unwrap();
        let layering = construction_layers(&map).unwrap();
        assert_eq!(layering.num_layers(), 2);
        let order = layering.into_sequence();
        assert_eq!(ids(&order), vec!["o", "a", "b", "ob", "oa"]);
    }
}
