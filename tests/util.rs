#![allow(dead_code)]
use geoseq::geometry::entity::{Entity, EntityId, EntityMap};
use geoseq::topology::graph::DiGraph;

pub fn ids(v: &[EntityId]) -> Vec<&str> {
    v.iter().map(EntityId::as_str).collect()
}

/// Position of `id` in `order`; panics if absent.
pub fn pos(order: &[EntityId], id: &str) -> usize {
    order
        .iter()
        .position(|e| e.as_str() == id)
        .unwrap_or_else(|| panic!("{id} missing from {order:?}"))
}

/// Unit square `x1..x4` with closing lines `line1..line4` (x1→x2, ..., x4→x1).
pub fn square() -> Vec<Entity> {
    vec![
        Entity::point("x1", [0.0, 0.0, 0.0]),
        Entity::point("x2", [1.0, 0.0, 0.0]),
        Entity::point("x3", [1.0, 1.0, 0.0]),
        Entity::point("x4", [0.0, 1.0, 0.0]),
        Entity::line("line1", "x1", "x2"),
        Entity::line("line2", "x2", "x3"),
        Entity::line("line3", "x3", "x4"),
        Entity::line("line4", "x4", "x1"),
    ]
}

/// Square closed by a filling surface `surface1`.
pub fn filled_square() -> EntityMap {
    let mut v = square();
    v.push(Entity::surface_filling(
        "surface1",
        ["line1", "line2", "line3", "line4"],
    ));
    EntityMap::from_entities(v).unwrap()
}

/// Tetrahedron `p0..p3`, six edges, four filling faces and volume `vol`.
pub fn tetrahedron() -> EntityMap {
    let mut v = vec![
        Entity::point("p0", [0.0, 0.0, 0.0]),
        Entity::point("p1", [1.0, 0.0, 0.0]),
        Entity::point("p2", [0.0, 1.0, 0.0]),
        Entity::point("p3", [0.0, 0.0, 1.0]),
        Entity::line("e01", "p0", "p1"),
        Entity::line("e12", "p1", "p2"),
        Entity::line("e20", "p2", "p0"),
        Entity::line("e03", "p0", "p3"),
        Entity::line("e13", "p1", "p3"),
        Entity::line("e23", "p2", "p3"),
    ];
    v.push(Entity::surface_filling("f012", ["e01", "e12", "e20"]));
    v.push(Entity::surface_filling("f013", ["e01", "e13", "e03"]));
    v.push(Entity::surface_filling("f123", ["e12", "e23", "e13"]));
    v.push(Entity::surface_filling("f023", ["e20", "e03", "e23"]));
    v.push(Entity::volume("vol", ["f012", "f013", "f123", "f023"], vec![]));
    EntityMap::from_entities(v).unwrap()
}

/// Graph over `0..n` with the given edges, vertices inserted in `order`.
pub fn graph_from(order: &[u32], edges: &[(u32, u32)]) -> DiGraph<u32> {
    let mut g = DiGraph::new();
    for &v in order {
        g.add_vertex(v);
    }
    for &(u, v) in edges {
        g.add_edge(u, v);
    }
    g
}
