mod util;
use geoseq::geo_error::GeoSeqError;
use geoseq::geometry::builder::{build_graph, construction_layers, construction_order};
use geoseq::geometry::entity::{Entity, EntityMap};
use geoseq::topology::sequence::{layers, sequence};
use util::*;

#[test]
fn filled_square_batches_by_depth() -> Result<(), GeoSeqError> {
    let map = filled_square();
    let layering = construction_layers(&map)?;
    assert_eq!(layering.num_layers(), 3);
    assert_eq!(ids(&layering.layers[0]), vec!["x1", "x2", "x3", "x4"]);
    assert_eq!(ids(&layering.layers[1]), vec!["line1", "line2", "line3", "line4"]);
    assert_eq!(ids(&layering.layers[2]), vec!["surface1"]);
    assert_eq!(
        ids(&construction_order(&map)?),
        vec!["x1", "x2", "x3", "x4", "line1", "line2", "line3", "line4", "surface1"]
    );
    Ok(())
}

#[test]
fn holes_declared_later_still_come_first() -> Result<(), GeoSeqError> {
    let mut v = square();
    v.push(Entity::plane_surface(
        "surface1",
        ["line1", "line2", "line3", "line4"],
        vec![vec!["circle1".into()], vec!["circle2".into()]],
    ));
    v.push(Entity::circle("circle1", [0.3, 0.3, 0.0], 0.1));
    v.push(Entity::circle("circle2", [0.7, 0.7, 0.0], 0.1));
    let map = EntityMap::from_entities(v)?;

    let order = construction_order(&map)?;
    assert!(pos(&order, "circle1") < pos(&order, "surface1"));
    assert!(pos(&order, "circle2") < pos(&order, "surface1"));
    assert_eq!(
        ids(&order),
        vec![
            "x1", "x2", "x3", "x4", "circle1", "circle2", "line1", "line2", "line3", "line4",
            "surface1"
        ]
    );
    Ok(())
}

#[test]
fn volume_with_undeclared_surface_is_rejected() {
    let mut v = square();
    v.push(Entity::surface_filling(
        "surface1",
        ["line1", "line2", "line3", "line4"],
    ));
    v.push(Entity::volume("vol1", ["surface1", "surface9"], vec![]));
    let map = EntityMap::from_entities(v).unwrap();
    assert_eq!(
        construction_order(&map).unwrap_err(),
        GeoSeqError::DanglingReference {
            entity: "vol1".into(),
            missing: "surface9".into()
        }
    );
}

#[test]
fn diamond_dependency_is_emitted_once() -> Result<(), GeoSeqError> {
    let g = graph_from(&[0, 1, 2, 3], &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    let layering = layers(&g)?;
    assert_eq!(layering.layers, vec![vec![0], vec![1, 2], vec![3]]);
    assert_eq!(layering.depth_of(&3), Some(2));
    assert_eq!(sequence(&g)?, vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn batch_order_follows_insertion_not_value() -> Result<(), GeoSeqError> {
    let g = graph_from(&[9, 4, 7], &[]);
    assert_eq!(sequence(&g)?, vec![9, 4, 7]);
    Ok(())
}

#[test]
fn repeated_sequencing_is_identical() -> Result<(), GeoSeqError> {
    let map = tetrahedron();
    let graph = build_graph(&map)?;
    let first = sequence(&graph)?;
    for _ in 0..5 {
        assert_eq!(sequence(&graph)?, first);
    }
    assert_eq!(construction_order(&map)?, first);
    assert_eq!(ids(&first).last(), Some(&"vol"));
    Ok(())
}

#[test]
fn mutually_referencing_lines_are_a_cycle() {
    let map = EntityMap::from_entities([
        Entity::point("p", [0.0; 3]),
        Entity::line("l1", "l2", "p"),
        Entity::line("l2", "l1", "p"),
    ])
    .unwrap();
    match construction_order(&map) {
        Err(GeoSeqError::CyclicDependency { mut remaining }) => {
            remaining.sort();
            assert_eq!(remaining, vec!["l1".to_string(), "l2".to_string()]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn empty_description_has_empty_order() -> Result<(), GeoSeqError> {
    let map = EntityMap::new();
    assert!(construction_order(&map)?.is_empty());
    assert_eq!(construction_layers(&map)?.num_layers(), 0);
    Ok(())
}
