mod util;
use std::collections::HashMap;

use geoseq::geo_error::GeoSeqError;
use geoseq::topology::sequence::{layers, sequence};
use proptest::prelude::*;
use util::*;

/// Random DAG over `0..n`: every edge goes from the smaller label to the
/// larger one, vertices are inserted in a shuffled order.
fn dag() -> impl Strategy<Value = (Vec<u32>, Vec<(u32, u32)>)> {
    (1u32..30).prop_flat_map(|n| {
        let order = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        let edges = prop::collection::vec((0..n, 0..n), 0..60).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect::<Vec<_>>()
        });
        (order, edges)
    })
}

proptest! {
    #[test]
    fn order_respects_every_edge((order, edges) in dag()) {
        let g = graph_from(&order, &edges);
        let seq = sequence(&g).unwrap();
        let at: HashMap<u32, usize> = seq.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        for (u, v) in &edges {
            prop_assert!(at[u] < at[v], "{u} must precede {v} in {seq:?}");
        }
    }

    #[test]
    fn order_is_a_permutation((order, edges) in dag()) {
        let g = graph_from(&order, &edges);
        let mut seq = sequence(&g).unwrap();
        prop_assert_eq!(seq.len(), order.len());
        seq.sort_unstable();
        let mut want = order.clone();
        want.sort_unstable();
        prop_assert_eq!(seq, want);
    }

    #[test]
    fn sequencing_is_deterministic((order, edges) in dag()) {
        let g = graph_from(&order, &edges);
        let a = sequence(&g).unwrap();
        let b = sequence(&graph_from(&order, &edges)).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(g.num_vertices(), order.len());
    }

    #[test]
    fn depth_is_longest_path((order, edges) in dag()) {
        let g = graph_from(&order, &edges);
        let layering = layers(&g).unwrap();
        for v in &order {
            let preds = g.predecessors(v).unwrap();
            let want = preds
                .iter()
                .map(|p| layering.depth_of(p).unwrap() + 1)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(layering.depth_of(v), Some(want));
        }
        // Each batch keeps insertion order.
        let rank: HashMap<u32, usize> = order.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        for batch in &layering.layers {
            prop_assert!(batch.windows(2).all(|w| rank[&w[0]] < rank[&w[1]]));
        }
    }

    #[test]
    fn reversed_edge_closes_a_cycle((order, edges) in dag()) {
        prop_assume!(!edges.is_empty());
        let (u, v) = edges[0];
        let mut g = graph_from(&order, &edges);
        g.add_edge(v, u);
        match sequence(&g) {
            Err(GeoSeqError::CyclicDependency { remaining }) => {
                prop_assert!(remaining.contains(&u.to_string()));
                prop_assert!(remaining.contains(&v.to_string()));
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }
}
