//! Assertion helpers for the graph invariant checks.
//!
//! Everything here is active in debug builds and under the
//! `strict-invariants` feature; otherwise the assertions are skipped at
//! compile time through `cfg!`.

use std::collections::HashSet;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

macro_rules! inv_assert {
    ($($tt:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict-invariants")) {
            assert!($($tt)*);
        }
    };
}

macro_rules! inv_assert_eq {
    ($($tt:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict-invariants")) {
            assert_eq!($($tt)*);
        }
    };
}

pub(crate) use inv_assert;
pub(crate) use inv_assert_eq;

/// Every `(src, dst)` edge recorded in a forward map.
pub(crate) fn forward_pairs<V, W>(out: &IndexMap<V, IndexMap<V, W>>) -> HashSet<(V, V)>
where
    V: Clone + Eq + Hash,
{
    out.iter()
        .flat_map(|(src, dsts)| dsts.keys().map(move |dst| (src.clone(), dst.clone())))
        .collect()
}

/// Every `(src, dst)` edge recorded in a reverse map keyed by `dst`.
pub(crate) fn reverse_pairs<V>(inc: &IndexMap<V, IndexSet<V>>) -> HashSet<(V, V)>
where
    V: Clone + Eq + Hash,
{
    inc.iter()
        .flat_map(|(dst, srcs)| srcs.iter().map(move |src| (src.clone(), dst.clone())))
        .collect()
}

/// First edge of `a` missing from `b`.
pub(crate) fn first_unmirrored<'a, V>(a: &'a HashSet<(V, V)>, b: &HashSet<(V, V)>) -> Option<&'a (V, V)>
where
    V: Eq + Hash,
{
    a.iter().find(|pair| !b.contains(*pair))
}
