//! Property tests for the relation algebra and for propagation.

use proptest::prelude::*;

use chronolink::temporal::{allen_relation, Interval};
use chronolink::{compose, RelationSet, TemporalGraph};

mod support;

use support::{graph_with, ordered_pairs};

const IDS: [&str; 5] = ["n0", "n1", "n2", "n3", "n4"];

fn relation_set() -> impl Strategy<Value = RelationSet> {
    (1u16..(1 << 13)).prop_map(RelationSet::from_bits)
}

fn assertion() -> impl Strategy<Value = (usize, usize, RelationSet)> {
    (0usize..IDS.len(), 0usize..IDS.len(), relation_set())
        .prop_filter("distinct endpoints", |(a, b, _)| a != b)
}

fn closed(assertions: &[(usize, usize, RelationSet)]) -> TemporalGraph {
    let mut graph = graph_with(&IDS);
    for (a, b, rel) in assertions {
        graph.assert_relation(IDS[*a], IDS[*b], *rel).unwrap();
    }
    graph
}

fn snapshot(graph: &TemporalGraph) -> Vec<Option<RelationSet>> {
    ordered_pairs(graph)
        .iter()
        .map(|(a, b)| graph.relation(a, b).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn prop_invert_is_involution(rel in relation_set()) {
        prop_assert_eq!(rel.invert().invert(), rel);
        prop_assert_eq!(rel.invert().len(), rel.len());
    }

    #[test]
    fn prop_composition_respects_converse(a in relation_set(), b in relation_set()) {
        let forward = compose(a, b).map(RelationSet::invert);
        let backward = compose(b.invert(), a.invert());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_composition_contains_concrete_witness(
        (x1, x2) in (0i64..6, 0i64..6).prop_filter("proper", |(s, e)| s < e),
        (y1, y2) in (0i64..6, 0i64..6).prop_filter("proper", |(s, e)| s < e),
        (z1, z2) in (0i64..6, 0i64..6).prop_filter("proper", |(s, e)| s < e),
    ) {
        let x = Interval::new(x1, x2).unwrap();
        let y = Interval::new(y1, y2).unwrap();
        let z = Interval::new(z1, z2).unwrap();
        let xy = RelationSet::single(allen_relation(&x, &y));
        let yz = RelationSet::single(allen_relation(&y, &z));
        let xz = allen_relation(&x, &z);
        if let Some(composed) = compose(xy, yz) {
            prop_assert!(composed.contains(xz));
        }
    }

    #[test]
    fn prop_edges_only_narrow(assertions in prop::collection::vec(assertion(), 1..8)) {
        let mut graph = graph_with(&IDS);
        let mut previous = snapshot(&graph);
        for (a, b, rel) in &assertions {
            graph.assert_relation(IDS[*a], IDS[*b], *rel).unwrap();
            let current = snapshot(&graph);
            for (before, after) in previous.iter().zip(&current) {
                if let (Some(before), Some(after)) = (before, after) {
                    prop_assert!(after.is_subset_of(*before));
                }
                prop_assert!(!(before.is_some() && after.is_none()));
            }
            previous = current;
        }
    }

    #[test]
    fn prop_reassertion_is_idempotent(assertions in prop::collection::vec(assertion(), 1..8)) {
        let mut graph = closed(&assertions);
        let before = snapshot(&graph);
        let log = graph.accepted_constraints().len();
        let inconsistencies = graph.inconsistencies().len();
        for (a, b, rel) in &assertions {
            graph.assert_relation(IDS[*a], IDS[*b], *rel).unwrap();
        }
        prop_assert_eq!(snapshot(&graph), before);
        prop_assert_eq!(graph.accepted_constraints().len(), log);
        // Re-asserting a conflicting constraint reports it again
        prop_assert!(graph.inconsistencies().len() >= inconsistencies);
    }

    #[test]
    fn prop_consistent_closure_is_symmetric(assertions in prop::collection::vec(assertion(), 1..6)) {
        let graph = closed(&assertions);
        prop_assume!(graph.is_consistent());
        for (a, b) in ordered_pairs(&graph) {
            let forward = graph.relation(&a, &b).unwrap();
            let backward = graph.relation(&b, &a).unwrap();
            if let (Some(forward), Some(backward)) = (forward, backward) {
                prop_assert!(!forward.intersect(backward.invert()).is_empty());
            }
        }
    }

    #[test]
    fn prop_reduction_is_non_expanding(assertions in prop::collection::vec(assertion(), 1..8)) {
        let mut graph = closed(&assertions);
        let before = snapshot(&graph);
        graph.reduce().unwrap();
        let after = snapshot(&graph);
        for (before, after) in before.iter().zip(&after) {
            if let Some(after) = after {
                prop_assert_eq!(Some(*after), *before);
                prop_assert!(!after.is_disjunction());
            }
        }
    }
}

