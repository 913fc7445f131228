//! End-to-end propagation scenarios.
//!
//! 1. Transitive closure with converse edges
//! 2. Inconsistency detection between a user assertion and the closure
//! 3. Disjunctive assertions narrowing each other
//! 4. Document facade over events, instances and timexes

use chronolink::{
    close_document, AllenRelation, ConstraintSource, GraphError, GraphSettings, History,
};

mod support;

use support::{event_document, graph_with, ordered_pairs, relset};

#[test]
fn before_chain_closes_transitively() {
    let mut graph = graph_with(&["e1", "e2", "e3"]);
    graph.assert_relation("e1", "e2", relset("<")).unwrap();
    graph.assert_relation("e2", "e3", relset("<")).unwrap();

    assert_eq!(graph.relation("e1", "e3").unwrap(), Some(relset("<")));
    assert_eq!(graph.relation("e3", "e1").unwrap(), Some(relset(">")));

    let edges = graph.get_edges();
    assert_eq!(edges.len(), 6);
    assert!(edges.iter().all(|edge| edge.node1 != edge.node2));
}

#[test]
fn converse_edge_points_at_its_origin() {
    let mut graph = graph_with(&["a", "b"]);
    graph.assert_relation("a", "b", relset("m")).unwrap();

    let forward = graph.edge("a", "b").unwrap().constraint.unwrap();
    let backward = graph.edge("b", "a").unwrap().constraint.unwrap();
    let converse = graph.constraint(backward).unwrap();
    assert_eq!(converse.source, ConstraintSource::ClosureInverted);
    assert_eq!(converse.history, History::Inverse(forward));
    assert_eq!(converse.relset, relset("mi"));
}

#[test]
fn contradicting_assertion_is_reported() {
    let mut graph = graph_with(&["e1", "e2"]);
    graph.assert_relation("e1", "e2", relset("<")).unwrap();
    let report = graph.assert_relation("e1", "e2", relset(">")).unwrap();

    assert!(!graph.is_consistent());
    let err = report.into_result().unwrap_err();
    assert_eq!(
        err,
        GraphError::Inconsistent {
            from: "e1".to_string(),
            to: "e2".to_string(),
            asserted: relset(">"),
            existing: relset("<"),
        }
    );
    assert_eq!(graph.relation("e1", "e2").unwrap(), Some(relset("<")));
}

#[test]
fn closure_conflict_is_reported_as_derived() {
    let mut graph = graph_with(&["a", "b", "c"]);
    graph.assert_relation("a", "b", relset("<")).unwrap();
    graph.assert_relation("b", "c", relset("<")).unwrap();
    let report = graph.assert_relation("c", "a", relset("<")).unwrap();

    assert!(!report.is_consistent());
    assert!(report
        .inconsistencies
        .iter()
        .all(|inconsistency| inconsistency.cycle == 3));
    assert!(!graph.is_consistent());
}

#[test]
fn disjunctions_narrow_to_intersection() {
    let mut graph = graph_with(&["a", "b"]);
    graph.assert_relation("a", "b", relset("< m o")).unwrap();
    let report = graph.assert_relation("a", "b", relset("m o s")).unwrap();

    assert!(report.is_consistent());
    assert_eq!(report.accepted, 2);
    assert_eq!(graph.relation("a", "b").unwrap(), Some(relset("m o")));
    assert_eq!(graph.relation("b", "a").unwrap(), Some(relset("mi oi")));
}

#[test]
fn closure_through_composition_table() {
    let mut graph = graph_with(&["a", "b", "c"]);
    graph.assert_relation("a", "b", relset("s")).unwrap();
    graph.assert_relation("b", "c", relset("f")).unwrap();
    assert_eq!(graph.relation("a", "c").unwrap(), Some(relset("d")));

    let mut graph = graph_with(&["a", "b", "c"]);
    graph.assert_relation("a", "b", relset("d")).unwrap();
    graph.assert_relation("b", "c", relset("di")).unwrap();
    // Full relation sets are never stored
    assert_eq!(graph.relation("a", "c").unwrap(), None);
}

#[test]
fn closed_graph_is_symmetric() {
    let mut graph = graph_with(&["a", "b", "c", "d"]);
    graph.assert_relation("a", "b", relset("< m")).unwrap();
    graph.assert_relation("b", "c", relset("o")).unwrap();
    graph.assert_relation("d", "c", relset("d")).unwrap();

    for (from, to) in ordered_pairs(&graph) {
        let forward = graph.relation(&from, &to).unwrap();
        let backward = graph.relation(&to, &from).unwrap();
        assert_eq!(forward.map(|r| r.invert()), backward, "{from} -> {to}");
    }
}

#[test]
fn derivation_reaches_user_assertions() {
    let mut graph = graph_with(&["a", "b", "c"]);
    graph.assert_relation("a", "b", relset("<")).unwrap();
    graph.assert_relation("b", "c", relset("m")).unwrap();

    let chain = graph.derivation("a", "c").unwrap();
    assert_eq!(chain[0].relset, relset("<"));
    let users: Vec<_> = chain
        .iter()
        .filter(|c| c.source == ConstraintSource::User)
        .collect();
    assert_eq!(users.len(), 2);
    assert!(graph.derivation("c", "c").unwrap().is_empty());
}

#[test]
fn document_facade_closes_events_and_timexes() {
    let document = event_document(
        3,
        &[
            ("ei1", "ei2", "BEFORE"),
            ("ei2", "ei3", "IBEFORE"),
            ("ei3", "t1", "IS_INCLUDED"),
        ],
    );
    let outcome = close_document(&document, GraphSettings::default(), false).unwrap();

    assert!(outcome.is_consistent());
    assert_eq!(outcome.graph.node_count(), 4);
    assert!(outcome.graph.node("t1").unwrap().is_timex());
    assert_eq!(
        outcome.graph.relation("ei1", "ei3").unwrap(),
        Some(relset("<"))
    );
    assert_eq!(
        outcome
            .graph
            .relation("ei1", "ei3")
            .unwrap()
            .and_then(|r| r.as_single()),
        Some(AllenRelation::Precedes)
    );
    assert_eq!(outcome.propagation.len(), 3);
    assert_eq!(outcome.propagation[2].cycle, 3);
}

#[test]
fn unknown_node_is_fatal_for_the_call() {
    let mut graph = graph_with(&["a"]);
    assert_eq!(
        graph.assert_relation("a", "b", relset("<")),
        Err(GraphError::UnknownNode("b".to_string()))
    );
    assert!(graph.get_edges().is_empty());
}
