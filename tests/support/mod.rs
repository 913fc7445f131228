use chronolink::model::{EventRecord, InstanceRecord, RelationAssertion, TimexRecord};
use chronolink::{Document, GraphBuilder, GraphSettings, RelationSet, TemporalGraph};

/// Graph of timex nodes with the given ids.
#[allow(dead_code)]
pub fn graph_with(ids: &[&str]) -> TemporalGraph {
    graph_with_settings(ids, GraphSettings::default())
}

#[allow(dead_code)]
pub fn graph_with_settings(ids: &[&str], settings: GraphSettings) -> TemporalGraph {
    let mut builder = GraphBuilder::new().with_settings(settings);
    for id in ids {
        builder
            .add_timex(&TimexRecord::new(*id))
            .expect("unique node id");
    }
    builder.build()
}

#[allow(dead_code)]
pub fn relset(text: &str) -> RelationSet {
    text.parse().expect("valid relation set")
}

/// A document with events `e1..=n` (instances `ei1..=n`), one timex `t1`, and the
/// given assertions.
#[allow(dead_code)]
pub fn event_document(events: usize, assertions: &[(&str, &str, &str)]) -> Document {
    Document {
        source: Some("fixture.tml".to_string()),
        timexes: vec![TimexRecord::new("t1").with_type("DATE")],
        events: (1..=events)
            .map(|i| EventRecord::new(format!("e{i}")))
            .collect(),
        instances: (1..=events)
            .map(|i| InstanceRecord::new(format!("ei{i}"), format!("e{i}")))
            .collect(),
        assertions: assertions
            .iter()
            .map(|(from, to, rel)| RelationAssertion::new(*from, *to, relset(rel)))
            .collect(),
    }
}

/// Every ordered pair of distinct active node ids.
#[allow(dead_code)]
pub fn ordered_pairs(graph: &TemporalGraph) -> Vec<(String, String)> {
    let ids: Vec<String> = graph.nodes().map(|n| n.id.clone()).collect();
    let mut pairs = Vec::new();
    for a in &ids {
        for b in &ids {
            if a != b {
                pairs.push((a.clone(), b.clone()));
            }
        }
    }
    pairs
}
