//! # Minimal Graph Export
//!
//! Serializable snapshot of a graph's edges keyed by external node ids, meant to be
//! taken after [`TemporalGraph::reduce`].

use crate::conflicts::Inconsistency;
use crate::constraint::ConstraintSource;
use crate::graph::TemporalGraph;
use crate::model::Node;
use crate::render::compare_ids;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One relation of the exported graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalEdge {
    pub from: String,
    pub to: String,
    /// Abbreviations of the relation set, space separated
    pub relation: String,
    /// TimeML label when the relation set has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeml: Option<String>,
    pub source: ConstraintSource,
}

/// The exported graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<MinimalEdge>,
    /// Node ids that denote the same interval, one list per class
    pub equivalence_classes: Vec<Vec<String>>,
    pub inconsistencies: Vec<Inconsistency>,
    pub metadata: BTreeMap<String, String>,
}

impl MinimalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_metadata(&mut self, key: String, value: String) {
        self.metadata.insert(key, value);
    }

    /// Snapshot `graph`. Nodes and edges come out in natural id order.
    pub fn from_graph(graph: &TemporalGraph) -> Self {
        let mut export = MinimalGraph::new();
        export.add_metadata("version".to_string(), "1.0".to_string());
        export.add_metadata("reduced".to_string(), graph.is_reduced().to_string());
        if let Some(source) = graph.source() {
            export.add_metadata("source".to_string(), source.to_string());
        }

        let mut nodes: Vec<Node> = graph.nodes().cloned().collect();
        nodes.sort_by(|a, b| compare_ids(&a.id, &b.id));
        export.nodes = nodes;

        for edge in graph.get_edges() {
            let (Some(from), Some(to), Some(relset), Some(constraint)) = (
                graph.node_at(edge.node1),
                graph.node_at(edge.node2),
                edge.relset,
                edge.constraint.and_then(|id| graph.constraint(id)),
            ) else {
                continue;
            };
            export.edges.push(MinimalEdge {
                from: from.id.clone(),
                to: to.id.clone(),
                relation: relset.to_string(),
                timeml: relset.timeml_label().map(str::to_string),
                source: constraint.source,
            });
        }
        export
            .edges
            .sort_by(|a, b| compare_ids(&a.from, &b.from).then_with(|| compare_ids(&a.to, &b.to)));

        export.equivalence_classes = graph
            .equivalence_classes()
            .iter()
            .map(|class| {
                let mut ids: Vec<String> = class
                    .members
                    .iter()
                    .filter_map(|member| graph.node_at(*member))
                    .map(|node| node.id.clone())
                    .collect();
                ids.sort_by(|a, b| compare_ids(a, b));
                ids
            })
            .collect();

        export.inconsistencies = graph.inconsistencies().to_vec();
        export
    }

    /// Edges from or to a node
    pub fn edges_for(&self, id: &str) -> impl Iterator<Item = &MinimalEdge> {
        let id = id.to_string();
        self.edges
            .iter()
            .filter(move |edge| edge.from == id || edge.to == id)
    }

    /// Export to JSONL format (one JSON object per line)
    pub fn to_jsonl(&self) -> Result<String> {
        let mut lines = Vec::new();

        let metadata_line = serde_json::to_string(&self.metadata)?;
        lines.push(format!(
            "{{\"type\": \"metadata\", \"data\": {}}}",
            metadata_line
        ));

        for node in &self.nodes {
            let node_line = serde_json::to_string(&node)?;
            lines.push(format!("{{\"type\": \"node\", \"data\": {}}}", node_line));
        }

        for edge in &self.edges {
            let edge_line = serde_json::to_string(&edge)?;
            lines.push(format!("{{\"type\": \"edge\", \"data\": {}}}", edge_line));
        }

        for class in &self.equivalence_classes {
            let class_line = serde_json::to_string(&class)?;
            lines.push(format!(
                "{{\"type\": \"equivalence_class\", \"data\": {}}}",
                class_line
            ));
        }

        for inconsistency in &self.inconsistencies {
            let line = serde_json::to_string(&inconsistency)?;
            lines.push(format!("{{\"type\": \"inconsistency\", \"data\": {}}}", line));
        }

        Ok(lines.join("\n"))
    }

    /// Export to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
