//! # Chronolink
//!
//! Temporal constraint propagation and minimization over Allen interval relations.
//!
//! Events and time expressions become nodes of a graph; asserted relations between them
//! are closed under Allen's composition table with a path-consistency queue, conflicts
//! are reported rather than fatal, and the closed graph can be reduced to a minimal
//! network in a normalized relation vocabulary.

pub mod composition;
pub mod config;
pub mod conflicts;
pub mod constraint;
pub mod dsu;
pub mod edge;
pub mod error;
pub mod graph;
pub mod minimal;
pub mod model;
pub mod relation;
pub mod render;
pub mod temporal;

// Re-export main types for convenience
pub use composition::{compose, CompositionTable};
pub use config::{ChronoConfig, GraphSettings, OutputFormat};
pub use conflicts::{Inconsistency, PropagationReport, ReductionReport};
pub use constraint::{Constraint, ConstraintId, ConstraintSource, History};
pub use error::{GraphError, GraphResult};
pub use graph::{GraphBuilder, TemporalGraph};
pub use minimal::{MinimalEdge, MinimalGraph};
pub use model::{Document, Node, NodeId, NodeKind};
pub use relation::{intersect, invert, AllenRelation, RelationError, RelationSet};
pub use temporal::Interval;

use anyhow::Context;
use tracing::{info, warn};

/// Everything produced by closing one document.
#[derive(Debug, Clone)]
pub struct ClosureOutcome {
    pub graph: TemporalGraph,
    /// One report per assertion, in document order
    pub propagation: Vec<PropagationReport>,
    /// Present when the graph was reduced
    pub reduction: Option<ReductionReport>,
    pub minimal: MinimalGraph,
}

impl ClosureOutcome {
    pub fn is_consistent(&self) -> bool {
        self.graph.is_consistent()
    }
}

/// Build the graph for `document`, propagate every assertion, and optionally reduce.
///
/// Inconsistent assertions are logged and collected; unknown node ids and malformed
/// relation sets abort with an error naming the assertion.
pub fn close_document(
    document: &Document,
    settings: GraphSettings,
    reduce: bool,
) -> anyhow::Result<ClosureOutcome> {
    let mut graph = TemporalGraph::from_document(document, settings)
        .context("failed to build graph from document")?;
    info!(
        source = document.source.as_deref().unwrap_or("-"),
        nodes = graph.node_count(),
        assertions = document.assertions.len(),
        "closing document"
    );

    let mut propagation = Vec::with_capacity(document.assertions.len());
    for assertion in &document.assertions {
        let report = graph
            .assert_relation(&assertion.from, &assertion.to, assertion.relation)
            .with_context(|| {
                format!(
                    "failed to assert {{{}}} from `{}` to `{}`",
                    assertion.relation, assertion.from, assertion.to
                )
            })?;
        propagation.push(report);
    }

    if !graph.is_consistent() {
        warn!(
            inconsistencies = graph.inconsistencies().len(),
            "document is inconsistent"
        );
    }

    let reduction = if reduce {
        Some(graph.reduce().context("failed to reduce graph")?)
    } else {
        None
    };

    let minimal = MinimalGraph::from_graph(&graph);
    Ok(ClosureOutcome {
        graph,
        propagation,
        reduction,
        minimal,
    })
}
