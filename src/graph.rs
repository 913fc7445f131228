//! # Temporal Graph
//!
//! Owns the node table, the dense edge matrix, the propagation queue, and the log of
//! accepted constraints.
//!
//! A graph is built in two phases. [`GraphBuilder`] collects every node of a document;
//! [`GraphBuilder::build`] sizes the edge matrix from the final node count and hands
//! back a [`TemporalGraph`], which accepts constraints but no further nodes.
//!
//! Propagation is Allen's path-consistency algorithm: each accepted constraint on
//! `(i, j)` is mirrored onto `(j, i)` and composed with every known edge into `i` and
//! out of `j`. Anything that narrows an edge goes back on the FIFO queue until the
//! queue drains.

use crate::composition::CompositionTable;
use crate::config::{GraphSettings, DUMP_STAGE_SUFFIXES};
use crate::conflicts::{Inconsistency, PropagationReport, ReductionReport};
use crate::constraint::{Constraint, ConstraintId, ConstraintSource, History};
use crate::dsu::{EquivalenceClasses, NodeDsu};
use crate::edge::{Edge, EdgeMatrix};
use crate::error::{GraphError, GraphResult};
use crate::model::{Document, EventRecord, InstanceRecord, Node, NodeId, TimexRecord};
use crate::relation::{AllenRelation, RelationSet};
use crate::render;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{debug, info, instrument, trace, warn};

/// Collects nodes before the edge matrix exists
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    index: FxHashMap<String, NodeId>,
    settings: GraphSettings,
    source: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Name of the document the graph is built for
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert(&mut self, make: impl FnOnce(NodeId) -> Node) -> GraphResult<NodeId> {
        let index = NodeId(self.nodes.len() as u32);
        let node = make(index);
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), index);
        self.nodes.push(node);
        Ok(index)
    }

    pub fn add_timex(&mut self, timex: &TimexRecord) -> GraphResult<NodeId> {
        self.insert(|index| Node::timex(index, timex))
    }

    pub fn add_event(
        &mut self,
        event: &EventRecord,
        instance: &InstanceRecord,
    ) -> GraphResult<NodeId> {
        self.insert(|index| Node::event(index, event, instance))
    }

    /// Add all timexes, then one node per event instance.
    ///
    /// Every event needs at least one instance. Instances of unknown events are
    /// skipped.
    pub fn add_nodes(
        &mut self,
        events: &[EventRecord],
        instances: &[InstanceRecord],
        timexes: &[TimexRecord],
    ) -> GraphResult<()> {
        for timex in timexes {
            self.add_timex(timex)?;
        }

        let events_by_id: FxHashMap<&str, &EventRecord> =
            events.iter().map(|e| (e.eid.as_str(), e)).collect();
        let instantiated: FxHashSet<&str> =
            instances.iter().map(|i| i.event_id.as_str()).collect();
        if let Some(orphan) = events
            .iter()
            .find(|e| !instantiated.contains(e.eid.as_str()))
        {
            return Err(GraphError::MissingInstance(orphan.eid.clone()));
        }

        for instance in instances {
            match events_by_id.get(instance.event_id.as_str()) {
                Some(event) => {
                    self.add_event(event, instance)?;
                }
                None => warn!(
                    eiid = %instance.eiid,
                    event = %instance.event_id,
                    "skipping instance of unknown event"
                ),
            }
        }
        Ok(())
    }

    /// Freeze the node set and allocate the edge matrix.
    pub fn build(self) -> TemporalGraph {
        let size = self.nodes.len();
        debug!(nodes = size, "building edge matrix");
        TemporalGraph {
            source: self.source,
            settings: self.settings,
            compositions: CompositionTable::global(),
            active: vec![true; size],
            nodes: self.nodes,
            index: self.index,
            edges: EdgeMatrix::new(size),
            queue: VecDeque::new(),
            log: Vec::new(),
            cycle: 0,
            inconsistencies: Vec::new(),
            equivalence: EquivalenceClasses::default(),
            reduced: false,
        }
    }
}

/// The constraint network of one document
#[derive(Debug, Clone)]
pub struct TemporalGraph {
    source: Option<String>,
    settings: GraphSettings,
    compositions: &'static CompositionTable,
    nodes: Vec<Node>,
    index: FxHashMap<String, NodeId>,
    active: Vec<bool>,
    edges: EdgeMatrix,
    queue: VecDeque<Constraint>,
    /// Accepted constraints; edges and histories point into this log
    log: Vec<Constraint>,
    cycle: u32,
    inconsistencies: Vec<Inconsistency>,
    equivalence: EquivalenceClasses,
    reduced: bool,
}

impl TemporalGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Build a graph holding every node of `document`. Assertions are not propagated.
    pub fn from_document(document: &Document, settings: GraphSettings) -> GraphResult<Self> {
        let mut builder = GraphBuilder::new().with_settings(settings);
        if let Some(source) = &document.source {
            builder = builder.with_source(source.clone());
        }
        builder.add_nodes(&document.events, &document.instances, &document.timexes)?;
        Ok(builder.build())
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Index of an active node.
    pub fn node_id(&self, id: &str) -> GraphResult<NodeId> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|index| &self.nodes[index.index()])
    }

    pub fn node_at(&self, index: NodeId) -> Option<&Node> {
        self.nodes
            .get(index.index())
            .filter(|_| self.is_active(index))
    }

    fn external_id(&self, index: NodeId) -> String {
        self.nodes
            .get(index.index())
            .map(|node| node.id.clone())
            .unwrap_or_else(|| index.to_string())
    }

    fn is_active(&self, index: NodeId) -> bool {
        self.active.get(index.index()).copied().unwrap_or(false)
    }

    /// Active nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|node| self.is_active(node.index))
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Remove a node: clear its row and column and drop it from the node table.
    pub fn remove_node(&mut self, id: &str) -> GraphResult<()> {
        let index = self.node_id(id)?;
        self.edges.clear_node(index);
        self.active[index.index()] = false;
        self.index.remove(id);
        debug!(node = id, "removed node");
        Ok(())
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Assert `relset` between two nodes given by external id and propagate it.
    pub fn assert_relation(
        &mut self,
        from: &str,
        to: &str,
        relset: RelationSet,
    ) -> GraphResult<PropagationReport> {
        let node1 = self.node_id(from)?;
        let node2 = self.node_id(to)?;
        self.propagate(Constraint::user(node1, node2, relset))
    }

    /// Integrate `constraint` and run the queue to a fixpoint.
    ///
    /// Inconsistencies do not abort the run; they are collected in the report and in
    /// [`TemporalGraph::inconsistencies`].
    #[instrument(level = "debug", skip_all, fields(cycle = self.cycle + 1, relset = %constraint.relset))]
    pub fn propagate(&mut self, constraint: Constraint) -> GraphResult<PropagationReport> {
        if self.reduced {
            return Err(GraphError::AlreadyReduced);
        }
        for node in [constraint.node1, constraint.node2] {
            if !self.is_active(node) {
                return Err(GraphError::UnknownNode(self.external_id(node)));
            }
        }
        if constraint.relset.is_empty() || constraint.node1 == constraint.node2 {
            return Err(GraphError::MalformedRelationSet {
                from: self.external_id(constraint.node1),
                to: self.external_id(constraint.node2),
                relset: constraint.relset,
            });
        }

        self.cycle += 1;
        let mut report = PropagationReport::new(self.cycle);
        self.queue.push_back(constraint);

        while let Some(mut constraint) = self.queue.pop_front() {
            constraint.cycle = self.cycle;
            report.processed += 1;
            trace!(%constraint, "pop queue");

            let existing_relset = self.edges.get(constraint.node1, constraint.node2).relset;
            let intersection = match existing_relset {
                None => constraint.relset,
                Some(existing) => {
                    let intersection = existing.intersect(constraint.relset);
                    if intersection.is_empty() {
                        self.record_inconsistency(constraint, existing, &mut report);
                        continue;
                    }
                    if intersection == existing {
                        continue;
                    }
                    intersection
                }
            };

            constraint.relset = intersection;
            let id = self.accept(constraint);
            report.accepted += 1;
            self.derive_from(id, &mut report);
        }

        debug!(
            processed = report.processed,
            accepted = report.accepted,
            derived = report.derived,
            inconsistencies = report.inconsistencies.len(),
            "propagation reached fixpoint"
        );
        Ok(report)
    }

    fn accept(&mut self, constraint: Constraint) -> ConstraintId {
        let id = ConstraintId(self.log.len() as u32);
        self.edges
            .get_mut(constraint.node1, constraint.node2)
            .add_constraint(id, &constraint);
        self.log.push(constraint);
        id
    }

    /// Mirror the accepted constraint onto the converse edge, then compose it with
    /// the edges into its first node and out of its second node.
    fn derive_from(&mut self, id: ConstraintId, report: &mut PropagationReport) {
        let (node_i, node_j, relset_i_j) = {
            let c = &self.log[id.index()];
            (c.node1, c.node2, c.relset)
        };

        self.combine(
            node_j,
            node_i,
            relset_i_j.invert(),
            ConstraintSource::ClosureInverted,
            History::Inverse(id),
            report,
        );

        // node_k --> node_i --> node_j
        let incoming: Vec<(NodeId, RelationSet, ConstraintId)> = self
            .edges
            .edges_in(node_i)
            .filter(|edge| edge.node1 != node_j)
            .filter_map(|edge| Some((edge.node1, edge.relset?, edge.constraint?)))
            .collect();
        for (node_k, relset_k_i, c_k_i) in incoming {
            if let Some(relset_k_j) = self.compositions.compose(relset_k_i, relset_i_j) {
                self.combine(
                    node_k,
                    node_j,
                    relset_k_j,
                    ConstraintSource::Closure,
                    History::Composed(c_k_i, id),
                    report,
                );
            }
        }

        // node_i --> node_j --> node_k
        let outgoing: Vec<(NodeId, RelationSet, ConstraintId)> = self
            .edges
            .edges_out(node_j)
            .filter(|edge| edge.node2 != node_i)
            .filter_map(|edge| Some((edge.node2, edge.relset?, edge.constraint?)))
            .collect();
        for (node_k, relset_j_k, c_j_k) in outgoing {
            if let Some(relset_i_k) = self.compositions.compose(relset_i_j, relset_j_k) {
                self.combine(
                    node_i,
                    node_k,
                    relset_i_k,
                    ConstraintSource::Closure,
                    History::Composed(id, c_j_k),
                    report,
                );
            }
        }
    }

    /// Queue `relset` for `(node1, node2)` if it narrows what the edge holds.
    fn combine(
        &mut self,
        node1: NodeId,
        node2: NodeId,
        relset: RelationSet,
        source: ConstraintSource,
        history: History,
        report: &mut PropagationReport,
    ) {
        let existing_relset = self.edges.get(node1, node2).relset;
        let narrowed = match existing_relset {
            None => relset,
            Some(existing) => {
                let intersection = existing.intersect(relset);
                if intersection.is_empty() {
                    let constraint =
                        Constraint::derived(node1, node2, relset, source, history, self.cycle);
                    self.record_inconsistency(constraint, existing, report);
                    return;
                }
                if intersection.len() >= existing.len() {
                    return;
                }
                intersection
            }
        };

        self.queue.push_back(Constraint::derived(
            node1, node2, narrowed, source, history, self.cycle,
        ));
        report.derived += 1;

        if self.settings.add_inverted && source == ConstraintSource::Closure {
            self.queue.push_back(Constraint::derived(
                node2,
                node1,
                narrowed.invert(),
                ConstraintSource::ClosureInverted,
                history,
                self.cycle,
            ));
            report.derived += 1;
        }
    }

    fn record_inconsistency(
        &mut self,
        constraint: Constraint,
        existing: RelationSet,
        report: &mut PropagationReport,
    ) {
        let inconsistency = Inconsistency {
            from: self.external_id(constraint.node1),
            to: self.external_id(constraint.node2),
            existing,
            cycle: self.cycle,
            constraint,
        };
        warn!(
            from = %inconsistency.from,
            to = %inconsistency.to,
            source = %inconsistency.constraint.source,
            asserted = %inconsistency.constraint.relset,
            existing = %existing,
            "inconsistent constraint"
        );
        report.inconsistencies.push(inconsistency.clone());
        self.inconsistencies.push(inconsistency);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of completed `propagate` calls.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn matrix(&self) -> &EdgeMatrix {
        &self.edges
    }

    /// Edge between two active nodes.
    pub fn edge(&self, from: &str, to: &str) -> GraphResult<&Edge> {
        let node1 = self.node_id(from)?;
        let node2 = self.node_id(to)?;
        Ok(self.edges.get(node1, node2))
    }

    /// Relation set on the ordered pair, `None` if nothing is known.
    pub fn relation(&self, from: &str, to: &str) -> GraphResult<Option<RelationSet>> {
        Ok(self.edge(from, to)?.relset)
    }

    /// All edges, self-loops excluded, that carry a constraint.
    pub fn get_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| !edge.is_self_loop() && edge.has_constraint())
            .collect()
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.log.get(id.index())
    }

    /// Every accepted constraint in acceptance order.
    pub fn accepted_constraints(&self) -> &[Constraint] {
        &self.log
    }

    /// The constraint on an edge followed by everything it was derived from, each
    /// listed once in depth-first order.
    pub fn derivation(&self, from: &str, to: &str) -> GraphResult<Vec<&Constraint>> {
        let mut chain = Vec::new();
        let Some(root) = self.edge(from, to)?.constraint else {
            return Ok(chain);
        };
        let mut seen = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(constraint) = self.constraint(id) {
                chain.push(constraint);
                stack.extend(constraint.parents().into_iter().rev());
            }
        }
        Ok(chain)
    }

    pub fn inconsistencies(&self) -> &[Inconsistency] {
        &self.inconsistencies
    }

    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }

    pub fn equivalence_classes(&self) -> &EquivalenceClasses {
        &self.equivalence
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    // =========================================================================
    // Minimization
    // =========================================================================

    /// Turn the closed graph into a minimal one: drop the anchor node, disjunctions,
    /// derivable relations, and relations outside the normalized vocabulary, then
    /// identify equivalence classes.
    #[instrument(level = "debug", skip_all, fields(source = self.source.as_deref().unwrap_or("-")))]
    pub fn reduce(&mut self) -> GraphResult<ReductionReport> {
        if self.reduced {
            return Err(GraphError::AlreadyReduced);
        }
        self.reduced = true;
        let mut report = ReductionReport::default();

        if let Some(anchor) = self.settings.anchor_node.clone() {
            if self.index.contains_key(&anchor) {
                self.remove_node(&anchor)?;
                report.anchor_removed = true;
            } else {
                debug!(anchor = %anchor, "anchor node not present");
            }
        }

        let classes = self.identify_equivalence_classes();

        self.dump_stage(0);
        report.disjunctions = self.remove_disjunctions();
        self.dump_stage(1);
        report.derivable = self.remove_derivable_relations(&classes);
        self.dump_stage(2);
        report.unnormalized = self.normalize_relations();
        self.dump_stage(3);
        report.equivalence_classes = classes.len();
        self.equivalence = classes;
        report.remaining = self.get_edges().len();

        info!(
            disjunctions = report.disjunctions,
            derivable = report.derivable,
            unnormalized = report.unnormalized,
            equivalence_classes = report.equivalence_classes,
            remaining = report.remaining,
            "graph reduced"
        );
        Ok(report)
    }

    // TODO: merge each class into its representative once consumers of the minimal
    // graph accept rewritten node ids; classes are only identified for now.
    fn identify_equivalence_classes(&self) -> EquivalenceClasses {
        let equals = RelationSet::single(AllenRelation::Equals);
        let mut dsu = NodeDsu::new();
        for edge in self.get_edges() {
            if edge.relset == Some(equals) {
                dsu.union(edge.node1, edge.node2);
            }
        }
        dsu.classes()
    }

    fn remove_disjunctions(&mut self) -> usize {
        let mut removed = 0;
        for edge in self.edges.iter_mut() {
            if edge.relset.is_some_and(RelationSet::is_disjunction) {
                edge.remove_constraint();
                removed += 1;
            }
        }
        removed
    }

    /// Mark against the current network first, then clear, so one removal never
    /// changes the verdict on another edge in the same pass.
    fn remove_derivable_relations(&mut self, classes: &EquivalenceClasses) -> usize {
        let marked: Vec<(NodeId, NodeId)> = self
            .edges
            .iter()
            .filter(|edge| !edge.is_self_loop() && edge.has_constraint())
            .filter(|edge| edge.is_derivable(&self.edges, self.compositions, classes))
            .map(|edge| (edge.node1, edge.node2))
            .collect();
        for (node1, node2) in &marked {
            self.edges.get_mut(*node1, *node2).remove_constraint();
        }
        marked.len()
    }

    /// Keep single relations from the normalized vocabulary. Equality is symmetric,
    /// so only the direction from the lower node index survives.
    fn normalize_relations(&mut self) -> usize {
        let equals = RelationSet::single(AllenRelation::Equals);
        let mut removed = 0;
        for edge in self.edges.iter_mut() {
            let Some(relset) = edge.relset else {
                continue;
            };
            if !relset.has_normalized_relation() || (relset == equals && edge.node1 > edge.node2)
            {
                edge.remove_constraint();
                removed += 1;
            }
        }
        removed
    }

    fn dump_stage(&self, stage: usize) {
        let Some(dir) = &self.settings.dump_dir else {
            return;
        };
        let base = self
            .source
            .as_deref()
            .and_then(|s| std::path::Path::new(s).file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("graph");
        let path: PathBuf = dir.join(format!("{}.{}.html", base, DUMP_STAGE_SUFFIXES[stage]));
        if let Err(e) = render::write_html(self, &path) {
            warn!(path = %path.display(), error = %e, "failed to write graph dump");
        }
    }
}
