//! # Edges
//!
//! Dense storage of directed edges. Every ordered pair of nodes owns exactly one slot,
//! so lookups during composition are a single index computation. Adjacency is never
//! stored: a node's incoming and outgoing edges are the populated cells of its column
//! and row.

use crate::composition::CompositionTable;
use crate::constraint::{Constraint, ConstraintId};
use crate::dsu::EquivalenceClasses;
use crate::model::NodeId;
use crate::relation::RelationSet;
use serde::{Deserialize, Serialize};

/// A directed slot between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub node1: NodeId,
    pub node2: NodeId,
    /// Most specific relation set known so far; `None` means no information
    pub relset: Option<RelationSet>,
    /// The accepted constraint that produced `relset`
    pub constraint: Option<ConstraintId>,
}

impl Edge {
    pub fn new(node1: NodeId, node2: NodeId) -> Self {
        Self {
            node1,
            node2,
            relset: None,
            constraint: None,
        }
    }

    /// Record `constraint` (stored in the log under `id`) as this edge's relation.
    pub fn add_constraint(&mut self, id: ConstraintId, constraint: &Constraint) {
        self.relset = Some(constraint.relset);
        self.constraint = Some(id);
    }

    pub fn remove_constraint(&mut self) {
        self.relset = None;
        self.constraint = None;
    }

    pub fn has_constraint(&self) -> bool {
        self.constraint.is_some()
    }

    pub fn is_self_loop(&self) -> bool {
        self.node1 == self.node2
    }

    /// True if some other path `node1 -> k -> node2` composes to exactly this edge's
    /// relation set. Only reads the matrix.
    ///
    /// Within an equivalence class only the representative may serve as `k` for an
    /// edge touching that class, so two members never derive each other's edges.
    pub fn is_derivable(
        &self,
        matrix: &EdgeMatrix,
        table: &CompositionTable,
        classes: &EquivalenceClasses,
    ) -> bool {
        let Some(relset) = self.relset else {
            return false;
        };
        (0..matrix.size()).map(|k| NodeId(k as u32)).any(|k| {
            if k == self.node1 || k == self.node2 {
                return false;
            }
            if let Some(class) = classes.class_of(k) {
                if k != class.representative
                    && (class.contains(self.node1) || class.contains(self.node2))
                {
                    return false;
                }
            }
            let first = matrix.get(self.node1, k).relset;
            let second = matrix.get(k, self.node2).relset;
            table.compose_rels(first, second) == Some(relset)
        })
    }
}

/// Square matrix of edges indexed by node pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMatrix {
    size: usize,
    cells: Vec<Edge>,
}

impl EdgeMatrix {
    /// Allocate every slot for `size` nodes up front.
    pub fn new(size: usize) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                cells.push(Edge::new(NodeId(i as u32), NodeId(j as u32)));
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn offset(&self, node1: NodeId, node2: NodeId) -> usize {
        node1.index() * self.size + node2.index()
    }

    #[inline]
    pub fn get(&self, node1: NodeId, node2: NodeId) -> &Edge {
        &self.cells[self.offset(node1, node2)]
    }

    #[inline]
    pub fn get_mut(&mut self, node1: NodeId, node2: NodeId) -> &mut Edge {
        let offset = self.offset(node1, node2);
        &mut self.cells[offset]
    }

    /// Nodes `k` with a relation on `(k, node)`, excluding `node` itself.
    pub fn edges_in(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        (0..self.size)
            .map(move |k| self.get(NodeId(k as u32), node))
            .filter(|edge| !edge.is_self_loop() && edge.relset.is_some())
    }

    /// Nodes `k` with a relation on `(node, k)`, excluding `node` itself.
    pub fn edges_out(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        (0..self.size)
            .map(move |k| self.get(node, NodeId(k as u32)))
            .filter(|edge| !edge.is_self_loop() && edge.relset.is_some())
    }

    /// Clear the row and column of `node`.
    pub fn clear_node(&mut self, node: NodeId) {
        for k in 0..self.size {
            let other = NodeId(k as u32);
            self.get_mut(node, other).remove_constraint();
            self.get_mut(other, node).remove_constraint();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Edge> + '_ {
        self.cells.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsu::NodeDsu;
    use crate::relation::AllenRelation;

    fn set_edge(matrix: &mut EdgeMatrix, a: u32, b: u32, rel: RelationSet, id: u32) {
        let constraint = Constraint::user(NodeId(a), NodeId(b), rel);
        matrix
            .get_mut(NodeId(a), NodeId(b))
            .add_constraint(ConstraintId(id), &constraint);
    }

    #[test]
    fn test_add_and_remove_constraint() {
        let mut matrix = EdgeMatrix::new(2);
        set_edge(&mut matrix, 0, 1, AllenRelation::Precedes.into(), 0);
        let edge = matrix.get(NodeId(0), NodeId(1));
        assert!(edge.has_constraint());
        assert_eq!(edge.relset, Some(AllenRelation::Precedes.into()));

        matrix.get_mut(NodeId(0), NodeId(1)).remove_constraint();
        let edge = matrix.get(NodeId(0), NodeId(1));
        assert!(!edge.has_constraint());
        assert_eq!(edge.relset, None);
    }

    #[test]
    fn test_adjacency_views() {
        let mut matrix = EdgeMatrix::new(3);
        let before = RelationSet::single(AllenRelation::Precedes);
        set_edge(&mut matrix, 0, 1, before, 0);
        set_edge(&mut matrix, 2, 1, before, 1);
        set_edge(&mut matrix, 1, 1, before, 2);

        let incoming: Vec<NodeId> = matrix.edges_in(NodeId(1)).map(|e| e.node1).collect();
        assert_eq!(incoming, vec![NodeId(0), NodeId(2)]);
        assert_eq!(matrix.edges_out(NodeId(1)).count(), 0);

        matrix.clear_node(NodeId(2));
        assert_eq!(matrix.edges_in(NodeId(1)).count(), 1);
    }

    #[test]
    fn test_is_derivable() {
        let table = CompositionTable::global();
        let mut matrix = EdgeMatrix::new(3);
        let before = RelationSet::single(AllenRelation::Precedes);
        set_edge(&mut matrix, 0, 1, before, 0);
        set_edge(&mut matrix, 1, 2, before, 1);
        set_edge(&mut matrix, 0, 2, before, 2);

        let classes = EquivalenceClasses::default();
        assert!(matrix.get(NodeId(0), NodeId(2)).is_derivable(&matrix, table, &classes));
        assert!(!matrix.get(NodeId(0), NodeId(1)).is_derivable(&matrix, table, &classes));
        assert!(!matrix.get(NodeId(2), NodeId(0)).is_derivable(&matrix, table, &classes));
    }

    #[test]
    fn test_equal_members_derive_only_through_representative() {
        let table = CompositionTable::global();
        let mut matrix = EdgeMatrix::new(3);
        let equals = RelationSet::single(AllenRelation::Equals);
        let before = RelationSet::single(AllenRelation::Precedes);
        set_edge(&mut matrix, 0, 1, equals, 0);
        set_edge(&mut matrix, 1, 0, equals, 1);
        set_edge(&mut matrix, 0, 2, before, 2);
        set_edge(&mut matrix, 1, 2, before, 3);

        let mut dsu = NodeDsu::new();
        dsu.union(NodeId(0), NodeId(1));
        let classes = dsu.classes();

        assert!(!matrix.get(NodeId(0), NodeId(2)).is_derivable(&matrix, table, &classes));
        assert!(matrix.get(NodeId(1), NodeId(2)).is_derivable(&matrix, table, &classes));
        // Without the classes each edge derives the other
        let none = EquivalenceClasses::default();
        assert!(matrix.get(NodeId(0), NodeId(2)).is_derivable(&matrix, table, &none));
    }
}
