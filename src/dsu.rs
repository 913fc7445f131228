//! # Disjoint Set Union over graph nodes
//!
//! Union-Find used to identify equivalence classes of nodes linked by equality
//! relations. Classes are reported, never merged into the graph.

use crate::model::NodeId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Union-Find with union by rank and path halving
#[derive(Debug, Clone, Default)]
pub struct NodeDsu {
    parent: FxHashMap<NodeId, NodeId>,
    rank: FxHashMap<NodeId, u32>,
}

impl NodeDsu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node as its own singleton set
    pub fn add_node(&mut self, node: NodeId) {
        self.parent.entry(node).or_insert(node);
        self.rank.entry(node).or_insert(0);
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        self.parent.contains_key(&node)
    }

    /// Find the root of a node. Untracked nodes are their own root.
    pub fn find(&mut self, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let Some(&parent) = self.parent.get(&current) else {
                return current;
            };
            if parent == current {
                return current;
            }
            // Path halving: point every other node to its grandparent
            let grandparent = self.parent.get(&parent).copied().unwrap_or(parent);
            self.parent.insert(current, grandparent);
            current = grandparent;
        }
    }

    /// Merge the sets containing `a` and `b`. Returns false if already joined.
    pub fn union(&mut self, a: NodeId, b: NodeId) -> bool {
        self.add_node(a);
        self.add_node(b);
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        let rank_a = self.rank.get(&root_a).copied().unwrap_or(0);
        let rank_b = self.rank.get(&root_b).copied().unwrap_or(0);
        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else if rank_a > rank_b {
            self.parent.insert(root_b, root_a);
        } else {
            self.parent.insert(root_b, root_a);
            self.rank.insert(root_a, rank_a + 1);
        }
        true
    }

    pub fn same_class(&mut self, a: NodeId, b: NodeId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Group every tracked node into its class. Singletons are dropped.
    pub fn classes(&mut self) -> EquivalenceClasses {
        let nodes: Vec<NodeId> = self.parent.keys().copied().collect();
        let mut grouped: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
        for node in nodes {
            let root = self.find(node);
            grouped.entry(root).or_default().push(node);
        }

        let mut classes: Vec<EquivalenceClass> = grouped
            .into_values()
            .filter(|members| members.len() > 1)
            .map(EquivalenceClass::new)
            .collect();
        classes.sort_by_key(|class| class.representative);
        EquivalenceClasses { classes }
    }
}

/// A set of nodes that denote the same interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceClass {
    /// Lowest node index in the class
    pub representative: NodeId,
    /// Members in index order, representative included
    pub members: Vec<NodeId>,
}

impl EquivalenceClass {
    fn new(mut members: Vec<NodeId>) -> Self {
        members.sort_unstable();
        Self {
            representative: members[0],
            members,
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.binary_search(&node).is_ok()
    }
}

/// All non-trivial equivalence classes of a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceClasses {
    pub classes: Vec<EquivalenceClass>,
}

impl EquivalenceClasses {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_of(&self, node: NodeId) -> Option<&EquivalenceClass> {
        self.classes.iter().find(|class| class.contains(node))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquivalenceClass> {
        self.classes.iter()
    }
}
