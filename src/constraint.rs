//! # Constraints
//!
//! A constraint proposes a relation set for one ordered node pair. It is the unit of
//! work in the propagation queue. Accepted constraints are kept in the graph's log and
//! referred to by [`ConstraintId`].

use crate::model::NodeId;
use crate::relation::RelationSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into a graph's accepted-constraint log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintId(pub u32);

impl ConstraintId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a constraint came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintSource {
    /// Asserted from outside the graph
    User,
    /// Derived by composition
    Closure,
    /// Converse of an accepted or derived constraint
    ClosureInverted,
}

impl ConstraintSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintSource::User => "user",
            ConstraintSource::Closure => "closure",
            ConstraintSource::ClosureInverted => "closure-inverted",
        }
    }
}

impl fmt::Display for ConstraintSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a constraint was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum History {
    /// User constraints have no history
    Asserted,
    /// Composition of the constraints on `(i, j)` and `(j, k)`
    Composed(ConstraintId, ConstraintId),
    /// Converse of an accepted constraint
    Inverse(ConstraintId),
}

/// A proposed relation between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub node1: NodeId,
    pub node2: NodeId,
    pub relset: RelationSet,
    pub source: ConstraintSource,
    pub history: History,
    /// Propagation cycle in which the constraint was accepted
    pub cycle: u32,
}

impl Constraint {
    /// A constraint asserted by the caller
    pub fn user(node1: NodeId, node2: NodeId, relset: RelationSet) -> Self {
        Self {
            node1,
            node2,
            relset,
            source: ConstraintSource::User,
            history: History::Asserted,
            cycle: 0,
        }
    }

    /// A constraint derived by the closure algorithm
    pub fn derived(
        node1: NodeId,
        node2: NodeId,
        relset: RelationSet,
        source: ConstraintSource,
        history: History,
        cycle: u32,
    ) -> Self {
        Self {
            node1,
            node2,
            relset,
            source,
            history,
            cycle,
        }
    }

    pub fn is_disjunction(&self) -> bool {
        self.relset.is_disjunction()
    }

    pub fn has_normalized_relation(&self) -> bool {
        self.relset.has_normalized_relation()
    }

    /// The constraints this one was derived from, if any.
    pub fn parents(&self) -> Vec<ConstraintId> {
        match self.history {
            History::Asserted => Vec::new(),
            History::Composed(a, b) => vec![a, b],
            History::Inverse(a) => vec![a],
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {{{}}} {} {} c{}>",
            self.node1, self.relset, self.node2, self.source, self.cycle
        )
    }
}
