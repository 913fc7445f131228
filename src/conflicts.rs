//! # Conflicts Module
//!
//! Observations made while closing and reducing a graph: inconsistencies found during
//! propagation, and what each reduction stage removed.

use crate::constraint::{Constraint, ConstraintSource};
use crate::error::GraphError;
use crate::relation::RelationSet;
use serde::{Deserialize, Serialize};

/// An empty intersection between a constraint and the relation already on its edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inconsistency {
    /// External id of the first node
    pub from: String,
    /// External id of the second node
    pub to: String,
    /// The constraint that could not be integrated
    pub constraint: Constraint,
    /// The relation set on the edge at that moment
    pub existing: RelationSet,
    /// Propagation cycle in which the conflict surfaced
    pub cycle: u32,
}

impl Inconsistency {
    /// True when the conflicting constraint was asserted by the caller rather than
    /// derived.
    pub fn is_user_conflict(&self) -> bool {
        self.constraint.source == ConstraintSource::User
    }

    pub fn to_error(&self) -> GraphError {
        GraphError::Inconsistent {
            from: self.from.clone(),
            to: self.to.clone(),
            asserted: self.constraint.relset,
            existing: self.existing,
        }
    }
}

/// Outcome of one `propagate` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationReport {
    pub cycle: u32,
    /// Constraints popped from the queue
    pub processed: usize,
    /// Constraints that narrowed an edge
    pub accepted: usize,
    /// Derived constraints pushed on the queue
    pub derived: usize,
    pub inconsistencies: Vec<Inconsistency>,
}

impl PropagationReport {
    pub fn new(cycle: u32) -> Self {
        Self {
            cycle,
            ..Self::default()
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }

    /// Turn the first inconsistency into an error, for callers that treat it as fatal.
    pub fn into_result(self) -> Result<PropagationReport, GraphError> {
        match self.inconsistencies.first() {
            Some(inconsistency) => Err(inconsistency.to_error()),
            None => Ok(self),
        }
    }
}

/// Counts of edges cleared by each reduction stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionReport {
    pub anchor_removed: bool,
    pub disjunctions: usize,
    pub derivable: usize,
    pub unnormalized: usize,
    pub equivalence_classes: usize,
    /// Edges left in the minimal graph
    pub remaining: usize,
}
