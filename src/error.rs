//! Errors raised at the graph boundary.

use crate::relation::RelationSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("malformed relation set `{{{relset}}}` between `{from}` and `{to}`")]
    MalformedRelationSet {
        from: String,
        to: String,
        relset: RelationSet,
    },

    #[error("duplicate node `{0}`")]
    DuplicateNode(String),

    #[error("event `{0}` has no instance")]
    MissingInstance(String),

    #[error("inconsistent relation between `{from}` and `{to}`: {{{asserted}}} conflicts with {{{existing}}}")]
    Inconsistent {
        from: String,
        to: String,
        asserted: RelationSet,
        existing: RelationSet,
    },

    #[error("graph has already been reduced")]
    AlreadyReduced,
}

pub type GraphResult<T> = Result<T, GraphError>;
