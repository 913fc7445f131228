//! # Composition Table
//!
//! Transitivity lookup for Allen's algebra. Entry `[r1][r2]` holds every relation that
//! can hold between `a` and `c` when `a r1 b` and `b r2 c`.
//!
//! The table is derived once per process by enumerating all configurations of three
//! intervals over six endpoint positions, which realizes every qualitative arrangement
//! of three intervals. After that it is immutable and shared by every graph.

use crate::relation::{AllenRelation, RelationSet};
use crate::temporal::{allen_relation, Interval};
use std::sync::OnceLock;

/// Endpoint positions needed to realize any arrangement of three intervals.
const ENDPOINT_POSITIONS: i64 = 6;

static TABLE: OnceLock<CompositionTable> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionTable {
    entries: [[RelationSet; 13]; 13],
}

impl CompositionTable {
    /// The process-wide table, built on first use.
    pub fn global() -> &'static CompositionTable {
        TABLE.get_or_init(CompositionTable::derive)
    }

    fn derive() -> Self {
        let mut entries = [[RelationSet::EMPTY; 13]; 13];
        let intervals = Interval::enumerate(ENDPOINT_POSITIONS);
        for a in &intervals {
            for b in &intervals {
                let r1 = allen_relation(a, b).index();
                for c in &intervals {
                    let r2 = allen_relation(b, c).index();
                    entries[r1][r2] = entries[r1][r2].with(allen_relation(a, c));
                }
            }
        }
        Self { entries }
    }

    /// Composition of two primitives.
    #[inline]
    pub fn lookup(&self, r1: AllenRelation, r2: AllenRelation) -> RelationSet {
        self.entries[r1.index()][r2.index()]
    }

    /// Union of the pairwise compositions of the primitives in `a` and `b`.
    ///
    /// Returns `None` when the result carries no information: either input is empty,
    /// or every relation remains possible.
    pub fn compose(&self, a: RelationSet, b: RelationSet) -> Option<RelationSet> {
        if a.is_empty() || b.is_empty() {
            return None;
        }
        let mut result = RelationSet::EMPTY;
        for r1 in a.iter() {
            for r2 in b.iter() {
                result = result.union(self.lookup(r1, r2));
                if result.is_full() {
                    return None;
                }
            }
        }
        Some(result)
    }

    /// Composition of two optional edge relations; "no information" on either side
    /// yields "no information".
    pub fn compose_rels(
        &self,
        a: Option<RelationSet>,
        b: Option<RelationSet>,
    ) -> Option<RelationSet> {
        self.compose(a?, b?)
    }
}

/// Compose using the global table.
pub fn compose(a: RelationSet, b: RelationSet) -> Option<RelationSet> {
    CompositionTable::global().compose(a, b)
}
