//! # Relation Algebra
//!
//! Primitive Allen interval relations and disjunctive relation sets.
//!
//! A [`RelationSet`] is a bitset over the thirteen primitives. The empty set means
//! the constraint network is inconsistent; "no information" is modelled one level up
//! as `Option<RelationSet>::None` on an edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Allen's interval relations
///
/// Relations are listed so that the converse of the relation at position `i` sits at
/// position `12 - i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AllenRelation {
    /// a precedes b: a.end < b.start
    Precedes = 0,
    /// a meets b: a.end == b.start
    Meets = 1,
    /// a overlaps b: a.start < b.start < a.end < b.end
    Overlaps = 2,
    /// a starts b: a.start == b.start && a.end < b.end
    Starts = 3,
    /// a during b: b.start < a.start && a.end < b.end
    During = 4,
    /// a finishes b: a.start > b.start && a.end == b.end
    Finishes = 5,
    /// a equals b
    Equals = 6,
    /// a finished by b: a.start < b.start && a.end == b.end
    FinishedBy = 7,
    /// a contains b: a.start < b.start && b.end < a.end
    Contains = 8,
    /// a started by b: a.start == b.start && b.end < a.end
    StartedBy = 9,
    /// a overlapped by b: b.start < a.start < b.end < a.end
    OverlappedBy = 10,
    /// a met by b: b.end == a.start
    MetBy = 11,
    /// a preceded by b: b.end < a.start
    PrecededBy = 12,
}

impl AllenRelation {
    /// All primitives in bit order.
    pub const ALL: [AllenRelation; 13] = [
        AllenRelation::Precedes,
        AllenRelation::Meets,
        AllenRelation::Overlaps,
        AllenRelation::Starts,
        AllenRelation::During,
        AllenRelation::Finishes,
        AllenRelation::Equals,
        AllenRelation::FinishedBy,
        AllenRelation::Contains,
        AllenRelation::StartedBy,
        AllenRelation::OverlappedBy,
        AllenRelation::MetBy,
        AllenRelation::PrecededBy,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The converse relation: if `a R b` then `b R.inverse() a`.
    #[inline]
    pub fn inverse(self) -> Self {
        Self::ALL[12 - self.index()]
    }

    /// Short notation used in relation sets and matrix dumps.
    pub fn abbreviation(self) -> &'static str {
        match self {
            AllenRelation::Precedes => "<",
            AllenRelation::Meets => "m",
            AllenRelation::Overlaps => "o",
            AllenRelation::Starts => "s",
            AllenRelation::During => "d",
            AllenRelation::Finishes => "f",
            AllenRelation::Equals => "=",
            AllenRelation::FinishedBy => "fi",
            AllenRelation::Contains => "di",
            AllenRelation::StartedBy => "si",
            AllenRelation::OverlappedBy => "oi",
            AllenRelation::MetBy => "mi",
            AllenRelation::PrecededBy => ">",
        }
    }

    pub fn from_abbreviation(abbrev: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|rel| rel.abbreviation() == abbrev)
    }

    /// TimeML relation type corresponding to this primitive, if any.
    ///
    /// Overlap relations have no TimeML counterpart.
    pub fn timeml_label(self) -> Option<&'static str> {
        match self {
            AllenRelation::Precedes => Some("BEFORE"),
            AllenRelation::Meets => Some("IBEFORE"),
            AllenRelation::Starts => Some("BEGINS"),
            AllenRelation::During => Some("IS_INCLUDED"),
            AllenRelation::Finishes => Some("ENDS"),
            AllenRelation::Equals => Some("SIMULTANEOUS"),
            AllenRelation::FinishedBy => Some("ENDED_BY"),
            AllenRelation::Contains => Some("INCLUDES"),
            AllenRelation::StartedBy => Some("BEGUN_BY"),
            AllenRelation::MetBy => Some("IAFTER"),
            AllenRelation::PrecededBy => Some("AFTER"),
            AllenRelation::Overlaps | AllenRelation::OverlappedBy => None,
        }
    }

    /// Parse a TimeML `relType` value.
    pub fn from_timeml(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "BEFORE" => Some(AllenRelation::Precedes),
            "AFTER" => Some(AllenRelation::PrecededBy),
            "IBEFORE" => Some(AllenRelation::Meets),
            "IAFTER" => Some(AllenRelation::MetBy),
            "BEGINS" => Some(AllenRelation::Starts),
            "BEGUN_BY" => Some(AllenRelation::StartedBy),
            "ENDS" => Some(AllenRelation::Finishes),
            "ENDED_BY" => Some(AllenRelation::FinishedBy),
            "INCLUDES" | "DURING_INV" => Some(AllenRelation::Contains),
            "IS_INCLUDED" | "DURING" => Some(AllenRelation::During),
            "SIMULTANEOUS" | "IDENTITY" => Some(AllenRelation::Equals),
            _ => None,
        }
    }
}

impl fmt::Display for AllenRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Relations that survive normalization: one direction of every converse pair that
/// has a TimeML counterpart.
pub const NORMALIZED_RELATIONS: [AllenRelation; 6] = [
    AllenRelation::Precedes,
    AllenRelation::Meets,
    AllenRelation::Starts,
    AllenRelation::Finishes,
    AllenRelation::During,
    AllenRelation::Equals,
];

const FULL_MASK: u16 = (1 << 13) - 1;

/// A disjunctive set of primitive relations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RelationSet(u16);

impl RelationSet {
    pub const EMPTY: RelationSet = RelationSet(0);
    pub const FULL: RelationSet = RelationSet(FULL_MASK);

    pub fn from_bits(bits: u16) -> Self {
        Self(bits & FULL_MASK)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn single(rel: AllenRelation) -> Self {
        Self(1 << rel.index())
    }

    pub fn from_relations<I: IntoIterator<Item = AllenRelation>>(relations: I) -> Self {
        relations
            .into_iter()
            .fold(Self::EMPTY, |set, rel| set.with(rel))
    }

    #[must_use]
    pub fn with(self, rel: AllenRelation) -> Self {
        Self(self.0 | (1 << rel.index()))
    }

    pub fn contains(self, rel: AllenRelation) -> bool {
        self.0 & (1 << rel.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full(self) -> bool {
        self.0 == FULL_MASK
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_subset_of(self, other: RelationSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterate the primitives in bit order.
    pub fn iter(self) -> impl Iterator<Item = AllenRelation> {
        AllenRelation::ALL
            .into_iter()
            .filter(move |rel| self.contains(*rel))
    }

    /// The single primitive of a non-disjunctive set.
    pub fn as_single(self) -> Option<AllenRelation> {
        if self.len() == 1 {
            AllenRelation::from_index(self.0.trailing_zeros() as usize)
        } else {
            None
        }
    }

    #[must_use]
    pub fn union(self, other: RelationSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection. An empty result signals an inconsistency.
    #[must_use]
    pub fn intersect(self, other: RelationSet) -> Self {
        Self(self.0 & other.0)
    }

    /// Map every primitive to its converse.
    #[must_use]
    pub fn invert(self) -> Self {
        Self::from_relations(self.iter().map(AllenRelation::inverse))
    }

    pub fn is_disjunction(self) -> bool {
        self.len() > 1
    }

    /// True when the set is a single relation from [`NORMALIZED_RELATIONS`].
    pub fn has_normalized_relation(self) -> bool {
        self.as_single()
            .is_some_and(|rel| NORMALIZED_RELATIONS.contains(&rel))
    }

    /// TimeML label for a single-relation set.
    pub fn timeml_label(self) -> Option<&'static str> {
        self.as_single().and_then(AllenRelation::timeml_label)
    }
}

/// Free-function form of [`RelationSet::intersect`].
pub fn intersect(a: RelationSet, b: RelationSet) -> RelationSet {
    a.intersect(b)
}

/// Free-function form of [`RelationSet::invert`].
pub fn invert(relset: RelationSet) -> RelationSet {
    relset.invert()
}

impl fmt::Display for RelationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rel in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(rel.abbreviation())?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for RelationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl From<AllenRelation> for RelationSet {
    fn from(rel: AllenRelation) -> Self {
        Self::single(rel)
    }
}

impl From<RelationSet> for String {
    fn from(relset: RelationSet) -> String {
        relset.to_string()
    }
}

impl TryFrom<String> for RelationSet {
    type Error = RelationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Errors raised while reading relation sets from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationError {
    #[error("unknown relation `{0}`")]
    UnknownRelation(String),
    #[error("relation set is empty")]
    Empty,
}

impl FromStr for RelationSet {
    type Err = RelationError;

    /// Accepts either a TimeML label (`BEFORE`) or abbreviations separated by spaces
    /// or commas, optionally wrapped in braces (`{< m}`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('{').trim_end_matches('}').trim();
        if let Some(rel) = AllenRelation::from_timeml(trimmed) {
            return Ok(Self::single(rel));
        }
        let mut set = Self::EMPTY;
        for token in trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let rel = AllenRelation::from_abbreviation(token)
                .ok_or_else(|| RelationError::UnknownRelation(token.to_string()))?;
            set = set.with(rel);
        }
        if set.is_empty() {
            return Err(RelationError::Empty);
        }
        Ok(set)
    }
}
