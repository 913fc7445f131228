//! # Temporal Module
//!
//! Concrete intervals on an integer time line and the Allen relation between two of
//! them. The composition table is derived from these definitions rather than typed in.

use crate::relation::AllenRelation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Represents a point on the time line
pub type Instant = i64;

/// A closed interval [start, end] where start < end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Start point
    pub start: Instant,
    /// End point
    pub end: Instant,
}

impl Interval {
    /// Create a new interval with validation
    ///
    /// # Errors
    /// Returns an error if start >= end (point intervals are not allowed)
    pub fn new(start: Instant, end: Instant) -> anyhow::Result<Self> {
        if start >= end {
            anyhow::bail!(
                "Invalid interval: start ({}) must be less than end ({})",
                start,
                end
            );
        }
        Ok(Self { start, end })
    }

    /// All intervals whose endpoints lie in `0..points`.
    pub fn enumerate(points: Instant) -> Vec<Interval> {
        let mut intervals = Vec::new();
        for start in 0..points {
            for end in (start + 1)..points {
                intervals.push(Interval { start, end });
            }
        }
        intervals
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Determine the Allen relation between two intervals
pub fn allen_relation(a: &Interval, b: &Interval) -> AllenRelation {
    use AllenRelation::*;

    match (a.start.cmp(&b.start), a.end.cmp(&b.end)) {
        (Ordering::Equal, Ordering::Equal) => Equals,
        (Ordering::Equal, Ordering::Less) => Starts,
        (Ordering::Equal, Ordering::Greater) => StartedBy,
        (Ordering::Greater, Ordering::Equal) => Finishes,
        (Ordering::Less, Ordering::Equal) => FinishedBy,
        (Ordering::Greater, Ordering::Less) => During,
        (Ordering::Less, Ordering::Greater) => Contains,
        (Ordering::Less, Ordering::Less) => match a.end.cmp(&b.start) {
            Ordering::Less => Precedes,
            Ordering::Equal => Meets,
            Ordering::Greater => Overlaps,
        },
        (Ordering::Greater, Ordering::Greater) => match b.end.cmp(&a.start) {
            Ordering::Less => PrecededBy,
            Ordering::Equal => MetBy,
            Ordering::Greater => OverlappedBy,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(100, 200).is_ok());
        assert!(Interval::new(100, 100).is_err());
        assert!(Interval::new(200, 100).is_err());
    }

    #[test]
    fn test_allen_relations() {
        let a = Interval::new(100, 200).unwrap();
        let b = Interval::new(150, 250).unwrap();
        let c = Interval::new(200, 300).unwrap();
        let d = Interval::new(50, 100).unwrap();
        let e = Interval::new(120, 200).unwrap();

        assert_eq!(allen_relation(&a, &b), AllenRelation::Overlaps);
        assert_eq!(allen_relation(&a, &c), AllenRelation::Meets);
        assert_eq!(allen_relation(&a, &d), AllenRelation::MetBy);
        assert_eq!(allen_relation(&e, &a), AllenRelation::Finishes);
        assert_eq!(allen_relation(&a, &e), AllenRelation::FinishedBy);
        assert_eq!(allen_relation(&d, &c), AllenRelation::Precedes);
    }

    #[test]
    fn test_relation_of_swapped_pair_is_inverse() {
        let intervals = Interval::enumerate(5);
        for a in &intervals {
            for b in &intervals {
                assert_eq!(allen_relation(b, a), allen_relation(a, b).inverse());
            }
        }
    }

    #[test]
    fn test_enumerate_covers_every_relation() {
        let intervals = Interval::enumerate(4);
        assert_eq!(intervals.len(), 6);
        let mut seen = std::collections::HashSet::new();
        for a in &intervals {
            for b in &intervals {
                seen.insert(allen_relation(a, b));
            }
        }
        assert_eq!(seen.len(), 13);
    }
}
