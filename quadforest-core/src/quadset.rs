//! Ordered quad set
//!
//! One [`OrderedQuadSet`] stores identifier quads in a `BTreeSet` keyed by
//! a single [`Permutation`]. Quads enter and leave in SPOG order; the
//! permutation is applied at the boundary, so two sets with different
//! orders hold the same elements under different iteration orders.
//!
//! ## Range scans
//!
//! A pattern whose bound positions form a prefix of the order maps to one
//! contiguous `BTreeSet::range`. Bound positions beyond the prefix are
//! checked by a residual componentwise filter, which also makes the
//! full-scan fallback correct when the bound set is not a prefix at all.

use crate::ids::{IdPattern, IdQuad, TermId};
use crate::permutation::Permutation;
use std::collections::btree_set;
use std::collections::BTreeSet;

/// A set of identifier quads sorted under one permutation
#[derive(Clone, Debug)]
pub struct OrderedQuadSet {
    order: Permutation,
    set: BTreeSet<IdQuad>,
}

impl OrderedQuadSet {
    /// Create an empty set under the given order
    pub fn new(order: Permutation) -> Self {
        Self {
            order,
            set: BTreeSet::new(),
        }
    }

    /// Build a set under `order` from SPOG quads
    pub fn from_quads(order: Permutation, quads: impl IntoIterator<Item = IdQuad>) -> Self {
        Self {
            order,
            set: quads.into_iter().map(|q| order.to_key(q)).collect(),
        }
    }

    /// The permutation this set sorts by
    pub fn order(&self) -> Permutation {
        self.order
    }

    /// Number of quads
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// True if the set holds no quads
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Insert a SPOG quad; true if it was not present
    pub fn insert(&mut self, quad: IdQuad) -> bool {
        self.set.insert(self.order.to_key(quad))
    }

    /// Remove a SPOG quad; true if it was present
    pub fn remove(&mut self, quad: IdQuad) -> bool {
        self.set.remove(&self.order.to_key(quad))
    }

    /// Membership test for a SPOG quad
    pub fn contains(&self, quad: IdQuad) -> bool {
        self.set.contains(&self.order.to_key(quad))
    }

    /// Iterate quads in this set's order, decoded back to SPOG
    pub fn iter(&self) -> impl Iterator<Item = IdQuad> + '_ {
        self.set.iter().map(|&key| self.order.from_key(key))
    }

    /// Scan every quad matching `pattern`, in this set's order
    ///
    /// The scan is one contiguous range over the bound prefix; remaining
    /// bound positions are filtered per element.
    pub fn range(&self, pattern: IdPattern) -> ScanIter<'_> {
        let key_pattern = self.order.pattern_key(pattern);

        let mut lo = [TermId::MIN; 4];
        let mut hi = [TermId::MAX; 4];
        for slot in 0..4 {
            match key_pattern[slot] {
                Some(value) => {
                    lo[slot] = value;
                    hi[slot] = value;
                }
                None => break,
            }
        }

        ScanIter {
            range: self.set.range(lo..=hi),
            order: self.order,
            residual: key_pattern,
        }
    }

    /// Build a new set under the same order holding the quads matching
    /// `pattern`
    pub fn filter_to_set(&self, pattern: IdPattern) -> Self {
        Self::from_quads(self.order, self.range(pattern))
    }

    // === Same-order set algebra ===
    //
    // Key tuples compare identically in both operands, so these reduce to
    // plain BTreeSet operations.

    /// Union with a set of the same order
    pub fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.order, other.order);
        Self {
            order: self.order,
            set: self.set.union(&other.set).copied().collect(),
        }
    }

    /// Intersection with a set of the same order
    pub fn intersection(&self, other: &Self) -> Self {
        debug_assert_eq!(self.order, other.order);
        Self {
            order: self.order,
            set: self.set.intersection(&other.set).copied().collect(),
        }
    }

    /// Difference (`self \ other`) with a set of the same order
    pub fn difference(&self, other: &Self) -> Self {
        debug_assert_eq!(self.order, other.order);
        Self {
            order: self.order,
            set: self.set.difference(&other.set).copied().collect(),
        }
    }

    /// True if every quad of `other` is in `self`
    pub fn is_superset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.order, other.order);
        self.set.is_superset(&other.set)
    }
}

/// Iterator over the quads matching a pattern, in one set's order
pub struct ScanIter<'a> {
    range: btree_set::Range<'a, IdQuad>,
    order: Permutation,
    residual: IdPattern,
}

impl Iterator for ScanIter<'_> {
    type Item = IdQuad;

    fn next(&mut self) -> Option<IdQuad> {
        for &key in self.range.by_ref() {
            let matched = self
                .residual
                .iter()
                .zip(key.iter())
                .all(|(p, v)| p.map_or(true, |bound| bound == *v));
            if matched {
                return Some(self.order.from_key(key));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<IdQuad> {
        vec![
            [1, 10, 100, 0],
            [1, 10, 101, 0],
            [1, 11, 100, 5],
            [2, 10, 100, 0],
            [2, 11, 102, 5],
        ]
    }

    #[test]
    fn test_insert_remove_contains() {
        let mut set = OrderedQuadSet::new(Permutation::Spog);
        assert!(set.insert([1, 2, 3, 0]));
        assert!(!set.insert([1, 2, 3, 0]));
        assert!(set.contains([1, 2, 3, 0]));
        assert_eq!(set.len(), 1);

        assert!(set.remove([1, 2, 3, 0]));
        assert!(!set.remove([1, 2, 3, 0]));
        assert!(set.is_empty());
    }

    #[test]
    fn test_iteration_order_follows_permutation() {
        let quads = vec![[2, 1, 9, 0], [1, 2, 8, 0]];

        let spog = OrderedQuadSet::from_quads(Permutation::Spog, quads.clone());
        assert_eq!(spog.iter().collect::<Vec<_>>(), vec![[1, 2, 8, 0], [2, 1, 9, 0]]);

        // POGS sorts by predicate first.
        let pogs = OrderedQuadSet::from_quads(Permutation::Pogs, quads);
        assert_eq!(pogs.iter().collect::<Vec<_>>(), vec![[2, 1, 9, 0], [1, 2, 8, 0]]);
    }

    #[test]
    fn test_range_scan_on_prefix() {
        let set = OrderedQuadSet::from_quads(Permutation::Spog, sample());

        let s1: Vec<_> = set.range([Some(1), None, None, None]).collect();
        assert_eq!(s1, vec![[1, 10, 100, 0], [1, 10, 101, 0], [1, 11, 100, 5]]);

        let s1p10: Vec<_> = set.range([Some(1), Some(10), None, None]).collect();
        assert_eq!(s1p10, vec![[1, 10, 100, 0], [1, 10, 101, 0]]);
    }

    #[test]
    fn test_range_scan_with_residual_filter() {
        // Graph is not in SPOG's prefix for this shape; the residual filter
        // must still restrict it.
        let set = OrderedQuadSet::from_quads(Permutation::Spog, sample());
        let got: Vec<_> = set.range([Some(1), None, None, Some(5)]).collect();
        assert_eq!(got, vec![[1, 11, 100, 5]]);
    }

    #[test]
    fn test_full_scan_fallback() {
        // Object-only on SPOG: no prefix at all, full scan plus filter.
        let set = OrderedQuadSet::from_quads(Permutation::Spog, sample());
        let got: Vec<_> = set.range([None, None, Some(100), None]).collect();
        assert_eq!(got, vec![[1, 10, 100, 0], [1, 11, 100, 5], [2, 10, 100, 0]]);
    }

    #[test]
    fn test_fully_bound_range_is_membership() {
        let set = OrderedQuadSet::from_quads(Permutation::Gpos, sample());
        let got: Vec<_> = set
            .range([Some(1), Some(10), Some(101), Some(0)])
            .collect();
        assert_eq!(got, vec![[1, 10, 101, 0]]);

        let missing: Vec<_> = set
            .range([Some(9), Some(9), Some(9), Some(9)])
            .collect();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_set_algebra_same_order() {
        let a = OrderedQuadSet::from_quads(
            Permutation::Ogsp,
            vec![[1, 1, 1, 0], [2, 2, 2, 0]],
        );
        let b = OrderedQuadSet::from_quads(
            Permutation::Ogsp,
            vec![[1, 1, 1, 0], [3, 3, 3, 0]],
        );

        let union = a.union(&b);
        assert_eq!(union.len(), 3);

        let inter = a.intersection(&b);
        assert_eq!(inter.iter().collect::<Vec<_>>(), vec![[1, 1, 1, 0]]);

        let diff = a.difference(&b);
        assert_eq!(diff.iter().collect::<Vec<_>>(), vec![[2, 2, 2, 0]]);

        assert!(union.is_superset(&a));
        assert!(!a.is_superset(&b));
    }

    #[test]
    fn test_filter_to_set_keeps_order() {
        let set = OrderedQuadSet::from_quads(Permutation::Spog, sample());
        let filtered = set.filter_to_set([None, Some(10), None, None]);
        assert_eq!(filtered.order(), Permutation::Spog);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.contains([2, 10, 100, 0]));
    }
}
