//! Forest of lazily materialized index trees
//!
//! A [`QuadForest`] holds up to six [`OrderedQuadSet`]s over the same
//! elements, one per [`Permutation`]. The anchor tree carries the
//! authoritative membership; the other five are materialized on demand
//! when a pattern query routes to them, amortizing the build cost across
//! repeated queries of the same shape.
//!
//! ## Routing
//!
//! A query scans the materialized tree whose prefix covers its bound
//! positions when one exists; otherwise the lowest-indexed covering order
//! is materialized by copying the anchor under the new comparator.
//! Mutations are applied to every materialized tree so they never drift.
//!
//! ## Freed state
//!
//! `free` drops every tree. Reads on a freed forest are empty; the next
//! mutation re-materializes the anchor.

use crate::ids::{bound_positions, pattern_matches, IdPattern, IdQuad, IdSequence};
use crate::permutation::Permutation;
use crate::quadset::OrderedQuadSet;
use once_cell::sync::OnceCell;
use smallvec::SmallVec;
use tracing::debug;

/// Materialization snapshot of a forest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForestStats {
    /// Number of quads
    pub size: usize,
    /// The anchor order
    pub anchor: Permutation,
    /// Orders with a live tree, in index order
    pub materialized: Vec<Permutation>,
}

/// A forest of up to six index trees over one quad set
#[derive(Clone, Debug)]
pub struct QuadForest {
    anchor: Permutation,
    trees: [OnceCell<OrderedQuadSet>; Permutation::COUNT],
}

impl QuadForest {
    /// Create an empty forest anchored at SPOG
    pub fn new() -> Self {
        Self::with_anchor(Permutation::Spog)
    }

    /// Create an empty forest anchored at the given order
    pub fn with_anchor(anchor: Permutation) -> Self {
        let forest = Self {
            anchor,
            trees: Default::default(),
        };
        forest.ensure_anchor();
        forest
    }

    /// Create a forest owning one pre-built tree as its anchor
    fn from_tree(tree: OrderedQuadSet) -> Self {
        let forest = Self {
            anchor: tree.order(),
            trees: Default::default(),
        };
        let _ = forest.trees[forest.anchor.index()].set(tree);
        forest
    }

    /// Build a forest from an identifier sequence
    pub fn from_sequence(seq: &IdSequence) -> Self {
        let mut forest = Self::new();
        forest.bulk_load(seq);
        forest
    }

    /// The anchor order
    pub fn anchor(&self) -> Permutation {
        self.anchor
    }

    fn anchor_ref(&self) -> Option<&OrderedQuadSet> {
        self.trees[self.anchor.index()].get()
    }

    fn ensure_anchor(&self) {
        self.trees[self.anchor.index()]
            .get_or_init(|| OrderedQuadSet::new(self.anchor));
    }

    /// A clone of the anchor tree, or an empty tree for a freed forest
    fn anchor_snapshot(&self) -> OrderedQuadSet {
        self.anchor_ref()
            .cloned()
            .unwrap_or_else(|| OrderedQuadSet::new(self.anchor))
    }

    /// Number of quads
    pub fn size(&self) -> usize {
        self.anchor_ref().map_or(0, OrderedQuadSet::len)
    }

    /// True if the forest holds no quads
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of currently materialized trees
    pub fn materialized_count(&self) -> usize {
        self.trees.iter().filter(|cell| cell.get().is_some()).count()
    }

    /// Snapshot of size, anchor, and which trees are live
    pub fn stats(&self) -> ForestStats {
        ForestStats {
            size: self.size(),
            anchor: self.anchor,
            materialized: Permutation::ALL
                .into_iter()
                .filter(|p| self.trees[p.index()].get().is_some())
                .collect(),
        }
    }

    /// Drop every tree; the next mutation re-materializes the anchor
    pub fn free(&mut self) {
        for cell in &mut self.trees {
            cell.take();
        }
    }

    // === Membership and mutation ===

    /// Membership test
    pub fn contains(&self, quad: IdQuad) -> bool {
        self.anchor_ref().map_or(false, |tree| tree.contains(quad))
    }

    /// Insert a quad into every materialized tree; true if it was new
    pub fn insert(&mut self, quad: IdQuad) -> bool {
        self.ensure_anchor();
        let mut inserted = false;
        for cell in &mut self.trees {
            if let Some(tree) = cell.get_mut() {
                inserted |= tree.insert(quad);
            }
        }
        inserted
    }

    /// Remove a quad from every materialized tree; true if it was present
    pub fn remove(&mut self, quad: IdQuad) -> bool {
        self.ensure_anchor();
        let mut removed = false;
        for cell in &mut self.trees {
            if let Some(tree) = cell.get_mut() {
                removed |= tree.remove(quad);
            }
        }
        removed
    }

    /// Insert every quad of an identifier sequence
    ///
    /// Returns the number of quads that were not already present.
    pub fn bulk_load(&mut self, seq: &IdSequence) -> usize {
        debug!(quads = seq.len(), "bulk loading identifier sequence");
        let mut inserted = 0;
        for quad in seq.iter() {
            if self.insert(quad) {
                inserted += 1;
            }
        }
        inserted
    }

    // === Routing ===

    /// The order a query with these bound positions routes to
    fn route(&self, bound: [bool; 4]) -> Permutation {
        let covering: SmallVec<[Permutation; Permutation::COUNT]> =
            Permutation::covering(bound).collect();
        debug_assert!(!covering.is_empty());
        covering
            .iter()
            .copied()
            .find(|p| self.trees[p.index()].get().is_some())
            .unwrap_or(covering[0])
    }

    /// Materialize (if needed) and return the tree for `order`
    fn materialize(&self, order: Permutation) -> &OrderedQuadSet {
        self.trees[order.index()].get_or_init(|| {
            debug!(order = %order, "materializing index tree");
            let anchor = self
                .anchor_ref()
                .expect("anchor tree must exist before a secondary tree is built");
            OrderedQuadSet::from_quads(order, anchor.iter())
        })
    }

    /// The tree a pattern query scans, materializing it when absent
    ///
    /// `None` when the forest is freed (nothing to scan).
    fn routed(&self, bound: [bool; 4]) -> Option<&OrderedQuadSet> {
        self.anchor_ref()?;
        Some(self.materialize(self.route(bound)))
    }

    /// The best already-materialized tree for these bound positions
    ///
    /// Used where building an index would not pay for itself (one-shot
    /// deletions). Falls back to the anchor.
    fn routed_existing(&self, bound: [bool; 4]) -> Option<&OrderedQuadSet> {
        self.trees
            .iter()
            .filter_map(|cell| cell.get())
            .max_by_key(|tree| tree.order().prefix_len(bound))
    }

    /// Ensure a tree whose prefix covers `bound` is materialized
    pub fn ensure_index(&self, bound: [bool; 4]) {
        self.ensure_anchor();
        self.materialize(self.route(bound));
    }

    // === Pattern queries ===

    /// All quads matching `pattern`, in the scanned tree's order
    pub fn match_pattern(&self, pattern: IdPattern) -> IdSequence {
        match self.routed(bound_positions(&pattern)) {
            None => IdSequence::new(),
            Some(tree) => tree.range(pattern).collect(),
        }
    }

    /// Number of quads matching `pattern`
    ///
    /// Uses the same routing as [`match_pattern`](Self::match_pattern) but
    /// never materializes the result sequence. A fully bound pattern is a
    /// membership test.
    pub fn match_count(&self, pattern: IdPattern) -> usize {
        if let [Some(s), Some(p), Some(o), Some(g)] = pattern {
            return usize::from(self.contains([s, p, o, g]));
        }
        match self.routed(bound_positions(&pattern)) {
            None => 0,
            Some(tree) => tree.range(pattern).count(),
        }
    }

    /// Remove every quad matching `pattern`; returns how many went away
    ///
    /// Matches are computed once against the best existing tree. When the
    /// match set is large relative to the forest, the anchor is rebuilt
    /// from the surviving quads and secondary trees are dropped instead of
    /// deleting element by element.
    pub fn delete_matches(&mut self, pattern: IdPattern) -> usize {
        let matched: Vec<IdQuad> = match self.routed_existing(bound_positions(&pattern)) {
            None => return 0,
            Some(tree) => tree.range(pattern).collect(),
        };
        if matched.is_empty() {
            return 0;
        }

        let removed = matched.len();
        let threshold = 1 + self.materialized_count();
        if removed < self.size() / threshold {
            for quad in &matched {
                self.remove(*quad);
            }
        } else {
            debug!(removed, "rebuilding anchor after bulk deletion");
            let survivors = {
                let anchor = self.anchor_ref().expect("non-empty forest has an anchor");
                OrderedQuadSet::from_quads(
                    self.anchor,
                    anchor.iter().filter(|q| !pattern_matches(q, &pattern)),
                )
            };
            for cell in &mut self.trees {
                cell.take();
            }
            let _ = self.trees[self.anchor.index()].set(survivors);
        }
        removed
    }

    // === Iteration ===

    /// Iterate every quad in anchor order
    pub fn iter(&self) -> impl Iterator<Item = IdQuad> + '_ {
        self.anchor_ref().into_iter().flat_map(OrderedQuadSet::iter)
    }

    /// Flatten the forest into an identifier sequence, in anchor order
    pub fn to_sequence(&self) -> IdSequence {
        self.iter().collect()
    }

    // === Set algebra ===
    //
    // Anchors sharing an order merge tree to tree; otherwise one side is
    // scanned as a sequence of quads.

    /// Union with another forest
    pub fn union(&self, other: &QuadForest) -> QuadForest {
        match (self.anchor_ref(), other.anchor_ref()) {
            (Some(a), Some(b)) if a.order() == b.order() => Self::from_tree(a.union(b)),
            _ => {
                let mut tree = self.anchor_snapshot();
                for quad in other.iter() {
                    tree.insert(quad);
                }
                Self::from_tree(tree)
            }
        }
    }

    /// Intersection with another forest
    pub fn intersection(&self, other: &QuadForest) -> QuadForest {
        match (self.anchor_ref(), other.anchor_ref()) {
            (Some(a), Some(b)) if a.order() == b.order() => {
                Self::from_tree(a.intersection(b))
            }
            _ => Self::from_tree(OrderedQuadSet::from_quads(
                self.anchor,
                self.iter().filter(|&q| other.contains(q)),
            )),
        }
    }

    /// Difference (`self \ other`) with another forest
    pub fn difference(&self, other: &QuadForest) -> QuadForest {
        match (self.anchor_ref(), other.anchor_ref()) {
            (Some(a), Some(b)) if a.order() == b.order() => Self::from_tree(a.difference(b)),
            _ => Self::from_tree(OrderedQuadSet::from_quads(
                self.anchor,
                self.iter().filter(|&q| !other.contains(q)),
            )),
        }
    }

    /// True if every quad of `other` is present here
    pub fn contains_all(&self, other: &QuadForest) -> bool {
        match (self.anchor_ref(), other.anchor_ref()) {
            (Some(a), Some(b)) if a.order() == b.order() => a.is_superset(b),
            _ => other.iter().all(|q| self.contains(q)),
        }
    }

    /// True if both forests hold exactly the same quads
    pub fn equals(&self, other: &QuadForest) -> bool {
        self.size() == other.size() && self.contains_all(other)
    }

    /// Union with an identifier sequence
    pub fn union_ids(&self, seq: &IdSequence) -> QuadForest {
        let mut tree = self.anchor_snapshot();
        for quad in seq.iter() {
            tree.insert(quad);
        }
        Self::from_tree(tree)
    }

    /// Intersection with an identifier sequence
    pub fn intersection_ids(&self, seq: &IdSequence) -> QuadForest {
        Self::from_tree(OrderedQuadSet::from_quads(
            self.anchor,
            seq.iter().filter(|&q| self.contains(q)),
        ))
    }

    /// Difference (`self \ seq`) with an identifier sequence
    pub fn difference_ids(&self, seq: &IdSequence) -> QuadForest {
        let mut tree = self.anchor_snapshot();
        for quad in seq.iter() {
            tree.remove(quad);
        }
        Self::from_tree(tree)
    }

    /// True if every quad of the sequence is present here
    pub fn contains_ids(&self, seq: &IdSequence) -> bool {
        seq.iter().all(|q| self.contains(q))
    }

    /// True if the forest holds exactly the quads of the sequence
    ///
    /// The sequence must be duplicate-free, as every sequence produced by
    /// a forest or dataset is.
    pub fn equals_ids(&self, seq: &IdSequence) -> bool {
        self.size() == seq.len() && self.contains_ids(seq)
    }
}

impl Default for QuadForest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest_with(quads: &[IdQuad]) -> QuadForest {
        let mut forest = QuadForest::new();
        for &q in quads {
            forest.insert(q);
        }
        forest
    }

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
    fn test_insert_remove_contains_size() {
        let mut forest = QuadForest::new();
        assert!(forest.insert([1, 2, 3, 0]));
        assert!(!forest.insert([1, 2, 3, 0]));
        assert!(forest.contains([1, 2, 3, 0]));
        assert_eq!(forest.size(), 1);

        assert!(forest.remove([1, 2, 3, 0]));
        assert!(!forest.remove([1, 2, 3, 0]));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_match_routes_and_materializes() {
        let forest = forest_with(&sample());
        assert_eq!(forest.materialized_count(), 1);

        // Predicate-only pattern routes to POGS and materializes it.
        let by_p = forest.match_pattern([None, Some(10), None, None]);
        assert_eq!(by_p.len(), 3);
        assert_eq!(forest.materialized_count(), 2);

        // A second query of the same shape reuses the tree.
        let again = forest.match_pattern([None, Some(11), None, None]);
        assert_eq!(again.len(), 2);
        assert_eq!(forest.materialized_count(), 2);
    }

    #[test]
    fn test_full_wildcard_builds_nothing() {
        let forest = forest_with(&sample());
        let all = forest.match_pattern([None; 4]);
        assert_eq!(all.len(), 5);
        assert_eq!(forest.materialized_count(), 1);

        // Anchor order is SPOG, so the result comes back sorted by subject.
        let subjects: Vec<_> = all.iter().map(|q| q[0]).collect();
        let mut sorted = subjects.clone();
        sorted.sort();
        assert_eq!(subjects, sorted);
    }

    #[test]
    fn test_materialized_trees_stay_in_sync() {
        let mut forest = forest_with(&sample());
        forest.ensure_index([false, true, false, false]);
        forest.ensure_index([false, false, false, true]);
        assert_eq!(forest.materialized_count(), 3);

        forest.insert([7, 7, 7, 7]);
        forest.remove([1, 10, 100, 0]);

        // Every materialized tree answers identically.
        for perm in Permutation::ALL {
            if let Some(tree) = forest.trees[perm.index()].get() {
                assert_eq!(tree.len(), forest.size(), "{}", perm);
                assert!(tree.contains([7, 7, 7, 7]));
                assert!(!tree.contains([1, 10, 100, 0]));
            }
        }
    }

    #[test]
    fn test_match_count_agrees_with_match() {
        let forest = forest_with(&sample());
        let patterns: Vec<IdPattern> = vec![
            [None; 4],
            [Some(1), None, None, None],
            [None, Some(10), None, None],
            [None, None, Some(100), None],
            [None, None, None, Some(0)],
            [Some(1), Some(10), Some(101), Some(0)],
            [Some(9), None, None, None],
        ];
        for pattern in patterns {
            assert_eq!(
                forest.match_count(pattern),
                forest.match_pattern(pattern).len(),
                "{:?}",
                pattern
            );
        }
    }

    #[test]
    fn test_delete_matches_small_path() {
        // Twenty quads, one match: removal stays element by element and
        // keeps the secondary tree alive.
        let mut forest = QuadForest::new();
        for s in 0..20 {
            forest.insert([s, 10, 100 + s, 0]);
        }
        forest.ensure_index([false, true, false, false]);

        let removed = forest.delete_matches([Some(3), None, None, None]);
        assert_eq!(removed, 1);
        assert_eq!(forest.size(), 19);
        assert!(!forest.contains([3, 10, 103, 0]));
        assert_eq!(forest.materialized_count(), 2);
    }

    #[test]
    fn test_delete_matches_rebuild_path() {
        let mut forest = forest_with(&sample());
        forest.ensure_index([false, true, false, false]);

        // Three quads out of five: anchor rebuild, secondary trees dropped.
        let removed = forest.delete_matches([None, None, None, Some(0)]);
        assert_eq!(removed, 3);
        assert_eq!(forest.size(), 2);
        assert_eq!(forest.materialized_count(), 1);
        assert!(forest.contains([1, 11, 100, 5]));
        assert!(forest.contains([2, 11, 102, 5]));
    }

    #[test]
    fn test_delete_matches_unmatched_is_noop() {
        let mut forest = forest_with(&sample());
        assert_eq!(forest.delete_matches([Some(9), None, None, None]), 0);
        assert_eq!(forest.size(), 5);
    }

    #[test]
    fn test_free_then_reuse() {
        let mut forest = forest_with(&sample());
        forest.free();
        assert_eq!(forest.size(), 0);
        assert_eq!(forest.materialized_count(), 0);
        assert!(forest.match_pattern([None; 4]).is_empty());
        assert_eq!(forest.match_count([None; 4]), 0);

        // Writes lazily re-materialize the anchor.
        forest.insert([1, 1, 1, 0]);
        assert_eq!(forest.size(), 1);
        assert!(forest.contains([1, 1, 1, 0]));
    }

    #[test]
    fn test_stats_track_materialization() {
        let forest = forest_with(&sample());
        let stats = forest.stats();
        assert_eq!(stats.size, 5);
        assert_eq!(stats.anchor, Permutation::Spog);
        assert_eq!(stats.materialized, vec![Permutation::Spog]);

        forest.ensure_index([false, false, true, false]);
        assert_eq!(
            forest.stats().materialized,
            vec![Permutation::Spog, Permutation::Ogsp]
        );
    }

    #[test]
    fn test_bulk_load_counts_new_quads() {
        let mut forest = QuadForest::new();
        let seq = IdSequence::from_flat(vec![1, 1, 1, 0, 2, 2, 2, 0, 1, 1, 1, 0]).unwrap();
        assert_eq!(forest.bulk_load(&seq), 2);
        assert_eq!(forest.size(), 2);
    }

    #[test]
    fn test_union_intersection_difference() {
        let a = forest_with(&[[1, 1, 1, 0], [2, 2, 2, 0]]);
        let b = forest_with(&[[1, 1, 1, 0], [3, 3, 3, 0]]);

        let union = a.union(&b);
        assert_eq!(union.size(), 3);

        let inter = a.intersection(&b);
        assert_eq!(inter.size(), 1);
        assert!(inter.contains([1, 1, 1, 0]));

        let diff = a.difference(&b);
        assert_eq!(diff.size(), 1);
        assert!(diff.contains([2, 2, 2, 0]));

        // Operands are untouched.
        assert_eq!(a.size(), 2);
        assert_eq!(b.size(), 2);
    }

    #[test]
    fn test_contains_all_and_equals() {
        let a = forest_with(&sample());
        let sub = forest_with(&sample()[..3]);
        assert!(a.contains_all(&sub));
        assert!(!sub.contains_all(&a));
        assert!(a.contains_all(&QuadForest::new()));

        let b = forest_with(&sample());
        assert!(a.equals(&b));
        assert!(a.equals(&a));
    }

    #[test]
    fn test_sequence_operands() {
        let forest = forest_with(&[[1, 1, 1, 0], [2, 2, 2, 0]]);
        let seq = IdSequence::from_flat(vec![1, 1, 1, 0, 3, 3, 3, 0]).unwrap();

        let union = forest.union_ids(&seq);
        assert_eq!(union.size(), 3);

        let inter = forest.intersection_ids(&seq);
        assert_eq!(inter.size(), 1);

        let diff = forest.difference_ids(&seq);
        assert_eq!(diff.size(), 1);
        assert!(diff.contains([2, 2, 2, 0]));

        assert!(!forest.contains_ids(&seq));
        assert!(forest.contains_ids(&forest.to_sequence()));
        assert!(forest.equals_ids(&forest.to_sequence()));
        assert!(!forest.equals_ids(&seq));
    }

    #[test]
    fn test_coherence_after_mixed_mutations() {
        let mut forest = QuadForest::new();
        for &q in &sample() {
            forest.insert(q);
        }
        forest.match_pattern([None, None, Some(100), None]);
        forest.insert([9, 9, 9, 9]);
        forest.delete_matches([Some(1), None, None, None]);

        let from_anchor: Vec<_> = forest.iter().collect();
        for perm in Permutation::ALL {
            if let Some(tree) = forest.trees[perm.index()].get() {
                let mut quads: Vec<_> = tree.iter().collect();
                quads.sort();
                let mut expected = from_anchor.clone();
                expected.sort();
                assert_eq!(quads, expected, "{}", perm);
            }
        }
    }
}
