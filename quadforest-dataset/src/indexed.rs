//! Indexed dataset facades
//!
//! [`IndexedDataset`] wraps a shared [`TermInterner`] and one of four
//! internal representations:
//!
//! - nothing (empty or freed),
//! - a cached identifier sequence (the flat result of a query),
//! - a forest of index trees,
//! - both (a forest plus a still-valid cached sequence).
//!
//! Reads promote the cheapest representation upward without invalidating
//! the cache; mutations force a modifiable forest and drop the cache.
//! The [`SharingPolicy`] and [`CachePolicy`] type parameters pick the
//! variant at construction; see the aliases at the bottom of this module.
//!
//! ## Set algebra
//!
//! When both operands alias one interner, operations run entirely on
//! identifier tuples. Otherwise the right-hand side is decoded and
//! re-interned: lookups (`intersection`, `difference`, `contains_all`,
//! `equals`) use non-mutating interning where an unknown term simply
//! cannot match, while `union` and `add_all` admit new terms.

use crate::dataset::Dataset;
use crate::policy::{CachePolicy, IdList, SharingPolicy, Shared};
use quadforest_core::{
    IdQuad, IdSequence, InternerHandle, Quad, QuadForest, QuadPattern, Result,
    SimpleTermFactory, TermFactory, TermInterner,
};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Internal representation of the facade's content
enum Repr {
    Empty,
    Sequence(IdSequence),
    Forest(QuadForest),
    Both { forest: QuadForest, cache: IdSequence },
}

/// A dataset facade over a shared interner and a quad forest
pub struct IndexedDataset<F = SimpleTermFactory, S = Shared, C = IdList>
where
    F: TermFactory,
    S: SharingPolicy,
    C: CachePolicy,
{
    interner: InternerHandle<F>,
    repr: Repr,
    _policies: PhantomData<(S, C)>,
}

impl<F, S, C> IndexedDataset<F, S, C>
where
    F: TermFactory,
    S: SharingPolicy,
    C: CachePolicy,
{
    /// Create an empty dataset with a fresh interner
    pub fn new() -> Self
    where
        F: Default,
    {
        Self::with_factory(F::default())
    }

    /// Create an empty dataset keying terms with `factory`
    pub fn with_factory(factory: F) -> Self {
        Self::with_interner(TermInterner::new(factory).into_shared())
    }

    /// Create an empty dataset over an existing interner
    pub fn with_interner(interner: InternerHandle<F>) -> Self {
        Self {
            interner,
            repr: Repr::Empty,
            _policies: PhantomData,
        }
    }

    /// The interner this dataset resolves terms with
    pub fn interner(&self) -> &InternerHandle<F> {
        &self.interner
    }

    /// Build a derived facade holding `seq`, per the sharing and cache
    /// policies
    fn derived(parent: &InternerHandle<F>, seq: IdSequence) -> Self {
        let interner = S::derive(parent, &seq);
        let repr = if seq.is_empty() {
            Repr::Empty
        } else if C::KEEPS_SEQUENCE {
            Repr::Sequence(seq)
        } else {
            Repr::Forest(QuadForest::from_sequence(&seq))
        };
        Self {
            interner,
            repr,
            _policies: PhantomData,
        }
    }

    /// Build a derived facade around a forest (set-algebra and map results)
    fn derived_forest(parent: &InternerHandle<F>, forest: QuadForest) -> Self {
        let interner = if S::SHARED {
            Arc::clone(parent)
        } else {
            S::derive(parent, &forest.to_sequence())
        };
        Self {
            interner,
            repr: Repr::Forest(forest),
            _policies: PhantomData,
        }
    }

    // === Representation transitions ===

    fn forest_opt(&self) -> Option<&QuadForest> {
        match &self.repr {
            Repr::Forest(forest) | Repr::Both { forest, .. } => Some(forest),
            _ => None,
        }
    }

    /// A forest for mutation: drops any cached sequence as stale
    fn forest_mut(&mut self) -> &mut QuadForest {
        self.repr = match std::mem::replace(&mut self.repr, Repr::Empty) {
            Repr::Empty => Repr::Forest(QuadForest::new()),
            Repr::Sequence(seq) => {
                debug!(quads = seq.len(), "promoting cached sequence for mutation");
                Repr::Forest(QuadForest::from_sequence(&seq))
            }
            Repr::Forest(forest) | Repr::Both { forest, .. } => Repr::Forest(forest),
        };
        match &mut self.repr {
            Repr::Forest(forest) => forest,
            _ => unreachable!("forest_mut always leaves a forest representation"),
        }
    }

    /// A forest for lookups: keeps a still-valid cached sequence alongside
    fn forest_read(&mut self) -> &QuadForest {
        self.repr = match std::mem::replace(&mut self.repr, Repr::Empty) {
            Repr::Empty => Repr::Forest(QuadForest::new()),
            Repr::Sequence(cache) => {
                debug!(quads = cache.len(), "materializing forest beside cached sequence");
                Repr::Both {
                    forest: QuadForest::from_sequence(&cache),
                    cache,
                }
            }
            other => other,
        };
        match &self.repr {
            Repr::Forest(forest) | Repr::Both { forest, .. } => forest,
            _ => unreachable!("forest_read always leaves a forest representation"),
        }
    }

    /// A standalone forest of this dataset's quads, leaving `self` as-is
    fn owned_forest(&self) -> QuadForest {
        match &self.repr {
            Repr::Empty => QuadForest::new(),
            Repr::Sequence(seq) => QuadForest::from_sequence(seq),
            Repr::Forest(forest) | Repr::Both { forest, .. } => forest.clone(),
        }
    }

    /// Identifier quads in the facade's current iteration order
    fn id_quads(&self) -> Box<dyn Iterator<Item = IdQuad> + '_> {
        match &self.repr {
            Repr::Empty => Box::new(std::iter::empty()),
            Repr::Sequence(seq) | Repr::Both { cache: seq, .. } => Box::new(seq.iter()),
            Repr::Forest(forest) => Box::new(forest.iter()),
        }
    }

    // === Single-quad operations ===

    /// Add a quad; idempotent
    pub fn add(&mut self, quad: &Quad<F::Term>) -> &mut Self {
        let ids = self.interner.write().intern_or_add_quad(quad);
        self.forest_mut().insert(ids);
        self
    }

    /// Delete a quad; no-op when absent or built from unknown terms
    pub fn delete(&mut self, quad: &Quad<F::Term>) -> &mut Self {
        let known = self.interner.read().try_intern_quad(quad);
        if let Some(ids) = known {
            self.forest_mut().remove(ids);
        }
        self
    }

    /// Membership test
    pub fn has(&mut self, quad: &Quad<F::Term>) -> bool {
        let known = self.interner.read().try_intern_quad(quad);
        match known {
            None => false,
            Some(ids) => self.forest_read().contains(ids),
        }
    }

    /// Number of quads
    pub fn size(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            // Cached sequences are duplicate-free by construction.
            Repr::Sequence(seq) => seq.len(),
            Repr::Forest(forest) | Repr::Both { forest, .. } => forest.size(),
        }
    }

    /// Reset to empty; the interner is left intact
    pub fn free(&mut self) {
        self.repr = Repr::Empty;
    }

    // === Pattern operations ===

    /// All quads matching the pattern, as a new dataset
    ///
    /// The result holds a raw identifier sequence (cached variants) or a
    /// freshly loaded forest (forest-only variants). An unsatisfiable
    /// pattern yields an empty dataset without touching any index.
    pub fn match_pattern(&mut self, pattern: &QuadPattern<F::Term>) -> Self {
        let lifted = self.interner.read().match_ids(pattern);
        let seq = match lifted {
            None => IdSequence::new(),
            Some(ids) => self.forest_read().match_pattern(ids),
        };
        Self::derived(&self.interner, seq)
    }

    /// Number of quads matching the pattern
    pub fn count_quads(&mut self, pattern: &QuadPattern<F::Term>) -> usize {
        let lifted = self.interner.read().match_ids(pattern);
        match lifted {
            None => 0,
            Some(ids) => self.forest_read().match_count(ids),
        }
    }

    /// Remove every quad matching the pattern
    pub fn delete_matches(&mut self, pattern: &QuadPattern<F::Term>) -> &mut Self {
        let lifted = self.interner.read().match_ids(pattern);
        if let Some(ids) = lifted {
            self.forest_mut().delete_matches(ids);
        }
        self
    }

    /// Eagerly build the index tree suited to the given bound positions
    pub fn ensure_index_for(&mut self, s: bool, p: bool, o: bool, g: bool) {
        self.forest_read().ensure_index([s, p, o, g]);
    }

    // === Bulk and higher-order operations ===

    /// Add every quad of an iterable
    pub fn add_all<I>(&mut self, quads: I) -> &mut Self
    where
        I: IntoIterator<Item = Quad<F::Term>>,
    {
        let handle = Arc::clone(&self.interner);
        let forest = self.forest_mut();
        let mut interner = handle.write();
        for quad in quads {
            forest.insert(interner.intern_or_add_quad(&quad));
        }
        self
    }

    /// Quads passing the predicate, as a new dataset
    ///
    /// The result keeps the identifier-sequence representation: the source
    /// is duplicate-free, so no dedupe pass is needed.
    pub fn filter(&self, mut pred: impl FnMut(&Quad<F::Term>) -> bool) -> Result<Self> {
        let mut seq = IdSequence::new();
        {
            let interner = self.interner.read();
            for ids in self.id_quads() {
                if pred(&interner.decode_quad(ids)?) {
                    seq.push(ids);
                }
            }
        }
        Ok(Self::derived(&self.interner, seq))
    }

    /// Transformed quads, as a new dataset
    ///
    /// The transform may introduce duplicates or brand-new terms, so the
    /// result is always deduplicated through a forest, and new terms are
    /// admitted into the parent interner.
    pub fn map(&self, mut transform: impl FnMut(Quad<F::Term>) -> Quad<F::Term>) -> Result<Self> {
        let source: Vec<IdQuad> = self.id_quads().collect();
        let mut forest = QuadForest::new();
        {
            let mut interner = self.interner.write();
            for ids in source {
                let mapped = transform(interner.decode_quad(ids)?);
                forest.insert(interner.intern_or_add_quad(&mapped));
            }
        }
        Ok(Self::derived_forest(&self.interner, forest))
    }

    /// True if every quad passes the predicate
    pub fn every(&self, mut pred: impl FnMut(&Quad<F::Term>) -> bool) -> Result<bool> {
        for quad in self.iter() {
            if !pred(&quad?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True if any quad passes the predicate
    pub fn some(&self, mut pred: impl FnMut(&Quad<F::Term>) -> bool) -> Result<bool> {
        for quad in self.iter() {
            if pred(&quad?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Visit every quad
    pub fn for_each(&self, mut visit: impl FnMut(&Quad<F::Term>)) -> Result<()> {
        for quad in self.iter() {
            visit(&quad?);
        }
        Ok(())
    }

    /// Fold every quad into an accumulator
    pub fn reduce<A>(
        &self,
        init: A,
        mut fold: impl FnMut(A, Quad<F::Term>) -> A,
    ) -> Result<A> {
        let mut acc = init;
        for quad in self.iter() {
            acc = fold(acc, quad?);
        }
        Ok(acc)
    }

    // === Extraction ===

    /// Lazily decoded quads in the facade's current iteration order
    pub fn iter(&self) -> Quads<'_, F> {
        Quads {
            ids: self.id_quads(),
            interner: &self.interner,
        }
    }

    /// Every quad, decoded
    pub fn to_array(&self) -> Result<Vec<Quad<F::Term>>> {
        self.iter().collect()
    }

    /// The content as a flat identifier sequence
    pub fn as_identifier_sequence(&self) -> IdSequence {
        match &self.repr {
            Repr::Empty => IdSequence::new(),
            Repr::Sequence(seq) | Repr::Both { cache: seq, .. } => seq.clone(),
            Repr::Forest(forest) => forest.to_sequence(),
        }
    }

    // === Set algebra ===

    /// True when both facades alias the same interner, making identifier
    /// spaces directly comparable
    pub fn same_interner<S2, C2>(&self, other: &IndexedDataset<F, S2, C2>) -> bool
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        Arc::ptr_eq(&self.interner, &other.interner)
    }

    /// Decode `other` and lift its quads into this interner without
    /// admitting new terms
    ///
    /// Returns the lifted sequence plus whether every quad lifted; a quad
    /// with an unknown term cannot be present on this side.
    fn lift_other<S2, C2>(
        &self,
        other: &IndexedDataset<F, S2, C2>,
    ) -> Result<(IdSequence, bool)>
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        let quads = other.to_array()?;
        let interner = self.interner.read();
        let mut seq = IdSequence::new();
        let mut all_known = true;
        for quad in &quads {
            match interner.try_intern_quad(quad) {
                Some(ids) => seq.push(ids),
                None => all_known = false,
            }
        }
        Ok((seq, all_known))
    }

    /// Union, as a new dataset
    ///
    /// New terms from `other` are admitted into this side's interner.
    pub fn union<S2, C2>(&self, other: &IndexedDataset<F, S2, C2>) -> Result<Self>
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        let mut forest = self.owned_forest();
        if self.same_interner(other) {
            match other.forest_opt() {
                Some(theirs) => forest = forest.union(theirs),
                None => {
                    forest.bulk_load(&other.as_identifier_sequence());
                }
            }
        } else {
            let quads = other.to_array()?;
            let mut interner = self.interner.write();
            for quad in &quads {
                forest.insert(interner.intern_or_add_quad(quad));
            }
        }
        Ok(Self::derived_forest(&self.interner, forest))
    }

    /// Intersection, as a new dataset
    pub fn intersection<S2, C2>(&self, other: &IndexedDataset<F, S2, C2>) -> Result<Self>
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        let ours = self.owned_forest();
        let forest = if self.same_interner(other) {
            match other.forest_opt() {
                Some(theirs) => ours.intersection(theirs),
                None => ours.intersection_ids(&other.as_identifier_sequence()),
            }
        } else {
            let (lifted, _) = self.lift_other(other)?;
            ours.intersection_ids(&lifted)
        };
        Ok(Self::derived_forest(&self.interner, forest))
    }

    /// Difference (`self \ other`), as a new dataset
    pub fn difference<S2, C2>(&self, other: &IndexedDataset<F, S2, C2>) -> Result<Self>
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        let ours = self.owned_forest();
        let forest = if self.same_interner(other) {
            match other.forest_opt() {
                Some(theirs) => ours.difference(theirs),
                None => ours.difference_ids(&other.as_identifier_sequence()),
            }
        } else {
            let (lifted, _) = self.lift_other(other)?;
            ours.difference_ids(&lifted)
        };
        Ok(Self::derived_forest(&self.interner, forest))
    }

    /// True if every quad of `other` is present here
    pub fn contains_all<S2, C2>(&self, other: &IndexedDataset<F, S2, C2>) -> Result<bool>
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        if self.same_interner(other) {
            let ours = self.owned_forest();
            return Ok(match other.forest_opt() {
                Some(theirs) => ours.contains_all(theirs),
                None => ours.contains_ids(&other.as_identifier_sequence()),
            });
        }
        let (lifted, all_known) = self.lift_other(other)?;
        if !all_known {
            // Some quad of `other` uses a term this side has never seen.
            return Ok(false);
        }
        Ok(self.owned_forest().contains_ids(&lifted))
    }

    /// True if both datasets hold exactly the same quads
    ///
    /// Equality is identifier equality: blank nodes compare by label, not
    /// by graph isomorphism.
    pub fn equals<S2, C2>(&self, other: &IndexedDataset<F, S2, C2>) -> Result<bool>
    where
        S2: SharingPolicy,
        C2: CachePolicy,
    {
        if self.size() != other.size() {
            return Ok(false);
        }
        self.contains_all(other)
    }
}

impl<F, S, C> Default for IndexedDataset<F, S, C>
where
    F: TermFactory + Default,
    S: SharingPolicy,
    C: CachePolicy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F, S, C> Dataset for IndexedDataset<F, S, C>
where
    F: TermFactory,
    S: SharingPolicy,
    C: CachePolicy,
{
    type Term = F::Term;

    fn add(&mut self, quad: &Quad<F::Term>) -> &mut Self {
        IndexedDataset::add(self, quad)
    }

    fn delete(&mut self, quad: &Quad<F::Term>) -> &mut Self {
        IndexedDataset::delete(self, quad)
    }

    fn has(&mut self, quad: &Quad<F::Term>) -> bool {
        IndexedDataset::has(self, quad)
    }

    fn match_pattern(&mut self, pattern: &QuadPattern<F::Term>) -> Self {
        IndexedDataset::match_pattern(self, pattern)
    }

    fn size(&self) -> usize {
        IndexedDataset::size(self)
    }

    fn to_quads(&self) -> Result<Vec<Quad<F::Term>>> {
        self.to_array()
    }

    fn free(&mut self) {
        IndexedDataset::free(self)
    }
}

/// Lazily decoded quad iterator for a facade
pub struct Quads<'a, F: TermFactory> {
    ids: Box<dyn Iterator<Item = IdQuad> + 'a>,
    interner: &'a InternerHandle<F>,
}

impl<F: TermFactory> Iterator for Quads<'_, F> {
    type Item = Result<Quad<F::Term>>;

    fn next(&mut self) -> Option<Self::Item> {
        let ids = self.ids.next()?;
        Some(self.interner.read().decode_quad(ids))
    }
}
