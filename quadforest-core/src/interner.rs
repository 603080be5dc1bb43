//! Bidirectional term ↔ identifier dictionary
//!
//! [`TermInterner`] maps canonical term keys to dense [`TermId`]s and back:
//! forward lookups index a `Vec` (O(1), no hashing), reverse lookups hash
//! the factory's canonical key once. Identifier 0 is pre-assigned to the
//! default graph; everything else is allocated monotonically from 1 and
//! never reused while the interner lives.
//!
//! ## Sharing
//!
//! Datasets derived from one another share a single interner through
//! [`InternerHandle`]; the interner lives as long as its longest holder.
//! Set-algebra reads never grow the interner; only explicit inserts
//! (`intern_or_add*`) do.
//!
//! ## Subset clones
//!
//! [`clone_subset`](TermInterner::clone_subset) builds an interner holding
//! exactly the given identifiers while preserving their values and the
//! allocation watermark, so sequences minted by the source stay decodable
//! in the clone.

use crate::error::{Error, Result};
use crate::factory::TermFactory;
use crate::ids::{IdPattern, IdQuad, TermId, DEFAULT_GRAPH_ID};
use crate::quad::{Quad, QuadPattern};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared ownership handle for an interner
pub type InternerHandle<F> = Arc<RwLock<TermInterner<F>>>;

/// Bidirectional term ↔ identifier dictionary
///
/// - **Forward:** `Vec<Option<Term>>` indexed by identifier. `None` marks a
///   hole left by a subset clone; dense interners have no holes.
/// - **Reverse:** `HashMap<Box<str>, TermId>` keyed by canonical key.
/// - **Insert-only:** identifiers are never reused or forgotten.
#[derive(Clone, Debug)]
pub struct TermInterner<F: TermFactory> {
    factory: F,
    terms: Vec<Option<F::Term>>,
    reverse: HashMap<Box<str>, TermId>,
}

impl<F: TermFactory> TermInterner<F> {
    /// Create an interner with the default graph pre-assigned identifier 0
    pub fn new(factory: F) -> Self {
        let default_graph = factory.default_graph();
        let key = factory.key(&default_graph);
        let mut reverse = HashMap::new();
        reverse.insert(key.into_boxed_str(), DEFAULT_GRAPH_ID);
        Self {
            factory,
            terms: vec![Some(default_graph)],
            reverse,
        }
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> InternerHandle<F> {
        Arc::new(RwLock::new(self))
    }

    /// The factory this interner keys terms with
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The next identifier that will be allocated
    pub fn next_id(&self) -> TermId {
        self.terms.len() as TermId
    }

    /// Number of terms currently mapped
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Always false: the default graph is mapped from birth
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Look up or allocate the identifier for `term`
    ///
    /// Allocation is monotonic; re-interning an existing term returns the
    /// identifier it was first given.
    pub fn intern_or_add(&mut self, term: &F::Term) -> TermId {
        let key = self.factory.key(term);
        if let Some(&id) = self.reverse.get(key.as_str()) {
            return id;
        }

        let id = TermId::try_from(self.terms.len()).expect("TermId overflow: interner full");
        self.terms.push(Some(self.factory.from_term(term)));
        self.reverse.insert(key.into_boxed_str(), id);
        id
    }

    /// Look up the identifier for `term` without mutating
    pub fn try_intern(&self, term: &F::Term) -> Option<TermId> {
        self.reverse.get(self.factory.key(term).as_str()).copied()
    }

    /// Forward lookup: resolve an identifier to its term
    pub fn term(&self, id: TermId) -> Option<&F::Term> {
        self.terms.get(id as usize).and_then(|slot| slot.as_ref())
    }

    /// Intern all four positions of a quad, allocating as needed
    pub fn intern_or_add_quad(&mut self, quad: &Quad<F::Term>) -> IdQuad {
        [
            self.intern_or_add(&quad.subject),
            self.intern_or_add(&quad.predicate),
            self.intern_or_add(&quad.object),
            self.intern_or_add(&quad.graph),
        ]
    }

    /// Look up all four positions of a quad without mutating
    ///
    /// `None` when any position is unknown, in which case the quad cannot
    /// be present in any structure keyed by this interner.
    pub fn try_intern_quad(&self, quad: &Quad<F::Term>) -> Option<IdQuad> {
        Some([
            self.try_intern(&quad.subject)?,
            self.try_intern(&quad.predicate)?,
            self.try_intern(&quad.object)?,
            self.try_intern(&quad.graph)?,
        ])
    }

    /// Decode an identifier quad back into terms
    ///
    /// Fails with [`Error::StaleIdentifier`] when any component identifier
    /// is unmapped; on well-formed state this cannot happen.
    pub fn decode_quad(&self, quad: IdQuad) -> Result<Quad<F::Term>> {
        let resolve = |id: TermId| self.term(id).cloned().ok_or(Error::StaleIdentifier(id));
        Ok(Quad::new(
            resolve(quad[0])?,
            resolve(quad[1])?,
            resolve(quad[2])?,
            resolve(quad[3])?,
        ))
    }

    /// Lift a term pattern into identifier space
    ///
    /// Wildcards pass through; a bound term that is unknown to this
    /// interner makes the whole pattern unsatisfiable, signalled by `None`.
    pub fn match_ids(&self, pattern: &QuadPattern<F::Term>) -> Option<IdPattern> {
        let mut out: IdPattern = [None; 4];
        for (slot, position) in out.iter_mut().zip(pattern.positions()) {
            *slot = match position {
                None => None,
                Some(term) => Some(self.try_intern(term)?),
            };
        }
        Some(out)
    }

    /// Build an interner holding exactly the given identifiers
    ///
    /// Identifier values and the allocation watermark are preserved; the
    /// default graph mapping is always carried over. Identifiers the source
    /// never minted are ignored.
    pub fn clone_subset(&self, ids: impl IntoIterator<Item = TermId>) -> Self {
        let mut terms: Vec<Option<F::Term>> = vec![None; self.terms.len()];
        let mut reverse = HashMap::new();

        let mut keep = |id: TermId, terms: &mut Vec<Option<F::Term>>| {
            if let Some(term) = self.term(id) {
                if terms[id as usize].is_none() {
                    reverse.insert(self.factory.key(term).into_boxed_str(), id);
                    terms[id as usize] = Some(term.clone());
                }
            }
        };

        keep(DEFAULT_GRAPH_ID, &mut terms);
        for id in ids {
            keep(id, &mut terms);
        }

        Self {
            factory: self.factory.clone(),
            terms,
            reverse,
        }
    }

    /// Iterate `(identifier, term)` pairs in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &F::Term)> {
        self.terms
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|t| (i as TermId, t)))
    }
}

impl<F: TermFactory + Default> Default for TermInterner<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}
