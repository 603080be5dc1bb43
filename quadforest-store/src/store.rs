//! Stream-shaped quad store
//!
//! [`QuadStore`] is the same interner-plus-forest model as the dataset
//! facades with a stream boundary: `match` produces a quad stream,
//! `import` and `remove` consume fallible quad streams in arrival order,
//! and `remove_matches` runs as a deferred task.
//!
//! ## Deferral
//!
//! The async operations own no background machinery: a returned future is
//! inert until polled, so work happens on a later turn of the caller's
//! executor and completion is observed by awaiting. No ordering is
//! promised between an unawaited `remove_matches` and later synchronous
//! mutations.
//!
//! ## Freed state
//!
//! `free` drops the forest (the interner, possibly shared, stays intact);
//! any write lazily re-materializes it.

use futures::stream::{self, Stream, StreamExt};
use quadforest_core::{
    Error, IdSequence, InternerHandle, Quad, QuadForest, QuadPattern, Result, SimpleTermFactory,
    TermFactory, TermInterner,
};
use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use tracing::debug;

/// A graph designator for [`QuadStore::delete_graph`]
///
/// Plain strings are wrapped as named nodes; anything else must arrive as
/// a term already. Literal or blank-node graph names have no string form
/// here.
pub enum GraphTarget<T> {
    /// An IRI to wrap as a named node
    Iri(String),
    /// A ready-made graph term
    Term(T),
}

impl<T> From<&str> for GraphTarget<T> {
    fn from(iri: &str) -> Self {
        GraphTarget::Iri(iri.to_owned())
    }
}

impl<T> From<String> for GraphTarget<T> {
    fn from(iri: String) -> Self {
        GraphTarget::Iri(iri)
    }
}

/// In-memory quad store with a stream boundary
pub struct QuadStore<F: TermFactory = SimpleTermFactory> {
    interner: InternerHandle<F>,
    forest: Option<QuadForest>,
}

impl<F: TermFactory> QuadStore<F> {
    /// Create an empty store with a fresh interner
    pub fn new() -> Self
    where
        F: Default,
    {
        Self::with_factory(F::default())
    }

    /// Create an empty store keying terms with `factory`
    pub fn with_factory(factory: F) -> Self {
        Self::with_interner(TermInterner::new(factory).into_shared())
    }

    /// Create an empty store over an existing interner
    pub fn with_interner(interner: InternerHandle<F>) -> Self {
        Self {
            interner,
            forest: Some(QuadForest::new()),
        }
    }

    /// The interner this store resolves terms with
    pub fn interner(&self) -> &InternerHandle<F> {
        &self.interner
    }

    fn forest_mut(&mut self) -> &mut QuadForest {
        self.forest.get_or_insert_with(QuadForest::new)
    }

    /// Number of quads
    pub fn size(&self) -> usize {
        self.forest.as_ref().map_or(0, QuadForest::size)
    }

    /// Membership test
    pub fn has(&self, quad: &Quad<F::Term>) -> bool {
        let known = self.interner.read().try_intern_quad(quad);
        match (known, self.forest.as_ref()) {
            (Some(ids), Some(forest)) => forest.contains(ids),
            _ => false,
        }
    }

    /// Add one quad synchronously; idempotent
    pub fn add(&mut self, quad: &Quad<F::Term>) {
        let ids = self.interner.write().intern_or_add_quad(quad);
        self.forest_mut().insert(ids);
    }

    /// Add one quad from its four positions
    pub fn add_quad(
        &mut self,
        subject: F::Term,
        predicate: F::Term,
        object: F::Term,
        graph: F::Term,
    ) {
        let quad = self
            .interner
            .read()
            .factory()
            .quad(subject, predicate, object, graph);
        self.add(&quad);
    }

    /// Drop the forest; the next write re-materializes it
    pub fn free(&mut self) {
        self.forest = None;
    }

    /// Stream every quad matching the pattern
    ///
    /// The match is computed against the store's state at call time and
    /// emitted in the scanned tree's permutation order; later mutations do
    /// not affect an already-created stream.
    pub fn match_pattern(
        &self,
        pattern: &QuadPattern<F::Term>,
    ) -> impl Stream<Item = Result<Quad<F::Term>>> {
        let seq = {
            let lifted = self.interner.read().match_ids(pattern);
            match (lifted, self.forest.as_ref()) {
                (Some(ids), Some(forest)) => forest.match_pattern(ids),
                _ => IdSequence::new(),
            }
        };
        let interner = Arc::clone(&self.interner);
        stream::iter(seq).map(move |ids| interner.read().decode_quad(ids))
    }

    /// Number of quads matching the pattern
    pub fn match_count(&self, pattern: &QuadPattern<F::Term>) -> usize {
        let lifted = self.interner.read().match_ids(pattern);
        match (lifted, self.forest.as_ref()) {
            (Some(ids), Some(forest)) => forest.match_count(ids),
            _ => 0,
        }
    }

    /// Intern and insert every quad of a stream, in arrival order
    ///
    /// A stream error is forwarded after the quads that preceded it have
    /// been inserted. Resolves to the number of processed quads.
    pub async fn import<St, E>(&mut self, quads: St) -> Result<usize>
    where
        St: Stream<Item = std::result::Result<Quad<F::Term>, E>>,
        E: fmt::Display,
    {
        let mut quads = pin!(quads);
        let mut imported = 0;
        while let Some(item) = quads.next().await {
            match item {
                Ok(quad) => {
                    self.add(&quad);
                    imported += 1;
                }
                Err(e) => return Err(Error::stream(e.to_string())),
            }
        }
        debug!(imported, "import stream ended");
        Ok(imported)
    }

    /// Remove every quad of a stream that is present, in arrival order
    ///
    /// Quads built from terms this store has never seen are silently
    /// skipped. Resolves to the number of quads actually removed.
    pub async fn remove<St, E>(&mut self, quads: St) -> Result<usize>
    where
        St: Stream<Item = std::result::Result<Quad<F::Term>, E>>,
        E: fmt::Display,
    {
        let mut quads = pin!(quads);
        let mut removed = 0;
        while let Some(item) = quads.next().await {
            match item {
                Ok(quad) => {
                    let known = self.interner.read().try_intern_quad(&quad);
                    if let Some(ids) = known {
                        if self.forest_mut().remove(ids) {
                            removed += 1;
                        }
                    }
                }
                Err(e) => return Err(Error::stream(e.to_string())),
            }
        }
        debug!(removed, "remove stream ended");
        Ok(removed)
    }

    /// Remove every quad matching the pattern, as a deferred task
    ///
    /// An unsatisfiable pattern (a bound term the store has never seen)
    /// completes immediately without touching the forest. Resolves to the
    /// number of quads removed.
    pub async fn remove_matches(&mut self, pattern: &QuadPattern<F::Term>) -> usize {
        let lifted = self.interner.read().match_ids(pattern);
        match (lifted, self.forest.as_mut()) {
            (Some(ids), Some(forest)) => forest.delete_matches(ids),
            _ => 0,
        }
    }

    /// Remove every quad in the given graph
    ///
    /// Strings are wrapped as named nodes and delegated to
    /// [`remove_matches`](Self::remove_matches) on the graph position.
    pub async fn delete_graph(&mut self, graph: impl Into<GraphTarget<F::Term>>) -> usize {
        let term = match graph.into() {
            GraphTarget::Iri(iri) => self.interner.read().factory().named_node(&iri),
            GraphTarget::Term(term) => term,
        };
        let pattern = QuadPattern::new(None, None, None, Some(term));
        self.remove_matches(&pattern).await
    }
}

impl<F: TermFactory + Default> Default for QuadStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a store by draining a quad stream
///
/// Resolves to the populated store once the stream ends.
pub async fn import_stream<F, St, E>(factory: F, quads: St) -> Result<QuadStore<F>>
where
    F: TermFactory,
    St: Stream<Item = std::result::Result<Quad<F::Term>, E>>,
    E: fmt::Display,
{
    let mut store = QuadStore::with_factory(factory);
    store.import(quads).await?;
    Ok(store)
}
