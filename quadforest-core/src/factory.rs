//! Term factory seam
//!
//! The store never inspects terms structurally; everything it needs is
//! behind [`TermFactory`]: construct the default graph and named nodes,
//! normalize foreign terms, assemble quads, and produce a canonical key
//! string whose equality coincides with semantic term equality. The
//! interner is generic over this trait, so any conforming term model plugs
//! in without touching the index machinery.
//!
//! [`SimpleTermFactory`] is the batteries-included implementation over
//! [`Term`](crate::term::Term).

use crate::quad::Quad;
use crate::term::Term;
use std::fmt;

/// Builds and inspects terms on behalf of the store
///
/// The `key` contract is load-bearing: `key(a) == key(b)` must hold exactly
/// when `a` and `b` denote the same RDF term, across all term kinds
/// (including literals with language tags or datatypes, and the default
/// graph).
pub trait TermFactory: Clone {
    /// The term type this factory produces
    type Term: Clone + fmt::Debug;

    /// The default graph marker; stable identity across calls
    fn default_graph(&self) -> Self::Term;

    /// A named node for the given IRI
    fn named_node(&self, iri: &str) -> Self::Term;

    /// Normalize any conforming term into this factory's representation
    fn from_term(&self, term: &Self::Term) -> Self::Term;

    /// Assemble a quad from four terms
    fn quad(
        &self,
        subject: Self::Term,
        predicate: Self::Term,
        object: Self::Term,
        graph: Self::Term,
    ) -> Quad<Self::Term> {
        Quad::new(subject, predicate, object, graph)
    }

    /// Canonical key; equal iff the terms are semantically equal
    fn key(&self, term: &Self::Term) -> String;
}

/// Factory over the crate's own [`Term`] model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimpleTermFactory;

impl TermFactory for SimpleTermFactory {
    type Term = Term;

    fn default_graph(&self) -> Term {
        Term::default_graph()
    }

    fn named_node(&self, iri: &str) -> Term {
        Term::named_node(iri)
    }

    fn from_term(&self, term: &Term) -> Term {
        // Term constructors already normalize (xsd:string literals), so a
        // clone is a faithful normalization.
        term.clone()
    }

    fn key(&self, term: &Term) -> String {
        term.canonical_key()
    }
}
