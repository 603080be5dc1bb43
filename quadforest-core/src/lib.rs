//! # Quadforest Core
//!
//! In-memory RDF quad storage built from two pieces:
//!
//! - A [`TermInterner`] that reduces RDF terms to dense 32-bit identifiers
//!   (and back), keyed by a pluggable [`TermFactory`].
//! - A [`QuadForest`] of ordered index trees over identifier quads, one per
//!   position [`Permutation`], materialized lazily as pattern queries ask
//!   for them.
//!
//! ## Design Principles
//!
//! 1. **Identifiers inside, terms at the boundary**: forests never see a
//!    term; interning happens once per quad at the edge.
//! 2. **Lazy indexes**: a forest starts with one tree and grows another
//!    only when a query shape needs it.
//! 3. **Strict total ordering**: index trees order whole identifier
//!    tuples; wildcard handling lives in range bounds, not comparators.

pub mod error;
pub mod factory;
pub mod forest;
pub mod ids;
pub mod interner;
pub mod permutation;
pub mod quad;
pub mod quadset;
pub mod term;
pub mod vocab;

// Re-export main types
pub use error::{Error, Result};
pub use factory::{SimpleTermFactory, TermFactory};
pub use forest::{ForestStats, QuadForest};
pub use ids::{
    bound_positions, pattern_matches, IdPattern, IdQuad, IdSequence, TermId, DEFAULT_GRAPH_ID,
};
pub use interner::{InternerHandle, TermInterner};
pub use permutation::Permutation;
pub use quad::{Quad, QuadPattern};
pub use quadset::{OrderedQuadSet, ScanIter};
pub use term::{Term, TermKind};
