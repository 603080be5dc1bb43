//! The public dataset contract
//!
//! Every facade variant implements [`Dataset`]; variant-specific behavior
//! (interner sharing, sequence caching) is fixed at construction, not
//! observable through this trait.
//!
//! Reads may promote the facade's internal representation (a cached
//! identifier sequence becomes a forest the first time a lookup needs
//! one), which is why lookups take `&mut self`.

use quadforest_core::{Quad, QuadPattern, Result};
use std::fmt;

/// The dataset contract shared by all facade variants
pub trait Dataset: Sized {
    /// The term type quads are made of
    type Term: Clone + fmt::Debug;

    /// Add a quad; idempotent
    fn add(&mut self, quad: &Quad<Self::Term>) -> &mut Self;

    /// Delete a quad; no-op if absent
    fn delete(&mut self, quad: &Quad<Self::Term>) -> &mut Self;

    /// Membership test
    fn has(&mut self, quad: &Quad<Self::Term>) -> bool;

    /// All quads matching the pattern, as a new dataset
    fn match_pattern(&mut self, pattern: &QuadPattern<Self::Term>) -> Self;

    /// Number of quads
    fn size(&self) -> usize;

    /// Every quad, decoded, in the facade's current iteration order
    fn to_quads(&self) -> Result<Vec<Quad<Self::Term>>>;

    /// Reset to empty; the facade stays usable and lazily reallocates
    fn free(&mut self);
}
