//! Construction-time facade policies
//!
//! The four dataset variants differ on two orthogonal toggles, both encoded
//! as zero-sized types resolved at construction: how a derived facade
//! obtains its interner ([`SharingPolicy`]), and whether derived query
//! results are held as raw identifier sequences or promoted straight into a
//! forest ([`CachePolicy`]). Behavior contracts are identical across
//! variants; memory and amortization differ.

use quadforest_core::{IdSequence, InternerHandle, TermFactory};
use std::sync::Arc;

/// How a derived facade obtains its interner
pub trait SharingPolicy {
    /// True when derived facades alias the parent interner
    const SHARED: bool;

    /// The interner handle for a facade derived from `parent` whose
    /// content is `ids`
    fn derive<F: TermFactory>(parent: &InternerHandle<F>, ids: &IdSequence) -> InternerHandle<F>;
}

/// Derived facades alias the parent's interner
pub struct Shared;

impl SharingPolicy for Shared {
    const SHARED: bool = true;

    fn derive<F: TermFactory>(parent: &InternerHandle<F>, _ids: &IdSequence) -> InternerHandle<F> {
        Arc::clone(parent)
    }
}

/// Derived facades clone only the identifiers reachable from the result
///
/// The clone preserves identifier values and the allocation watermark, so
/// the derived facade keeps decoding sequences minted by the parent while
/// letting the parent (and the rest of its interner) be dropped.
pub struct Isolated;

impl SharingPolicy for Isolated {
    const SHARED: bool = false;

    fn derive<F: TermFactory>(parent: &InternerHandle<F>, ids: &IdSequence) -> InternerHandle<F> {
        parent.read().clone_subset(ids.ids()).into_shared()
    }
}

/// What representation a derived query result is held in
pub trait CachePolicy {
    /// True when results stay as identifier sequences until a mutation
    /// forces a forest
    const KEEPS_SEQUENCE: bool;
}

/// Hold results as identifier sequences (cheapest for read-and-discard)
pub struct IdList;

impl CachePolicy for IdList {
    const KEEPS_SEQUENCE: bool = true;
}

/// Promote results into a forest immediately
pub struct ForestOnly;

impl CachePolicy for ForestOnly {
    const KEEPS_SEQUENCE: bool = false;
}
