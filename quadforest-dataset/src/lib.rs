//! # Quadforest Dataset
//!
//! Dataset facades over [`quadforest_core`]: a shared interner plus a lazy
//! quad forest behind the public dataset contract ([`Dataset`]).
//!
//! Four interchangeable variants come from two construction-time toggles:
//!
//! | Alias | Interner of derived facades | Query results held as |
//! |-------|-----------------------------|-----------------------|
//! | [`CachedDataset`] | shared with parent | identifier sequence |
//! | [`ForestDataset`] | shared with parent | forest |
//! | [`IsolatedCachedDataset`] | reachable subset clone | identifier sequence |
//! | [`IsolatedForestDataset`] | reachable subset clone | forest |
//!
//! The contracts are identical; pick by workload. Sequence-caching
//! variants make `match` + iterate cheapest; forest-only variants pay the
//! index up front and answer lookups on the result immediately. Isolated
//! variants let derived facades outlive their parent without pinning the
//! parent's whole term dictionary.

pub mod dataset;
pub mod indexed;
pub mod policy;

pub use dataset::Dataset;
pub use indexed::{IndexedDataset, Quads};
pub use policy::{CachePolicy, ForestOnly, IdList, Isolated, Shared, SharingPolicy};

use quadforest_core::SimpleTermFactory;

/// Shared interner, identifier-sequence cache
pub type CachedDataset<F = SimpleTermFactory> = IndexedDataset<F, Shared, IdList>;

/// Shared interner, forest-only results
pub type ForestDataset<F = SimpleTermFactory> = IndexedDataset<F, Shared, ForestOnly>;

/// Subset-cloned interner, identifier-sequence cache
pub type IsolatedCachedDataset<F = SimpleTermFactory> = IndexedDataset<F, Isolated, IdList>;

/// Subset-cloned interner, forest-only results
pub type IsolatedForestDataset<F = SimpleTermFactory> = IndexedDataset<F, Isolated, ForestOnly>;
