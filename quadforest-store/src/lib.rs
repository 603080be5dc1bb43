//! # Quadforest Store
//!
//! The stream-shaped boundary over [`quadforest_core`]: a [`QuadStore`]
//! whose `match` returns a quad stream and whose bulk operations consume
//! streams, plus the [`import_stream`] convenience that builds a store by
//! draining one.
//!
//! The core stays runtime-agnostic: `futures` only, async at the stream
//! seam, synchronous once identifiers are in hand.

pub mod store;

pub use store::{import_stream, GraphTarget, QuadStore};
