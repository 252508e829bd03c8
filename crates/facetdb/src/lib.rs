//! ## Crate layout
//! - `core`: the engine — schema catalog, table routing, scoped value
//!   resolution, option dictionary, type coercion, and lookup caches.
//!
//! The `prelude` module mirrors the vocabulary used by embedding code;
//! everything else is reachable through the `core` re-export.

pub use facetdb_core as core;

pub use facetdb_core::{
    engine::Engine,
    error::Error,
    store::{MemoryStore, SchemaStore},
};

pub mod prelude {
    pub use facetdb_core::prelude::*;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
