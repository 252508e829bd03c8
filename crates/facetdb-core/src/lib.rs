//! Core runtime for facetdb: the schema catalog, backend table routing,
//! scoped value resolution, the option dictionary, type coercion, and the
//! keyed lookup caches — with the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod cache;
pub mod catalog;
pub mod coerce;
pub mod engine;
pub mod error;
pub mod model;
pub mod obs;
pub mod options;
pub mod profile;
pub mod resolver;
pub mod router;
pub mod store;
pub mod types;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No stores, caches, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        error::Error,
        model::{
            AttributeDefinition, AttributeProfile, BackendKind, BackendTableDescriptor,
            OptionEntry, ResolvedEntityAttributes,
        },
        types::{
            AttributeId, EntityId, EntityTypeId, GroupId, OptionId, ProfileId, ScopeId,
        },
        value::Scalar,
    };
}
