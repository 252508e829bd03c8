//! Plain typed records for the schema-driven attribute model.
//!
//! These replace the string-keyed dynamic rows the schema store speaks in;
//! the store boundary converts raw rows into these exactly once.

pub mod attribute;
pub mod option;
pub mod profile;
pub mod resolved;
pub mod table;

pub use attribute::{AttributeDefinition, BackendKind, EntityTypeInfo};
pub use option::OptionEntry;
pub use profile::{AttributeGroup, AttributeProfile, ProfileMembership};
pub use resolved::ResolvedEntityAttributes;
pub use table::BackendTableDescriptor;
