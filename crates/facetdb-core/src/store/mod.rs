//! Boundary to the relational schema store.
//!
//! The engine consumes the store, it never owns it: reads are shaped as one
//! round trip per method call, and the only writes are profile-membership
//! inserts and the transactional option-creation sequence. Row values cross
//! the boundary as text; typed conversion happens exactly once, in
//! `coerce`.

pub mod memory;

pub use memory::MemoryStore;

use crate::{
    error::Error,
    model::{
        AttributeDefinition, AttributeGroup, BackendTableDescriptor, EntityTypeInfo,
        ProfileMembership,
    },
    types::{AttributeId, EntityId, EntityTypeId, GroupId, OptionId, ProfileId, ScopeId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw row as the driver hands it back: column name to textual value.
pub type RawRow = BTreeMap<String, String>;

///
/// MembershipJoinRow
///
/// One row of the profile-membership ⋈ profile ⋈ group join scan. Carries
/// everything the catalog and profile index need so loading stays at one
/// scan for the whole membership side.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MembershipJoinRow {
    pub profile: ProfileId,
    pub profile_name: String,
    pub entity_type: EntityTypeId,
    pub group: GroupId,
    pub group_is_default: bool,
    pub attribute: AttributeId,
    pub sort_order: u32,
}

///
/// OptionRow
///
/// One option dictionary row joined with its per-scope labels.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OptionRow {
    pub option_id: OptionId,
    pub attribute_id: AttributeId,
    pub sort_order: u32,
    pub labels_by_scope: BTreeMap<ScopeId, String>,
}

///
/// ColumnMeta
///
/// Declared storage type of one column, as reported by the store's
/// describe facility. `column_type` is the raw declared type string
/// (`"int"`, `"decimal(12,4)"`, `"varchar(255)"`, …).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    pub column_type: String,
}

///
/// ScopedValueQuery
///
/// One value query against one backend side table: all requested
/// attributes for one entity in a single round trip. When `scope` is not
/// the default, the store joins an override side and coalesces it over the
/// default side (value and attribute-id columns both), so the result
/// already carries the effective value per attribute.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScopedValueQuery {
    pub table: BackendTableDescriptor,
    pub entity: EntityId,
    pub attributes: Vec<AttributeId>,
    pub scope: ScopeId,
}

///
/// ValueRow
///
/// One coalesced value row: the attribute it belongs to and the raw
/// textual value. Attributes with no row on either side are simply absent.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValueRow {
    pub attribute: AttributeId,
    pub raw: String,
}

///
/// KeyedLookup
///
/// Point lookups by natural identifier backing the keyed caches.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum KeyedLookup {
    Sku(String),
    Category(EntityId),
    CustomerEmail(String),
}

///
/// SchemaStore
///
/// The consumed relational store. Implementations map each method to one
/// query; the engine's no-N+1 guarantees are stated in terms of these
/// calls.
///

pub trait SchemaStore {
    // schema catalog scans
    fn entity_types(&self) -> Result<Vec<EntityTypeInfo>, Error>;
    fn select_profile_memberships(
        &self,
        entity_type: EntityTypeId,
    ) -> Result<Vec<MembershipJoinRow>, Error>;
    fn select_attributes(
        &self,
        entity_type: EntityTypeId,
        ids: &[AttributeId],
    ) -> Result<Vec<AttributeDefinition>, Error>;

    // profile membership
    fn select_groups(&self, profile: ProfileId) -> Result<Vec<AttributeGroup>, Error>;
    fn insert_membership(&self, row: ProfileMembership) -> Result<(), Error>;

    // option dictionary
    fn select_options(&self, attribute: AttributeId) -> Result<Vec<OptionRow>, Error>;
    fn begin_option_txn(&self) -> Result<Box<dyn OptionTxn + '_>, Error>;

    // live schema inspection
    fn table_exists(&self, table: &str) -> Result<bool, Error>;
    fn describe(&self, table: &str) -> Result<Vec<ColumnMeta>, Error>;

    // value reads
    fn select_entity_row(
        &self,
        table: &str,
        entity: EntityId,
        columns: &[String],
    ) -> Result<Option<RawRow>, Error>;
    fn select_scoped_values(&self, query: &ScopedValueQuery) -> Result<Vec<ValueRow>, Error>;

    // keyed point lookups
    fn fetch_keyed_row(&self, lookup: &KeyedLookup) -> Result<Option<RawRow>, Error>;
}

///
/// OptionTxn
///
/// Scoped transaction for the multi-statement option-creation sequence.
/// Writes are visible only after `commit`; dropping an uncommitted
/// transaction rolls every staged statement back. This is the one resource
/// in the engine requiring guaranteed release on every exit path.
///

pub trait OptionTxn {
    /// Insert the option row, allocating its id.
    fn insert_option(
        &mut self,
        attribute: AttributeId,
        sort_order: u32,
    ) -> Result<OptionId, Error>;

    /// Insert one label row for the option.
    fn insert_label(&mut self, option: OptionId, scope: ScopeId, label: &str)
    -> Result<(), Error>;

    /// Insert the companion swatch row for swatch attributes.
    fn insert_swatch(&mut self, option: OptionId, scope: ScopeId, value: &str)
    -> Result<(), Error>;

    /// Commit every staged statement.
    fn commit(self: Box<Self>) -> Result<(), Error>;
}
