//! In-memory `SchemaStore` used by tests and embedding callers that seed
//! their schema programmatically.
//!
//! Every select is counted per table so tests can assert query budgets
//! (the no-N+1 guarantees) instead of inspecting SQL text.

use crate::{
    error::Error,
    model::{
        AttributeDefinition, AttributeGroup, AttributeProfile, EntityTypeInfo, ProfileMembership,
    },
    store::{
        ColumnMeta, KeyedLookup, MembershipJoinRow, OptionRow, OptionTxn, RawRow, SchemaStore,
        ScopedValueQuery, ValueRow,
    },
    types::{AttributeId, EntityId, EntityTypeId, OptionId, ProfileId, ScopeId},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

///
/// MemoryStore
///

#[derive(Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

#[derive(Default)]
struct Inner {
    entity_types: Vec<EntityTypeInfo>,
    attributes: BTreeMap<(EntityTypeId, AttributeId), AttributeDefinition>,
    profiles: BTreeMap<ProfileId, AttributeProfile>,
    groups: Vec<AttributeGroup>,
    memberships: Vec<ProfileMembership>,
    options: BTreeMap<AttributeId, Vec<OptionRow>>,
    swatches: BTreeMap<(OptionId, ScopeId), String>,
    next_option_id: u32,

    tables: BTreeMap<String, Vec<ColumnMeta>>,
    entity_rows: HashMap<(String, EntityId), RawRow>,
    values: BTreeMap<(String, EntityId, AttributeId, ScopeId), String>,
    keyed_rows: BTreeMap<KeyedLookup, RawRow>,

    selects: BTreeMap<String, u32>,
    fail_label_inserts: bool,
}

impl Inner {
    fn note_select(&mut self, table: &str) {
        *self.selects.entry(table.to_string()).or_insert(0) += 1;
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- fixture seeding ----

    pub fn add_entity_type(&self, info: EntityTypeInfo) {
        self.inner.borrow_mut().entity_types.push(info);
    }

    pub fn add_attribute(&self, def: AttributeDefinition) {
        self.inner
            .borrow_mut()
            .attributes
            .insert((def.entity_type, def.id), def);
    }

    pub fn add_profile(&self, profile: AttributeProfile) {
        self.inner.borrow_mut().profiles.insert(profile.id, profile);
    }

    pub fn add_group(&self, group: AttributeGroup) {
        self.inner.borrow_mut().groups.push(group);
    }

    pub fn add_membership(&self, row: ProfileMembership) {
        self.inner.borrow_mut().memberships.push(row);
    }

    /// Seed one option with its default-scope label; returns the id.
    pub fn seed_option(&self, attribute: AttributeId, sort_order: u32, label: &str) -> OptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_option_id += 1;
        let option_id = OptionId(inner.next_option_id);

        let mut labels_by_scope = BTreeMap::new();
        labels_by_scope.insert(ScopeId::DEFAULT, label.to_string());

        inner.options.entry(attribute).or_default().push(OptionRow {
            option_id,
            attribute_id: attribute,
            sort_order,
            labels_by_scope,
        });

        option_id
    }

    /// Add or replace a per-scope label on an already-seeded option.
    pub fn seed_option_label(
        &self,
        attribute: AttributeId,
        option: OptionId,
        scope: ScopeId,
        label: &str,
    ) {
        let mut inner = self.inner.borrow_mut();
        if let Some(rows) = inner.options.get_mut(&attribute) {
            if let Some(row) = rows.iter_mut().find(|r| r.option_id == option) {
                row.labels_by_scope.insert(scope, label.to_string());
            }
        }
    }

    /// Register a table and its declared column types.
    pub fn add_table(&self, name: &str, columns: &[(&str, &str)]) {
        let cols = columns
            .iter()
            .map(|(n, t)| ColumnMeta {
                name: (*n).to_string(),
                column_type: (*t).to_string(),
            })
            .collect();
        self.inner.borrow_mut().tables.insert(name.to_string(), cols);
    }

    /// Seed one static row on a shared entity table.
    pub fn add_entity_row(&self, table: &str, entity: EntityId, row: &[(&str, &str)]) {
        let raw: RawRow = row
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.inner
            .borrow_mut()
            .entity_rows
            .insert((table.to_string(), entity), raw);
    }

    /// Seed one dynamic value row on a side table.
    pub fn set_value(
        &self,
        table: &str,
        entity: EntityId,
        attribute: AttributeId,
        scope: ScopeId,
        raw: &str,
    ) {
        self.inner
            .borrow_mut()
            .values
            .insert((table.to_string(), entity, attribute, scope), raw.to_string());
    }

    pub fn add_keyed_row(&self, lookup: KeyedLookup, row: &[(&str, &str)]) {
        let raw: RawRow = row
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.inner.borrow_mut().keyed_rows.insert(lookup, raw);
    }

    /// Make every subsequent label insert fail, for rollback tests.
    pub fn fail_label_inserts(&self, fail: bool) {
        self.inner.borrow_mut().fail_label_inserts = fail;
    }

    // ---- query accounting ----

    #[must_use]
    pub fn select_count(&self, table: &str) -> u32 {
        self.inner.borrow().selects.get(table).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_selects(&self) -> u32 {
        self.inner.borrow().selects.values().sum()
    }

    pub fn reset_counters(&self) {
        self.inner.borrow_mut().selects.clear();
    }

    /// Swatch side-value persisted for an option, if any.
    #[must_use]
    pub fn swatch_of(&self, option: OptionId, scope: ScopeId) -> Option<String> {
        self.inner.borrow().swatches.get(&(option, scope)).cloned()
    }
}

impl SchemaStore for MemoryStore {
    fn entity_types(&self) -> Result<Vec<EntityTypeInfo>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("entity_type");
        Ok(inner.entity_types.clone())
    }

    fn select_profile_memberships(
        &self,
        entity_type: EntityTypeId,
    ) -> Result<Vec<MembershipJoinRow>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("profile_membership");

        let mut rows = Vec::new();
        for m in &inner.memberships {
            let Some(profile) = inner.profiles.get(&m.profile) else {
                continue;
            };
            if profile.entity_type != entity_type {
                continue;
            }
            let group_is_default = inner
                .groups
                .iter()
                .find(|g| g.id == m.group && g.profile == m.profile)
                .is_some_and(|g| g.is_default);

            rows.push(MembershipJoinRow {
                profile: m.profile,
                profile_name: profile.name.clone(),
                entity_type,
                group: m.group,
                group_is_default,
                attribute: m.attribute,
                sort_order: m.sort_order,
            });
        }

        Ok(rows)
    }

    fn select_attributes(
        &self,
        entity_type: EntityTypeId,
        ids: &[AttributeId],
    ) -> Result<Vec<AttributeDefinition>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("attribute");

        Ok(ids
            .iter()
            .filter_map(|id| inner.attributes.get(&(entity_type, *id)).cloned())
            .collect())
    }

    fn select_groups(&self, profile: ProfileId) -> Result<Vec<AttributeGroup>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("attribute_group");

        Ok(inner
            .groups
            .iter()
            .filter(|g| g.profile == profile)
            .copied()
            .collect())
    }

    fn insert_membership(&self, row: ProfileMembership) -> Result<(), Error> {
        self.inner.borrow_mut().memberships.push(row);
        Ok(())
    }

    fn select_options(&self, attribute: AttributeId) -> Result<Vec<OptionRow>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("attribute_option");

        let mut rows = inner.options.get(&attribute).cloned().unwrap_or_default();
        rows.sort_by_key(|r| (r.sort_order, r.option_id));
        Ok(rows)
    }

    fn begin_option_txn(&self) -> Result<Box<dyn OptionTxn + '_>, Error> {
        Ok(Box::new(MemoryTxn {
            store: self,
            staged: Vec::new(),
        }))
    }

    fn table_exists(&self, table: &str) -> Result<bool, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("information_schema");
        Ok(inner.tables.contains_key(table))
    }

    fn describe(&self, table: &str) -> Result<Vec<ColumnMeta>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("describe");

        inner
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| Error::store(format!("cannot describe unknown table '{table}'")))
    }

    fn select_entity_row(
        &self,
        table: &str,
        entity: EntityId,
        columns: &[String],
    ) -> Result<Option<RawRow>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select(table);

        let Some(row) = inner.entity_rows.get(&(table.to_string(), entity)) else {
            return Ok(None);
        };

        let projected: RawRow = row
            .iter()
            .filter(|(k, _)| columns.iter().any(|c| c == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Some(projected))
    }

    fn select_scoped_values(&self, query: &ScopedValueQuery) -> Result<Vec<ValueRow>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select(&query.table.table_name);

        let table = query.table.table_name.as_str();
        let mut rows = Vec::new();

        for attribute in &query.attributes {
            let default_side = inner
                .values
                .get(&(table.to_string(), query.entity, *attribute, ScopeId::DEFAULT));
            let override_side = if query.scope.is_default() {
                None
            } else {
                inner
                    .values
                    .get(&(table.to_string(), query.entity, *attribute, query.scope))
            };

            // IFNULL(override.value, default.value)
            if let Some(raw) = override_side.or(default_side) {
                rows.push(ValueRow {
                    attribute: *attribute,
                    raw: raw.clone(),
                });
            }
        }

        Ok(rows)
    }

    fn fetch_keyed_row(&self, lookup: &KeyedLookup) -> Result<Option<RawRow>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.note_select("keyed_lookup");
        Ok(inner.keyed_rows.get(lookup).cloned())
    }
}

///
/// MemoryTxn
///
/// Buffered writes applied on commit; dropping the transaction without
/// committing discards every staged statement, which is the rollback path.
///

enum Staged {
    Option {
        attribute: AttributeId,
        option: OptionId,
        sort_order: u32,
    },
    Label {
        option: OptionId,
        scope: ScopeId,
        label: String,
    },
    Swatch {
        option: OptionId,
        scope: ScopeId,
        value: String,
    },
}

struct MemoryTxn<'a> {
    store: &'a MemoryStore,
    staged: Vec<Staged>,
}

impl OptionTxn for MemoryTxn<'_> {
    fn insert_option(
        &mut self,
        attribute: AttributeId,
        sort_order: u32,
    ) -> Result<OptionId, Error> {
        // id allocation is not transactional, like a DB autoincrement
        let mut inner = self.store.inner.borrow_mut();
        inner.next_option_id += 1;
        let option = OptionId(inner.next_option_id);
        drop(inner);

        self.staged.push(Staged::Option {
            attribute,
            option,
            sort_order,
        });
        Ok(option)
    }

    fn insert_label(
        &mut self,
        option: OptionId,
        scope: ScopeId,
        label: &str,
    ) -> Result<(), Error> {
        if self.store.inner.borrow().fail_label_inserts {
            return Err(Error::store("label insert failed"));
        }

        self.staged.push(Staged::Label {
            option,
            scope,
            label: label.to_string(),
        });
        Ok(())
    }

    fn insert_swatch(
        &mut self,
        option: OptionId,
        scope: ScopeId,
        value: &str,
    ) -> Result<(), Error> {
        self.staged.push(Staged::Swatch {
            option,
            scope,
            value: value.to_string(),
        });
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), Error> {
        let mut inner = self.store.inner.borrow_mut();

        for write in self.staged {
            match write {
                Staged::Option {
                    attribute,
                    option,
                    sort_order,
                } => {
                    inner.options.entry(attribute).or_default().push(OptionRow {
                        option_id: option,
                        attribute_id: attribute,
                        sort_order,
                        labels_by_scope: BTreeMap::new(),
                    });
                }
                Staged::Label {
                    option,
                    scope,
                    label,
                } => {
                    for rows in inner.options.values_mut() {
                        if let Some(row) = rows.iter_mut().find(|r| r.option_id == option) {
                            row.labels_by_scope.insert(scope, label.clone());
                        }
                    }
                }
                Staged::Swatch {
                    option,
                    scope,
                    value,
                } => {
                    inner.swatches.insert((option, scope), value);
                }
            }
        }

        Ok(())
    }
}
