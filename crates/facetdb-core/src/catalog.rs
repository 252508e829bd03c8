//! Schema catalog: the cached index of attribute definitions per entity
//! type, loaded from the schema store in exactly two scans.

use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    model::{AttributeDefinition, EntityTypeInfo},
    obs::{self, MetricsEvent},
    store::SchemaStore,
    types::{AttributeId, EntityTypeId, ProfileId},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
};
use thiserror::Error as ThisError;

///
/// CatalogError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("attribute '{0}' not found")]
    AttributeCodeNotFound(String),

    #[error("attribute id {0} not found")]
    AttributeNotFound(AttributeId),

    #[error("entity type {0} not found")]
    EntityTypeNotFound(EntityTypeId),
}

impl CatalogError {
    pub(crate) const fn class(&self) -> ErrorClass {
        ErrorClass::NotFound
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::classified(err.class(), ErrorOrigin::Catalog, err.to_string())
    }
}

///
/// SchemaCatalog
///
/// Process-lifetime handle over the attribute definition index. Loading an
/// entity type performs one membership join scan and one bulk attribute
/// fetch; repeat loads are no-ops until `invalidate`. Hidden attributes
/// stay resolvable by id but are excluded from profile listings unless
/// their code is on the visibility allow-list.
///

#[derive(Default)]
pub struct SchemaCatalog {
    visible_overrides: BTreeSet<String>,
    index: RefCell<CatalogIndex>,
}

#[derive(Default)]
struct CatalogIndex {
    entity_types: BTreeMap<EntityTypeId, EntityTypeInfo>,
    entity_types_loaded: bool,
    attributes: BTreeMap<(EntityTypeId, AttributeId), AttributeDefinition>,
    by_code: HashMap<(EntityTypeId, String), AttributeId>,
    profile_members: BTreeMap<ProfileId, Vec<AttributeId>>,
    loaded: BTreeSet<EntityTypeId>,
}

impl SchemaCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes listed here are included in profile listings even when the
    /// attribute itself is hidden.
    #[must_use]
    pub fn with_visible_overrides<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visible_overrides: codes.into_iter().map(Into::into).collect(),
            index: RefCell::new(CatalogIndex::default()),
        }
    }

    /// Populate the index for one entity type.
    ///
    /// Exactly two scans: the membership ⋈ profile join, then one bulk
    /// attribute fetch filtered by the discovered ids. An unknown entity
    /// type loads an empty index, not an error.
    pub fn load(&self, store: &dyn SchemaStore, entity_type: EntityTypeId) -> Result<(), Error> {
        if self.index.borrow().loaded.contains(&entity_type) {
            return Ok(());
        }

        let memberships = store.select_profile_memberships(entity_type)?;

        let mut ids: Vec<AttributeId> = Vec::new();
        let mut profile_members: BTreeMap<ProfileId, Vec<(u32, AttributeId)>> = BTreeMap::new();
        for row in &memberships {
            if !ids.contains(&row.attribute) {
                ids.push(row.attribute);
            }
            profile_members
                .entry(row.profile)
                .or_default()
                .push((row.sort_order, row.attribute));
        }

        let attributes = store.select_attributes(entity_type, &ids)?;

        let mut index = self.index.borrow_mut();
        for (profile, mut members) in profile_members {
            members.sort_unstable();
            index
                .profile_members
                .insert(profile, members.into_iter().map(|(_, id)| id).collect());
        }
        for def in attributes {
            index
                .by_code
                .insert((entity_type, def.code.to_lowercase()), def.id);
            index.attributes.insert((entity_type, def.id), def);
        }
        index.loaded.insert(entity_type);

        obs::record(MetricsEvent::CatalogLoad);
        Ok(())
    }

    /// Attribute definition by id.
    pub fn get(
        &self,
        entity_type: EntityTypeId,
        id: AttributeId,
    ) -> Result<AttributeDefinition, Error> {
        self.index
            .borrow()
            .attributes
            .get(&(entity_type, id))
            .cloned()
            .ok_or_else(|| CatalogError::AttributeNotFound(id).into())
    }

    /// Attribute definition by code, matched case-insensitively.
    pub fn get_by_code(
        &self,
        entity_type: EntityTypeId,
        code: &str,
    ) -> Result<AttributeDefinition, Error> {
        let index = self.index.borrow();
        let id = index
            .by_code
            .get(&(entity_type, code.to_lowercase()))
            .copied()
            .ok_or_else(|| Error::from(CatalogError::AttributeCodeNotFound(code.to_string())))?;

        index
            .attributes
            .get(&(entity_type, id))
            .cloned()
            .ok_or_else(|| CatalogError::AttributeNotFound(id).into())
    }

    /// Member attributes of a profile in sort order, default-visible only
    /// (hidden attributes appear when their code is on the allow-list).
    ///
    /// Unknown profiles list empty.
    #[must_use]
    pub fn list_by_profile(
        &self,
        entity_type: EntityTypeId,
        profile: ProfileId,
    ) -> Vec<AttributeDefinition> {
        let index = self.index.borrow();
        let Some(members) = index.profile_members.get(&profile) else {
            return Vec::new();
        };

        members
            .iter()
            .filter_map(|id| index.attributes.get(&(entity_type, *id)))
            .filter(|def| def.is_visible || self.visible_overrides.contains(&def.code))
            .cloned()
            .collect()
    }

    /// All member attribute ids of a profile, hidden ones included.
    #[must_use]
    pub fn profile_member_ids(&self, profile: ProfileId) -> Vec<AttributeId> {
        self.index
            .borrow()
            .profile_members
            .get(&profile)
            .cloned()
            .unwrap_or_default()
    }

    /// Entity type registry row; loads the registry on first use.
    ///
    /// Unlike attribute loads, consumers calling this require existence, so
    /// an unknown entity type is `NotFound`.
    pub fn entity_type_info(
        &self,
        store: &dyn SchemaStore,
        entity_type: EntityTypeId,
    ) -> Result<EntityTypeInfo, Error> {
        {
            let mut index = self.index.borrow_mut();
            if !index.entity_types_loaded {
                for info in store.entity_types()? {
                    index.entity_types.insert(info.id, info);
                }
                index.entity_types_loaded = true;
            }
        }

        self.index
            .borrow()
            .entity_types
            .get(&entity_type)
            .cloned()
            .ok_or_else(|| CatalogError::EntityTypeNotFound(entity_type).into())
    }

    /// Drop every cached definition; the next load re-scans the store.
    pub fn invalidate(&self) {
        *self.index.borrow_mut() = CatalogIndex::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{AttributeGroup, AttributeProfile, BackendKind, ProfileMembership},
        store::MemoryStore,
        types::GroupId,
    };

    const TYPE: EntityTypeId = EntityTypeId(4);
    const PROFILE: ProfileId = ProfileId(7);

    fn attr(id: u32, code: &str, visible: bool) -> AttributeDefinition {
        AttributeDefinition {
            id: AttributeId(id),
            code: code.to_string(),
            entity_type: TYPE,
            backend_kind: BackendKind::Varchar,
            backend_table_override: None,
            uses_option_dictionary: false,
            is_required: false,
            is_unique: false,
            is_scope_overridable: true,
            is_visible: visible,
            option_source_is_custom: false,
            has_swatch: false,
            default_value: None,
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_entity_type(EntityTypeInfo {
            id: TYPE,
            code: "product".to_string(),
            entity_table: "cat_entity".to_string(),
        });
        store.add_profile(AttributeProfile {
            id: PROFILE,
            name: "Default".to_string(),
            entity_type: TYPE,
        });
        store.add_group(AttributeGroup {
            id: GroupId(1),
            profile: PROFILE,
            is_default: true,
        });

        store.add_attribute(attr(12, "color", true));
        store.add_attribute(attr(13, "hidden_flag", false));
        for (id, order) in [(12, 1), (13, 2)] {
            store.add_membership(ProfileMembership {
                profile: PROFILE,
                group: GroupId(1),
                attribute: AttributeId(id),
                sort_order: order,
            });
        }
        store
    }

    #[test]
    fn load_issues_exactly_two_scans() {
        let store = seeded_store();
        let catalog = SchemaCatalog::new();

        store.reset_counters();
        catalog.load(&store, TYPE).unwrap();

        assert_eq!(store.select_count("profile_membership"), 1);
        assert_eq!(store.select_count("attribute"), 1);
        assert_eq!(store.total_selects(), 2);

        // repeat load is a no-op
        catalog.load(&store, TYPE).unwrap();
        assert_eq!(store.total_selects(), 2);
    }

    #[test]
    fn code_lookup_is_case_insensitive() {
        let store = seeded_store();
        let catalog = SchemaCatalog::new();
        catalog.load(&store, TYPE).unwrap();

        let def = catalog.get_by_code(TYPE, "CoLoR").unwrap();
        assert_eq!(def.id, AttributeId(12));
    }

    #[test]
    fn hidden_attributes_excluded_from_listing_but_resolvable() {
        let store = seeded_store();
        let catalog = SchemaCatalog::new();
        catalog.load(&store, TYPE).unwrap();

        let listed = catalog.list_by_profile(TYPE, PROFILE);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code, "color");

        assert!(catalog.get(TYPE, AttributeId(13)).is_ok());
    }

    #[test]
    fn allow_list_overrides_visibility() {
        let store = seeded_store();
        let catalog = SchemaCatalog::with_visible_overrides(["hidden_flag"]);
        catalog.load(&store, TYPE).unwrap();

        let listed = catalog.list_by_profile(TYPE, PROFILE);
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn unknown_entity_type_loads_empty() {
        let store = seeded_store();
        let catalog = SchemaCatalog::new();
        catalog.load(&store, EntityTypeId(99)).unwrap();

        assert!(catalog.list_by_profile(EntityTypeId(99), PROFILE).is_empty());
        assert!(catalog.get(EntityTypeId(99), AttributeId(12)).is_err());
    }

    #[test]
    fn entity_type_info_requires_existence() {
        let store = seeded_store();
        let catalog = SchemaCatalog::new();

        assert_eq!(
            catalog.entity_type_info(&store, TYPE).unwrap().entity_table,
            "cat_entity"
        );
        let err = catalog.entity_type_info(&store, EntityTypeId(99)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn invalidate_forces_reload() {
        let store = seeded_store();
        let catalog = SchemaCatalog::new();
        catalog.load(&store, TYPE).unwrap();

        catalog.invalidate();
        assert!(catalog.get(TYPE, AttributeId(12)).is_err());

        catalog.load(&store, TYPE).unwrap();
        assert!(catalog.get(TYPE, AttributeId(12)).is_ok());
    }
}
