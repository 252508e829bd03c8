//! Engine: the composition root the surrounding application talks to.
//!
//! Owns the schema store plus every process-lifetime cache handle, and
//! exposes the in-process library API. Handles are plain fields, never
//! hidden singletons, so isolated instances are cheap to construct in
//! tests.

use crate::{
    cache::{CategoryCache, CustomerCache, SkuCache},
    catalog::SchemaCatalog,
    coerce::TypeCoercer,
    error::Error,
    model::{BackendTableDescriptor, OptionEntry, ResolvedEntityAttributes},
    options::OptionDictionary,
    profile::AttributeProfileIndex,
    resolver::ScopedValueResolver,
    router::BackendTableRouter,
    store::SchemaStore,
    types::{AttributeId, EntityId, EntityTypeId, OptionId, ProfileId, ScopeId},
};

///
/// Engine
///

pub struct Engine<S: SchemaStore> {
    store: S,
    pub catalog: SchemaCatalog,
    pub router: BackendTableRouter,
    pub profiles: AttributeProfileIndex,
    pub options: OptionDictionary,
    pub coercer: TypeCoercer,
    pub sku_cache: SkuCache,
    pub category_cache: CategoryCache,
    pub customer_cache: CustomerCache,
}

impl<S: SchemaStore> Engine<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            catalog: SchemaCatalog::new(),
            router: BackendTableRouter::new(),
            profiles: AttributeProfileIndex::new(),
            options: OptionDictionary::new(),
            coercer: TypeCoercer::new(),
            sku_cache: SkuCache::new(),
            category_cache: CategoryCache::new(),
            customer_cache: CustomerCache::new(),
        }
    }

    /// Engine with a visibility allow-list for hidden attribute codes.
    #[must_use]
    pub fn with_visible_overrides<I, T>(store: S, codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            catalog: SchemaCatalog::with_visible_overrides(codes),
            ..Self::new(store)
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The effective attribute values of one entity under `scope`.
    pub fn resolve_attributes(
        &self,
        entity_type: EntityTypeId,
        entity: EntityId,
        scope: ScopeId,
        profile: ProfileId,
    ) -> Result<ResolvedEntityAttributes, Error> {
        let resolver = ScopedValueResolver::new(&self.catalog, &self.router, &self.coercer);
        resolver.resolve(&self.store, entity_type, entity, scope, profile, true)
    }

    /// The physical table holding one attribute's values.
    pub fn get_backend_table(
        &self,
        attribute: AttributeId,
        entity_type: EntityTypeId,
    ) -> Result<BackendTableDescriptor, Error> {
        self.catalog.load(&self.store, entity_type)?;
        self.router
            .resolve(&self.store, &self.catalog, attribute, entity_type)
    }

    /// Create new dictionary options; returns the ids actually created.
    pub fn create_option(
        &self,
        entity_type: EntityTypeId,
        attribute: AttributeId,
        values: &[&str],
    ) -> Result<Vec<OptionId>, Error> {
        self.catalog.load(&self.store, entity_type)?;
        self.options.create(
            &self.store,
            &self.catalog,
            entity_type,
            attribute,
            values,
            ScopeId::DEFAULT,
        )
    }

    /// Options of one attribute, in sort order.
    pub fn options_of(&self, attribute: AttributeId) -> Result<Vec<OptionEntry>, Error> {
        self.options.options_of(&self.store, attribute)
    }

    /// Human-readable label of one option under `scope`, with default-scope
    /// fallback. Opt-in; resolution hands back raw option ids.
    pub fn option_label(
        &self,
        attribute: AttributeId,
        option: OptionId,
        scope: ScopeId,
    ) -> Result<Option<String>, Error> {
        self.options.label_of(&self.store, attribute, option, scope)
    }

    /// Assign an attribute to a profile's default group (idempotent).
    pub fn assign_attribute_to_profile(
        &self,
        entity_type: EntityTypeId,
        profile: ProfileId,
        attribute: AttributeId,
    ) -> Result<(), Error> {
        self.profiles.load(&self.store, entity_type)?;
        self.profiles.assign(&self.store, profile, attribute)
    }

    /// Reset every cache so the next access re-reads the store.
    pub fn reload(&self) {
        self.catalog.invalidate();
        self.router.invalidate();
        self.profiles.invalidate();
        self.options.invalidate();
        self.coercer.invalidate();
        self.sku_cache.reset();
        self.category_cache.reset();
        self.customer_cache.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            AttributeDefinition, AttributeGroup, AttributeProfile, BackendKind, EntityTypeInfo,
            ProfileMembership,
        },
        store::MemoryStore,
        types::GroupId,
        value::Scalar,
    };

    const TYPE: EntityTypeId = EntityTypeId(4);
    const PROFILE: ProfileId = ProfileId(7);
    const COLOR: AttributeId = AttributeId(12);

    /// The scenario from the design discussions: attribute `color`
    /// (dynamic varchar, option dictionary) with default-scope option
    /// "Red"; entity 500 carries no override.
    fn engine() -> Engine<MemoryStore> {
        let store = MemoryStore::new();
        store.add_entity_type(EntityTypeInfo {
            id: TYPE,
            code: "product".to_string(),
            entity_table: "cat_entity".to_string(),
        });
        store.add_table("cat_entity", &[("entity_id", "int"), ("sku", "varchar(64)")]);
        store.add_table(
            "cat_entity_varchar",
            &[("entity_id", "int"), ("value", "varchar(255)")],
        );

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
        store.add_membership(ProfileMembership {
            profile: PROFILE,
            group: GroupId(1),
            attribute: COLOR,
            sort_order: 1,
        });
        store.add_attribute(AttributeDefinition {
            id: COLOR,
            code: "color".to_string(),
            entity_type: TYPE,
            backend_kind: BackendKind::Varchar,
            backend_table_override: None,
            uses_option_dictionary: true,
            is_required: false,
            is_unique: false,
            is_scope_overridable: true,
            is_visible: true,
            option_source_is_custom: false,
            has_swatch: false,
            default_value: None,
        });

        Engine::new(store)
    }

    #[test]
    fn resolution_hands_back_raw_option_id_and_label_is_opt_in() {
        let engine = engine();
        let created = engine.create_option(TYPE, COLOR, &["Red"]).unwrap();
        let option_id = created[0];

        engine.store().set_value(
            "cat_entity_varchar",
            EntityId(500),
            COLOR,
            ScopeId::DEFAULT,
            &option_id.to_string(),
        );

        let resolved = engine
            .resolve_attributes(TYPE, EntityId(500), ScopeId(1), PROFILE)
            .unwrap();
        assert_eq!(
            resolved.get("color"),
            Some(&Scalar::Text(option_id.to_string()))
        );

        // scope 1 has no label row; falls back to the default scope
        let label = engine.option_label(COLOR, option_id, ScopeId(1)).unwrap();
        assert_eq!(label.as_deref(), Some("Red"));
    }

    #[test]
    fn backend_table_through_engine() {
        let engine = engine();
        let descriptor = engine.get_backend_table(COLOR, TYPE).unwrap();
        assert_eq!(descriptor.table_name, "cat_entity_varchar");
    }

    #[test]
    fn assignment_through_engine_is_idempotent() {
        let engine = engine();
        engine
            .assign_attribute_to_profile(TYPE, PROFILE, AttributeId(20))
            .unwrap();
        engine
            .assign_attribute_to_profile(TYPE, PROFILE, AttributeId(20))
            .unwrap();

        assert_eq!(
            engine.profiles.members_of(PROFILE),
            vec![COLOR, AttributeId(20)]
        );
    }

    #[test]
    fn reload_resets_every_cache() {
        let engine = engine();
        engine
            .resolve_attributes(TYPE, EntityId(500), ScopeId::DEFAULT, PROFILE)
            .unwrap();

        engine.reload();

        engine.store().reset_counters();
        engine
            .resolve_attributes(TYPE, EntityId(500), ScopeId::DEFAULT, PROFILE)
            .unwrap();
        // catalog re-scans after invalidation
        assert_eq!(engine.store().select_count("profile_membership"), 1);
        assert_eq!(engine.store().select_count("attribute"), 1);
    }
}
