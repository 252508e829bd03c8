//! Scoped value resolution: the central read path.
//!
//! One query against the shared entity table for the static side, one
//! query per distinct dynamic backend table for the rest — never one per
//! attribute. Scope fallback is evaluated by the store's coalesce, so a
//! narrower scope costs no extra round trips.

use crate::{
    catalog::SchemaCatalog,
    coerce::TypeCoercer,
    error::Error,
    model::{AttributeDefinition, BackendTableDescriptor, ResolvedEntityAttributes},
    obs::{self, MetricsEvent},
    router::BackendTableRouter,
    store::{SchemaStore, ScopedValueQuery},
    types::{AttributeId, EntityId, EntityTypeId, ProfileId, ScopeId},
};
use std::collections::BTreeMap;

///
/// ScopedValueResolver
///
/// Borrowed composition of the schema caches. Holds no state of its own;
/// every call reflects the catalog snapshot loaded at process start unless
/// the caller reloads explicitly.
///

pub struct ScopedValueResolver<'a> {
    catalog: &'a SchemaCatalog,
    router: &'a BackendTableRouter,
    coercer: &'a TypeCoercer,
}

struct DynamicGroup {
    table: BackendTableDescriptor,
    attributes: Vec<AttributeDefinition>,
}

impl<'a> ScopedValueResolver<'a> {
    #[must_use]
    pub const fn new(
        catalog: &'a SchemaCatalog,
        router: &'a BackendTableRouter,
        coercer: &'a TypeCoercer,
    ) -> Self {
        Self {
            catalog,
            router,
            coercer,
        }
    }

    /// Effective values of every member attribute of `profile` for one
    /// entity under `scope`.
    ///
    /// Attributes with no row on either scope side are omitted; default
    /// values are not substituted at this layer. Option-dictionary
    /// attributes resolve to their raw option id; label translation is the
    /// caller's opt-in step.
    pub fn resolve(
        &self,
        store: &dyn SchemaStore,
        entity_type: EntityTypeId,
        entity: EntityId,
        scope: ScopeId,
        profile: ProfileId,
        include_static: bool,
    ) -> Result<ResolvedEntityAttributes, Error> {
        obs::record(MetricsEvent::ResolveStart);
        self.catalog.load(store, entity_type)?;

        let mut statics: Vec<AttributeDefinition> = Vec::new();
        let mut dynamic_groups: BTreeMap<String, DynamicGroup> = BTreeMap::new();

        for id in self.catalog.profile_member_ids(profile) {
            let Ok(def) = self.catalog.get(entity_type, id) else {
                // membership rows can outlive attribute definitions
                continue;
            };

            if def.backend_kind.is_static() {
                statics.push(def);
                continue;
            }

            let table = self.router.resolve(store, self.catalog, id, entity_type)?;
            dynamic_groups
                .entry(table.table_name.clone())
                .or_insert_with(|| DynamicGroup {
                    table,
                    attributes: Vec::new(),
                })
                .attributes
                .push(def);
        }

        let mut result = ResolvedEntityAttributes::empty(entity, scope);

        if include_static && !statics.is_empty() {
            self.resolve_static(store, entity_type, entity, &statics, &mut result)?;
        }

        for group in dynamic_groups.into_values() {
            self.resolve_dynamic(store, entity, scope, &group, &mut result)?;
        }

        Ok(result)
    }

    /// One query for all static attribute columns of the entity row.
    fn resolve_static(
        &self,
        store: &dyn SchemaStore,
        entity_type: EntityTypeId,
        entity: EntityId,
        statics: &[AttributeDefinition],
        result: &mut ResolvedEntityAttributes,
    ) -> Result<(), Error> {
        let info = self.catalog.entity_type_info(store, entity_type)?;
        let columns: Vec<String> = statics.iter().map(|def| def.code.clone()).collect();

        obs::record(MetricsEvent::StaticQuery);
        let Some(raw) = store.select_entity_row(&info.entity_table, entity, &columns)? else {
            return Ok(());
        };

        let typed = self.coercer.coerce(store, &info.entity_table, &raw)?;
        result.values.extend(typed);
        Ok(())
    }

    /// One coalescing query per dynamic backend table.
    fn resolve_dynamic(
        &self,
        store: &dyn SchemaStore,
        entity: EntityId,
        scope: ScopeId,
        group: &DynamicGroup,
        result: &mut ResolvedEntityAttributes,
    ) -> Result<(), Error> {
        let ids: Vec<AttributeId> = group.attributes.iter().map(|def| def.id).collect();
        let by_id: BTreeMap<AttributeId, &AttributeDefinition> =
            group.attributes.iter().map(|def| (def.id, def)).collect();

        let query = ScopedValueQuery {
            table: group.table.clone(),
            entity,
            attributes: ids,
            scope,
        };

        obs::record(MetricsEvent::DynamicTableQuery);
        let rows = store.select_scoped_values(&query)?;

        let family =
            self.coercer
                .family_of(store, &group.table.table_name, &group.table.value_column)?;

        for row in rows {
            if let Some(def) = by_id.get(&row.attribute) {
                result
                    .values
                    .insert(def.code.clone(), family.cast_raw(&row.raw));
            }
        }

        Ok(())
    }
}
