//! Backend table routing: which physical table holds an attribute's values.

use crate::{
    catalog::SchemaCatalog,
    error::{Error, ErrorClass, ErrorOrigin},
    model::{BackendKind, BackendTableDescriptor},
    obs::{self, MetricsEvent},
    store::SchemaStore,
    types::{AttributeId, EntityTypeId},
};
use std::{cell::RefCell, collections::HashMap};
use thiserror::Error as ThisError;

///
/// RouterError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum RouterError {
    #[error("backend table '{0}' not found")]
    TableNotFound(String),
}

impl RouterError {
    pub(crate) const fn class(&self) -> ErrorClass {
        ErrorClass::NotFound
    }
}

impl From<RouterError> for Error {
    fn from(err: RouterError) -> Self {
        Self::classified(err.class(), ErrorOrigin::Router, err.to_string())
    }
}

///
/// BackendTableRouter
///
/// Maps `(entity_type, backend_kind)` to a table descriptor. Static
/// attributes route to the shared entity table; dynamic attributes either
/// carry an explicit table override or derive `<entity_table>_<suffix>`,
/// which must exist in the live schema. Descriptors are cached because one
/// dynamic table serves many attributes of the same entity type.
///

#[derive(Default)]
pub struct BackendTableRouter {
    cache: RefCell<HashMap<(EntityTypeId, BackendKind), BackendTableDescriptor>>,
}

impl BackendTableRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the physical table for one attribute.
    pub fn resolve(
        &self,
        store: &dyn SchemaStore,
        catalog: &SchemaCatalog,
        attribute: AttributeId,
        entity_type: EntityTypeId,
    ) -> Result<BackendTableDescriptor, Error> {
        let def = catalog.get(entity_type, attribute)?;

        // explicit overrides bypass derivation and existence probing
        if let Some(table) = &def.backend_table_override {
            return Ok(BackendTableDescriptor::partitioned(table.clone()));
        }

        if let Some(descriptor) = self
            .cache
            .borrow()
            .get(&(entity_type, def.backend_kind))
            .cloned()
        {
            return Ok(descriptor);
        }

        let descriptor = self.derive(store, catalog, def.backend_kind, entity_type)?;
        self.cache
            .borrow_mut()
            .insert((entity_type, def.backend_kind), descriptor.clone());

        Ok(descriptor)
    }

    fn derive(
        &self,
        store: &dyn SchemaStore,
        catalog: &SchemaCatalog,
        kind: BackendKind,
        entity_type: EntityTypeId,
    ) -> Result<BackendTableDescriptor, Error> {
        let info = catalog.entity_type_info(store, entity_type)?;

        let Some(suffix) = kind.table_suffix() else {
            return Ok(BackendTableDescriptor::shared(&info.entity_table));
        };

        let table_name = format!("{}_{suffix}", info.entity_table);
        obs::record(MetricsEvent::RouterProbe);
        if !store.table_exists(&table_name)? {
            return Err(RouterError::TableNotFound(table_name).into());
        }

        Ok(BackendTableDescriptor::partitioned(table_name))
    }

    /// Drop every cached descriptor.
    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }
}
