use serde::{Deserialize, Serialize};

///
/// BackendTableDescriptor
///
/// The physical table serving one `(backend_kind, entity_type)` pair, with
/// the column names the value queries need. Resolved once by the router and
/// cached; many attributes of one entity type share a descriptor.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BackendTableDescriptor {
    pub table_name: String,
    pub key_column: String,
    pub value_column: String,

    /// Side tables carry a scope column and support per-scope overrides;
    /// the shared entity table does not.
    pub is_scope_partitioned: bool,
}

impl BackendTableDescriptor {
    /// Descriptor for the shared entity table of an entity type.
    #[must_use]
    pub fn shared(entity_table: &str) -> Self {
        Self {
            table_name: entity_table.to_string(),
            key_column: "entity_id".to_string(),
            value_column: "value".to_string(),
            is_scope_partitioned: false,
        }
    }

    /// Descriptor for a type-partitioned value side table.
    #[must_use]
    pub fn partitioned(table_name: String) -> Self {
        Self {
            table_name,
            key_column: "entity_id".to_string(),
            value_column: "value".to_string(),
            is_scope_partitioned: true,
        }
    }
}
