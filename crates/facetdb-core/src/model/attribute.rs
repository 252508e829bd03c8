use crate::{
    types::{AttributeId, EntityTypeId},
    value::Scalar,
};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// BackendKind
///
/// Where an attribute's values physically live: a column on the shared
/// entity table (`Static`), or one of the type-partitioned side tables.
/// The mapping is decided once at registration and never per value access.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Static,
    Int,
    Decimal,
    Text,
    Datetime,
    Varchar,
}

impl BackendKind {
    #[must_use]
    pub const fn is_static(self) -> bool {
        matches!(self, Self::Static)
    }

    /// Table-name suffix for dynamic kinds; `None` for static attributes,
    /// which have no side table.
    #[must_use]
    pub const fn table_suffix(self) -> Option<&'static str> {
        match self {
            Self::Static => None,
            Self::Int => Some("int"),
            Self::Decimal => Some("decimal"),
            Self::Text => Some("text"),
            Self::Datetime => Some("datetime"),
            Self::Varchar => Some("varchar"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Static => "static",
            Self::Int => "int",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Datetime => "datetime",
            Self::Varchar => "varchar",
        };
        write!(f, "{label}")
    }
}

///
/// AttributeDefinition
///
/// One registered attribute of an entity type. Loaded once per process from
/// the schema store and treated as immutable until an explicit catalog
/// reload.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AttributeDefinition {
    pub id: AttributeId,
    pub code: String,
    pub entity_type: EntityTypeId,
    pub backend_kind: BackendKind,

    /// Explicit physical table, bypassing suffix derivation when set.
    pub backend_table_override: Option<String>,

    pub uses_option_dictionary: bool,
    pub is_required: bool,
    pub is_unique: bool,
    pub is_scope_overridable: bool,

    /// Hidden attributes are excluded from profile listings but stay
    /// resolvable by id.
    pub is_visible: bool,

    /// Option values come from a caller-supplied source model rather than
    /// the dictionary tables; such attributes reject dynamic creation and
    /// preserve label case during normalization.
    pub option_source_is_custom: bool,

    /// Swatch attributes get a companion swatch row per created option.
    pub has_swatch: bool,

    pub default_value: Option<Scalar>,
}

impl AttributeDefinition {
    /// Whether dynamic option creation may target this attribute.
    #[must_use]
    pub const fn accepts_created_options(&self) -> bool {
        self.uses_option_dictionary && !self.option_source_is_custom
    }
}

///
/// EntityTypeInfo
///
/// Registry row for one entity type: the shared entity table that holds its
/// static attribute columns and anchors side-table name derivation.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityTypeInfo {
    pub id: EntityTypeId,
    pub code: String,
    pub entity_table: String,
}
