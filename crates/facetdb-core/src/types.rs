//! Id newtypes shared across the engine.
//!
//! Every identifier the schema store hands back is wrapped so that an
//! attribute id can never be passed where a profile id is expected.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident, $repr:ty) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, Default, Deserialize, Display, Eq, From, Hash, Ord,
            PartialEq, PartialOrd, Serialize,
        )]
        pub struct $name(pub $repr);

        impl $name {
            #[must_use]
            pub const fn get(self) -> $repr {
                self.0
            }
        }
    };
}

id_newtype!(
    /// Identifier of an entity type (a class of schema-driven business object).
    EntityTypeId,
    u32
);

id_newtype!(
    /// Identifier of a registered attribute within its entity type.
    AttributeId,
    u32
);

id_newtype!(
    /// Identifier of an attribute profile ("attribute set").
    ProfileId,
    u32
);

id_newtype!(
    /// Identifier of an attribute group within a profile.
    GroupId,
    u32
);

id_newtype!(
    /// Identifier of one option dictionary entry.
    OptionId,
    u32
);

id_newtype!(
    /// Identifier of a concrete entity record.
    EntityId,
    u64
);

///
/// ScopeId
///
/// Narrowing context under which attribute values may be overridden.
/// Scope 0 is the mandatory global default; every other scope overlays it.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const DEFAULT: Self = Self(0);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}
