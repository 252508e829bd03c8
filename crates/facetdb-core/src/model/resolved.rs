use crate::{
    types::{EntityId, ScopeId},
    value::Scalar,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// ResolvedEntityAttributes
///
/// The externally visible result of one resolution call: the effective
/// value of every member attribute present for the entity under the
/// requested scope, keyed by attribute code. Never persisted; rebuilt per
/// request.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResolvedEntityAttributes {
    pub entity_id: EntityId,
    pub scope: ScopeId,
    pub values: BTreeMap<String, Scalar>,
}

impl ResolvedEntityAttributes {
    #[must_use]
    pub const fn empty(entity_id: EntityId, scope: ScopeId) -> Self {
        Self {
            entity_id,
            scope,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Scalar> {
        self.values.get(code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_codes_as_keys() {
        let mut resolved = ResolvedEntityAttributes::empty(EntityId(500), ScopeId(2));
        resolved
            .values
            .insert("sku".to_string(), Scalar::Text("ABC-1".to_string()));
        resolved.values.insert("size".to_string(), Scalar::Int(42));

        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["entity_id"], 500);
        assert_eq!(json["scope"], 2);
        assert_eq!(json["values"]["sku"]["text"], "ABC-1");
        assert_eq!(json["values"]["size"]["int"], 42);
    }
}
