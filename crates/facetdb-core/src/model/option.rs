use crate::types::{AttributeId, OptionId, ScopeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// OptionEntry
///
/// One entry of an attribute's option dictionary: the discrete value id,
/// its position, and its label per scope. Scope 0 is mandatory; narrower
/// scopes are optional overlays.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OptionEntry {
    pub option_id: OptionId,
    pub attribute_id: AttributeId,
    pub sort_order: u32,
    pub labels_by_scope: BTreeMap<ScopeId, String>,
}

impl OptionEntry {
    /// Label for `scope`, falling back to the default scope when no
    /// narrower override exists.
    #[must_use]
    pub fn label(&self, scope: ScopeId) -> Option<&str> {
        self.labels_by_scope
            .get(&scope)
            .or_else(|| self.labels_by_scope.get(&ScopeId::DEFAULT))
            .map(String::as_str)
    }

    /// The mandatory default-scope label.
    #[must_use]
    pub fn default_label(&self) -> Option<&str> {
        self.labels_by_scope
            .get(&ScopeId::DEFAULT)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> OptionEntry {
        let mut labels = BTreeMap::new();
        labels.insert(ScopeId::DEFAULT, "Red".to_string());
        labels.insert(ScopeId(2), "Rouge".to_string());

        OptionEntry {
            option_id: OptionId(1),
            attribute_id: AttributeId(12),
            sort_order: 1,
            labels_by_scope: labels,
        }
    }

    #[test]
    fn label_prefers_requested_scope() {
        assert_eq!(entry().label(ScopeId(2)), Some("Rouge"));
    }

    #[test]
    fn label_falls_back_to_default_scope() {
        assert_eq!(entry().label(ScopeId(1)), Some("Red"));
    }
}
