//! Option dictionary: the enumerated values attached to selection-type
//! attributes, with per-scope labels and transactional on-demand creation.

use crate::{
    catalog::SchemaCatalog,
    error::{Error, ErrorClass, ErrorOrigin},
    model::{AttributeDefinition, OptionEntry},
    obs::{self, MetricsEvent},
    store::SchemaStore,
    types::{AttributeId, EntityTypeId, OptionId, ScopeId},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
};
use thiserror::Error as ThisError;

///
/// OptionsError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum OptionsError {
    #[error("attribute '{0}' uses a custom option source; dynamic creation is not supported")]
    CustomSourceCreate(String),
}

impl OptionsError {
    pub(crate) const fn class(&self) -> ErrorClass {
        ErrorClass::Unsupported
    }
}

impl From<OptionsError> for Error {
    fn from(err: OptionsError) -> Self {
        Self::classified(err.class(), ErrorOrigin::Options, err.to_string())
    }
}

/// Comparison key for duplicate detection: trimmed, and casefolded unless
/// the attribute's source preserves case.
fn normalize(value: &str, preserve_case: bool) -> String {
    let trimmed = value.trim();
    if preserve_case {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

///
/// OptionDictionary
///
/// Per-attribute option store, memoized per process run. Creation is
/// per-value atomic: each accepted value gets its own transaction (option
/// row, default-scope label, optional swatch companion), so a failure rolls
/// back only that value's writes while previously committed values stay
/// committed. The error still aborts the remaining values of the call.
///

#[derive(Default)]
pub struct OptionDictionary {
    cache: RefCell<HashMap<AttributeId, Vec<OptionEntry>>>,
}

impl OptionDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options of an attribute in insertion (sort) order.
    pub fn options_of(
        &self,
        store: &dyn SchemaStore,
        attribute: AttributeId,
    ) -> Result<Vec<OptionEntry>, Error> {
        if let Some(entries) = self.cache.borrow().get(&attribute) {
            return Ok(entries.clone());
        }

        let mut entries: Vec<OptionEntry> = store
            .select_options(attribute)?
            .into_iter()
            .map(|row| OptionEntry {
                option_id: row.option_id,
                attribute_id: row.attribute_id,
                sort_order: row.sort_order,
                labels_by_scope: row.labels_by_scope,
            })
            .collect();
        entries.sort_by_key(|e| (e.sort_order, e.option_id));

        self.cache.borrow_mut().insert(attribute, entries.clone());
        Ok(entries)
    }

    /// Label of one option under `scope`, falling back to the default
    /// scope.
    pub fn label_of(
        &self,
        store: &dyn SchemaStore,
        attribute: AttributeId,
        option: OptionId,
        scope: ScopeId,
    ) -> Result<Option<String>, Error> {
        let entries = self.options_of(store, attribute)?;
        Ok(entries
            .iter()
            .find(|e| e.option_id == option)
            .and_then(|e| e.label(scope))
            .map(ToString::to_string))
    }

    /// Create new options for the given raw values under `scope`.
    ///
    /// Empty values are skipped; values whose normalized form matches an
    /// existing default-scope label are skipped as duplicates (not an
    /// error). Attributes without an option dictionary accept nothing and
    /// write nothing; attributes with a custom option source reject the
    /// call outright.
    pub fn create(
        &self,
        store: &dyn SchemaStore,
        catalog: &SchemaCatalog,
        entity_type: EntityTypeId,
        attribute: AttributeId,
        values: &[&str],
        scope: ScopeId,
    ) -> Result<Vec<OptionId>, Error> {
        let def = catalog.get(entity_type, attribute)?;

        if !def.uses_option_dictionary {
            return Ok(Vec::new());
        }
        if def.option_source_is_custom {
            return Err(OptionsError::CustomSourceCreate(def.code).into());
        }

        let existing = self.options_of(store, attribute)?;
        let mut seen: BTreeSet<String> = existing
            .iter()
            .filter_map(OptionEntry::default_label)
            .map(|label| normalize(label, def.option_source_is_custom))
            .collect();
        let mut next_sort = existing.iter().map(|e| e.sort_order).max().unwrap_or(0);

        let mut created = Vec::new();
        for value in values {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }

            let key = normalize(trimmed, def.option_source_is_custom);
            if seen.contains(&key) {
                obs::record(MetricsEvent::DuplicateOptionSkipped);
                continue;
            }

            next_sort += 1;
            let option_id = self.create_one(store, attribute, trimmed, scope, next_sort, &def)?;

            seen.insert(key);
            created.push(option_id);
        }

        if !created.is_empty() {
            obs::record(MetricsEvent::OptionsCreated {
                count: created.len() as u64,
            });
        }
        Ok(created)
    }

    /// One value, one transaction. A failure drops the transaction, which
    /// rolls back this value's statements, and propagates.
    fn create_one(
        &self,
        store: &dyn SchemaStore,
        attribute: AttributeId,
        value: &str,
        scope: ScopeId,
        sort_order: u32,
        def: &AttributeDefinition,
    ) -> Result<OptionId, Error> {
        let mut txn = store.begin_option_txn()?;

        let option_id = txn.insert_option(attribute, sort_order)?;

        // every option carries a default-scope label; a narrower scope adds
        // an overlay on top of it
        txn.insert_label(option_id, ScopeId::DEFAULT, value)?;
        if !scope.is_default() {
            txn.insert_label(option_id, scope, value)?;
        }
        if def.has_swatch {
            txn.insert_swatch(option_id, ScopeId::DEFAULT, value)?;
        }
        txn.commit()?;

        // keep the memo coherent without re-reading the store
        if let Some(entries) = self.cache.borrow_mut().get_mut(&attribute) {
            let mut labels_by_scope = BTreeMap::new();
            labels_by_scope.insert(ScopeId::DEFAULT, value.to_string());
            if !scope.is_default() {
                labels_by_scope.insert(scope, value.to_string());
            }
            entries.push(OptionEntry {
                option_id,
                attribute_id: attribute,
                sort_order,
                labels_by_scope,
            });
        }

        Ok(option_id)
    }

    /// Drop the memoized options.
    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }
}
