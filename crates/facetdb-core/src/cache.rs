//! Keyed lookup caches: per-run memoization of point queries by natural
//! identifier. Never invalidated within a run; callers that mutate the
//! underlying data must `reset` before re-reading.

use crate::{
    error::Error,
    obs::{self, MetricsEvent},
    store::{KeyedLookup, RawRow, SchemaStore},
    types::EntityId,
};
use derive_more::Deref;
use std::{cell::RefCell, collections::BTreeMap};

///
/// KeyedCache
///
/// Lazy memo over a fallible point lookup. Negative results are cached too,
/// so an absent key costs one query per run, not one per call.
///

pub struct KeyedCache<K, V> {
    map: RefCell<BTreeMap<K, Option<V>>>,
}

impl<K: Ord + Clone, V: Clone> KeyedCache<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: RefCell::new(BTreeMap::new()),
        }
    }

    /// Cached value for `key`, invoking `load` on first miss.
    pub fn get_or_load(
        &self,
        key: &K,
        load: impl FnOnce() -> Result<Option<V>, Error>,
    ) -> Result<Option<V>, Error> {
        if let Some(cached) = self.map.borrow().get(key) {
            obs::record(MetricsEvent::CacheHit);
            return Ok(cached.clone());
        }

        obs::record(MetricsEvent::CacheMiss);
        let loaded = load()?;
        self.map.borrow_mut().insert(key.clone(), loaded.clone());
        Ok(loaded)
    }

    /// Drop every memoized entry.
    pub fn reset(&self) {
        self.map.borrow_mut().clear();
    }
}

impl<K: Ord + Clone, V: Clone> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// SkuCache
///

#[derive(Default, Deref)]
pub struct SkuCache(KeyedCache<String, RawRow>);

impl SkuCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, store: &dyn SchemaStore, sku: &str) -> Result<Option<RawRow>, Error> {
        self.0.get_or_load(&sku.to_string(), || {
            store.fetch_keyed_row(&KeyedLookup::Sku(sku.to_string()))
        })
    }
}

///
/// CategoryCache
///

#[derive(Default, Deref)]
pub struct CategoryCache(KeyedCache<EntityId, RawRow>);

impl CategoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, store: &dyn SchemaStore, id: EntityId) -> Result<Option<RawRow>, Error> {
        self.0
            .get_or_load(&id, || store.fetch_keyed_row(&KeyedLookup::Category(id)))
    }
}

///
/// CustomerCache
///

#[derive(Default, Deref)]
pub struct CustomerCache(KeyedCache<String, RawRow>);

impl CustomerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, store: &dyn SchemaStore, email: &str) -> Result<Option<RawRow>, Error> {
        self.0.get_or_load(&email.to_string(), || {
            store.fetch_keyed_row(&KeyedLookup::CustomerEmail(email.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn sku_lookup_is_memoized() {
        let store = MemoryStore::new();
        store.add_keyed_row(
            KeyedLookup::Sku("ABC-1".to_string()),
            &[("entity_id", "500")],
        );

        let cache = SkuCache::new();
        let row = cache.get(&store, "ABC-1").unwrap().unwrap();
        assert_eq!(row["entity_id"], "500");

        store.reset_counters();
        cache.get(&store, "ABC-1").unwrap();
        assert_eq!(store.select_count("keyed_lookup"), 0);
    }

    #[test]
    fn absent_key_is_queried_once_per_run() {
        let store = MemoryStore::new();
        let cache = CategoryCache::new();

        assert!(cache.get(&store, EntityId(3)).unwrap().is_none());
        store.reset_counters();
        assert!(cache.get(&store, EntityId(3)).unwrap().is_none());
        assert_eq!(store.select_count("keyed_lookup"), 0);
    }

    #[test]
    fn reset_forces_reload() {
        let store = MemoryStore::new();
        store.add_keyed_row(
            KeyedLookup::CustomerEmail("a@b.c".to_string()),
            &[("email", "a@b.c")],
        );

        let cache = CustomerCache::new();
        cache.get(&store, "a@b.c").unwrap();

        cache.reset();
        store.reset_counters();
        cache.get(&store, "a@b.c").unwrap();
        assert_eq!(store.select_count("keyed_lookup"), 1);
    }
}
