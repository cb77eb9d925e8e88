use bazaar::cache::CacheKey;
use bazaar::domain::response::{DeleteResponse, PutResponse};
use bazaar::ports::CacheStore;
use bytes::Bytes;
use moka::sync::Cache;
use shared::Result;
use std::collections::HashSet;

/// Moka-backed store with an optional entry bound.
///
/// No TTL is configured: entries leave only through invalidation, `clear`, or
/// capacity eviction, and an evicted entry simply reads as a miss. Each key
/// in a batch delete is removed atomically on its own.
pub struct MokaCacheStore {
    cache: Cache<CacheKey, Bytes>,
}

impl MokaCacheStore {
    pub fn new(max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name("response-cache");

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }
}

impl CacheStore for MokaCacheStore {
    fn exists(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.cache.contains_key(key))
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        Ok(self.cache.get(key))
    }

    fn put(&self, key: CacheKey, value: Bytes) -> Result<PutResponse> {
        let replaced = self.cache.contains_key(&key);
        self.cache.insert(key, value);
        Ok(PutResponse::new(replaced))
    }

    fn delete(&self, keys: &HashSet<CacheKey>) -> Result<DeleteResponse> {
        let deleted = keys
            .iter()
            .filter(|key| self.cache.remove(*key).is_some())
            .count();
        Ok(DeleteResponse::new(deleted))
    }

    fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }

    fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
        Ok(())
    }
}

impl std::fmt::Debug for MokaCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheStore")
            .field("entry_count", &self.cache.entry_count())
            .field("max_capacity", &self.cache.policy().max_capacity())
            .finish()
    }
}
