use bazaar::cache::CacheKey;
use bazaar::domain::response::{DeleteResponse, PutResponse};
use bazaar::ports::CacheStore;
use bytes::Bytes;
use parking_lot::RwLock;
use shared::Result;
use std::collections::{HashMap, HashSet};

/// Unbounded map guarded by one lock.
///
/// Entries live until deleted or cleared. A batch delete runs under a single
/// write lock, so readers see either none or all of it.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<CacheKey, Bytes>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn exists(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: CacheKey, value: Bytes) -> Result<PutResponse> {
        let replaced = self.entries.write().insert(key, value).is_some();
        Ok(PutResponse::new(replaced))
    }

    fn delete(&self, keys: &HashSet<CacheKey>) -> Result<DeleteResponse> {
        let mut entries = self.entries.write();
        let deleted = keys.iter().filter(|key| entries.remove(*key).is_some()).count();
        Ok(DeleteResponse::new(deleted))
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("entries", &self.len())
            .finish()
    }
}
