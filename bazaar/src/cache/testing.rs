use super::keys::CacheKey;
use crate::domain::response::{DeleteResponse, PutResponse};
use crate::ports::CacheStore;
use bytes::Bytes;
use parking_lot::Mutex;
use shared::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Instrumented store for exercising the cache core: counts calls and can
/// be told to fail.
#[derive(Default)]
pub(crate) struct TestStore {
    entries: Mutex<HashMap<CacheKey, Bytes>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl TestStore {
    pub(crate) fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn keys(&self) -> HashSet<String> {
        self.entries
            .lock()
            .keys()
            .map(|k| k.as_str().to_string())
            .collect()
    }
}

impl CacheStore for TestStore {
    fn exists(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.entries.lock().contains_key(key))
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Cache("reads disabled".into()));
        }
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: CacheKey, value: Bytes) -> Result<PutResponse> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::Cache("writes disabled".into()));
        }
        let replaced = self.entries.lock().insert(key, value).is_some();
        Ok(PutResponse::new(replaced))
    }

    fn delete(&self, keys: &HashSet<CacheKey>) -> Result<DeleteResponse> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Cache("deletes disabled".into()));
        }
        let mut entries = self.entries.lock();
        let deleted = keys.iter().filter(|k| entries.remove(*k).is_some()).count();
        Ok(DeleteResponse::new(deleted))
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}
