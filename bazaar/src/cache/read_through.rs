use super::fence::WriteFence;
use super::keys::View;
use crate::ports::CacheStore;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-through access to cached views.
///
/// Concurrent misses on the same key may each fetch and populate; there is
/// no single-flight de-duplication. Only values from successful fetches are
/// ever stored.
#[derive(Clone)]
pub struct ReadThroughAccessor {
    store: Arc<dyn CacheStore>,
    fence: Arc<WriteFence>,
}

impl ReadThroughAccessor {
    pub fn new(store: Arc<dyn CacheStore>, fence: Arc<WriteFence>) -> Self {
        Self { store, fence }
    }

    /// Return the cached value for `view`, or fetch, cache, and return it.
    ///
    /// A fetch error is returned unchanged and leaves the store untouched.
    /// Cache-side problems (unreadable store, undecodable entry, failed
    /// encode or put) are logged and never fail the read.
    pub async fn get<T, F, Fut, E>(&self, view: &View<T>, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = view.key();

        match self.store.get(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    debug!("Cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => warn!("Discarding undecodable cache entry {}: {}", key, e),
            },
            Ok(None) => debug!("Cache miss: {}", key),
            Err(e) => warn!("Cache read for {} failed, fetching directly: {}", key, e),
        }

        let observed = self.fence.generation();
        let value = fetch().await?;

        let encoded = match serde_json::to_vec(&value) {
            Ok(encoded) => Bytes::from(encoded),
            Err(e) => {
                warn!("Skipping cache populate for {}: serialization failed: {}", key, e);
                return Ok(value);
            }
        };

        match self
            .fence
            .populate_if_current(observed, || self.store.put(key.clone(), encoded))
        {
            Some(Ok(_)) => debug!("Cache populated: {}", key),
            Some(Err(e)) => warn!("Cache populate for {} failed: {}", key, e),
            None => debug!("Skipping cache populate for {}: invalidated during fetch", key),
        }

        Ok(value)
    }
}

impl std::fmt::Debug for ReadThroughAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughAccessor")
            .field("entries", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::descriptor::ChangeDescriptor;
    use crate::cache::invalidation::InvalidationPolicy;
    use crate::cache::keys::{CacheKey, views};
    use crate::cache::testing::TestStore;
    use serde::{Deserialize, Serializer};
    use shared::Error;

    fn accessor() -> (Arc<TestStore>, Arc<WriteFence>, ReadThroughAccessor) {
        let store = Arc::new(TestStore::default());
        let fence = Arc::new(WriteFence::new());
        let accessor = ReadThroughAccessor::new(store.clone(), fence.clone());
        (store, fence, accessor)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_once() {
        let (store, _, accessor) = accessor();
        let view = views::categories();

        let value = accessor
            .get(&view, || async { Ok::<_, Error>(vec!["books".to_string()]) })
            .await
            .unwrap();

        assert_eq!(value, vec!["books".to_string()]);
        assert_eq!(store.put_calls(), 1);
        assert_eq!(
            store.get(&view.key()).unwrap().unwrap(),
            Bytes::from_static(b"[\"books\"]")
        );
    }

    #[tokio::test]
    async fn test_hit_skips_the_fetch() {
        let (store, _, accessor) = accessor();
        let view = views::categories();
        store
            .put(view.key(), Bytes::from_static(b"[\"cached\"]"))
            .unwrap();

        let value = accessor
            .get(&view, || async {
                Err::<Vec<String>, _>(Error::Internal("fetch must not run".into()))
            })
            .await
            .unwrap();

        assert_eq!(value, vec!["cached".to_string()]);
        assert_eq!(store.put_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_propagates_and_leaves_no_entry() {
        let (store, _, accessor) = accessor();
        let view = views::product("missing");

        let result = accessor
            .get(&view, || async { Err(Error::not_found("product")) })
            .await;

        assert!(matches!(result, Err(Error::NotFound(what)) if what == "product"));
        assert!(!store.exists(&view.key()).unwrap());
        assert_eq!(store.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_refetched_and_replaced() {
        let (store, _, accessor) = accessor();
        let view = views::categories();
        store
            .put(view.key(), Bytes::from_static(b"{not json"))
            .unwrap();

        let value = accessor
            .get(&view, || async { Ok::<_, Error>(vec!["toys".to_string()]) })
            .await
            .unwrap();

        assert_eq!(value, vec!["toys".to_string()]);
        assert_eq!(
            store.get(&view.key()).unwrap().unwrap(),
            Bytes::from_static(b"[\"toys\"]")
        );
    }

    #[tokio::test]
    async fn test_unreadable_store_falls_back_to_fetch() {
        let (store, _, accessor) = accessor();
        store.fail_reads(true);

        let value = accessor
            .get(&views::categories(), || async {
                Ok::<_, Error>(vec!["garden".to_string()])
            })
            .await
            .unwrap();

        assert_eq!(value, vec!["garden".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_put_still_returns_the_value() {
        let (store, _, accessor) = accessor();
        store.fail_puts(true);

        let value = accessor
            .get(&views::categories(), || async {
                Ok::<_, Error>(vec!["music".to_string()])
            })
            .await
            .unwrap();

        assert_eq!(value, vec!["music".to_string()]);
        assert!(store.is_empty());
    }

    /// Deserializes fine but refuses to serialize.
    #[derive(Debug, PartialEq, Deserialize)]
    struct Unencodable(u32);

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[tokio::test]
    async fn test_serialization_failure_returns_value_without_caching() {
        let (store, _, accessor) = accessor();
        let view: View<Unencodable> = View::for_tests(crate::cache::CacheView::AdminProducts);

        let value = accessor
            .get(&view, || async { Ok::<_, Error>(Unencodable(5)) })
            .await
            .unwrap();

        assert_eq!(value, Unencodable(5));
        assert_eq!(store.put_calls(), 0);
        assert!(!store.exists(&view.key()).unwrap());
    }

    #[tokio::test]
    async fn test_write_during_fetch_blocks_stale_populate() {
        let (store, fence, accessor) = accessor();
        let policy = InvalidationPolicy::new(store.clone(), fence);
        let view = views::latest_products();

        let value = accessor
            .get(&view, || async {
                // A product write commits and invalidates while this fetch is in flight
                policy.invalidate(&ChangeDescriptor::products()).unwrap();
                Ok::<_, Error>(Vec::new())
            })
            .await
            .unwrap();

        assert!(value.is_empty());
        assert!(!store.exists(&CacheKey::raw("latest-products")).unwrap());
        assert_eq!(store.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_read_after_invalidation_sees_fresh_data() {
        let (store, fence, accessor) = accessor();
        let policy = InvalidationPolicy::new(store.clone(), fence);
        let view = views::categories();

        let before = accessor
            .get(&view, || async { Ok::<_, Error>(vec!["old".to_string()]) })
            .await
            .unwrap();
        assert_eq!(before, vec!["old".to_string()]);

        policy.invalidate(&ChangeDescriptor::products()).unwrap();

        let after = accessor
            .get(&view, || async { Ok::<_, Error>(vec!["new".to_string()]) })
            .await
            .unwrap();
        assert_eq!(after, vec!["new".to_string()]);
    }
}
