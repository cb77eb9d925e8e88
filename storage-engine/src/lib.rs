pub mod memory_store;
pub mod moka_store;

pub use memory_store::MemoryCacheStore;
pub use moka_store::MokaCacheStore;

use bazaar::ports::CacheStore;
use shared::config::CacheBackend;
use std::sync::Arc;
use tracing::info;

/// Build the response cache store selected by configuration
pub fn build_store(backend: &CacheBackend) -> Arc<dyn CacheStore> {
    match backend {
        CacheBackend::Memory => {
            info!("Response cache: unbounded in-memory store");
            Arc::new(MemoryCacheStore::new())
        }
        CacheBackend::Moka { max_entries } => {
            match max_entries {
                Some(max) => info!("Response cache: moka, bounded to {} entries", max),
                None => info!("Response cache: moka, unbounded"),
            }
            Arc::new(MokaCacheStore::new(*max_entries))
        }
    }
}
