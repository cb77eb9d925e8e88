//! Response cache for catalog, order, and dashboard views.
//!
//! Reads go through [`ReadThroughAccessor`]; every committed write describes
//! itself with a [`ChangeDescriptor`] and hands it to
//! [`InvalidationPolicy::invalidate`] before reporting success.
//!
//! The cache is local to the process. Several instances each hold their own
//! copy and never invalidate one another.

mod descriptor;
mod fence;
mod invalidation;
mod keys;
mod read_through;

#[cfg(test)]
pub(crate) mod testing;

pub use descriptor::ChangeDescriptor;
pub use fence::WriteFence;
pub use invalidation::{InvalidationPolicy, InvalidationReport};
pub use keys::{CacheKey, CacheView, View, views};
pub use read_through::ReadThroughAccessor;

use crate::ports::CacheStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the process-wide cache store for the lifetime of the server.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    fence: Arc<WriteFence>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            fence: Arc::new(WriteFence::new()),
        }
    }

    pub fn accessor(&self) -> ReadThroughAccessor {
        ReadThroughAccessor::new(self.store.clone(), self.fence.clone())
    }

    pub fn policy(&self) -> InvalidationPolicy {
        InvalidationPolicy::new(self.store.clone(), self.fence.clone())
    }

    pub fn entry_count(&self) -> usize {
        self.store.len()
    }

    /// Drop every cached entry at process stop.
    pub fn shutdown(&self) {
        let entries = self.store.len();
        match self.store.clear() {
            Ok(()) => info!("Response cache shut down, dropped {} entries", entries),
            Err(e) => warn!("Failed to clear response cache on shutdown: {}", e),
        }
    }
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("entries", &self.store.len())
            .field("generation", &self.fence.generation())
            .finish()
    }
}
