use super::descriptor::ChangeDescriptor;
use super::fence::WriteFence;
use super::keys::{CacheKey, CacheView};
use crate::ports::CacheStore;
use shared::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of one invalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Keys the descriptor mapped to
    pub planned: usize,
    /// Keys that were actually present and removed
    pub evicted: usize,
}

/// Single entry point for write-triggered cache eviction.
#[derive(Clone)]
pub struct InvalidationPolicy {
    store: Arc<dyn CacheStore>,
    fence: Arc<WriteFence>,
}

impl InvalidationPolicy {
    pub fn new(store: Arc<dyn CacheStore>, fence: Arc<WriteFence>) -> Self {
        Self { store, fence }
    }

    /// Compute the exact key set a descriptor makes stale.
    pub fn plan(descriptor: &ChangeDescriptor) -> HashSet<CacheKey> {
        let mut keys = HashSet::new();

        if descriptor.product {
            keys.insert(CacheView::LatestProducts.key());
            keys.insert(CacheView::Categories.key());
            keys.insert(CacheView::AdminProducts.key());
            for product_id in &descriptor.product_ids {
                keys.insert(CacheView::Product(product_id.clone()).key());
            }
        }

        if descriptor.order {
            keys.insert(CacheView::AdminOrders.key());
            if let Some(user_id) = &descriptor.user_id {
                keys.insert(CacheView::UserOrders(user_id.clone()).key());
            }
            if let Some(order_id) = &descriptor.order_id {
                keys.insert(CacheView::Order(order_id.clone()).key());
            }
        }

        if descriptor.admin {
            keys.extend(CacheView::DASHBOARD.iter().map(CacheView::key));
        }

        keys
    }

    /// Evict every key the descriptor maps to, in one batch.
    ///
    /// Returns only after the store has applied the delete. A store failure
    /// is surfaced as `Error::Invalidation` so the enclosing write fails.
    pub fn invalidate(&self, descriptor: &ChangeDescriptor) -> Result<InvalidationReport> {
        let keys = Self::plan(descriptor);
        if keys.is_empty() {
            return Ok(InvalidationReport {
                planned: 0,
                evicted: 0,
            });
        }

        let planned = keys.len();
        let response = self
            .fence
            .advance(|| self.store.delete(&keys))
            .map_err(|e| {
                error!("Cache invalidation of {} key(s) failed: {}", planned, e);
                Error::Invalidation(e.to_string())
            })?;

        debug!(
            "Invalidated {} of {} planned key(s) for {:?}",
            response.deleted, planned, descriptor
        );

        Ok(InvalidationReport {
            planned,
            evicted: response.deleted,
        })
    }
}

impl std::fmt::Debug for InvalidationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationPolicy")
            .field("generation", &self.fence.generation())
            .finish()
    }
}
