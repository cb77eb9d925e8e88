//! Application services. Each owns the read and write paths of one area;
//! reads of cacheable views go through the read-through accessor and every
//! committed write is followed by exactly one invalidation.

pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod payments;

pub use catalog::ProductService;
pub use dashboard::DashboardService;
pub use orders::OrderService;
pub use payments::{LocalPaymentGateway, PaymentService};

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Serializes read-modify-write cycles on product records. Admin edits and
/// stock reservations share one lock so neither overwrites the other.
#[derive(Clone, Default)]
pub struct ProductLock(Arc<Mutex<()>>);

impl ProductLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}
