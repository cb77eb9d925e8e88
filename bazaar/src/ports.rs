#![deny(clippy::all)]

use crate::cache::CacheKey;
use crate::domain::response::{DeleteResponse, PutResponse};
use crate::domain::{Coupon, Order, PaymentIntent, Product};
use async_trait::async_trait;
use bytes::Bytes;
use shared::Result;
use std::collections::HashSet;

// Ports are the pluggable seams between the application core and its backends

/// Port for the process-wide response cache.
///
/// Every call is atomic with respect to the others; implementations never
/// suspend, so the trait is synchronous. A missing key is `Ok(None)`, never an error.
pub trait CacheStore: Send + Sync + 'static {
    fn exists(&self, key: &CacheKey) -> Result<bool>;
    fn get(&self, key: &CacheKey) -> Result<Option<Bytes>>;
    fn put(&self, key: CacheKey, value: Bytes) -> Result<PutResponse>;
    /// Remove every present key in one batch; absent keys are ignored
    fn delete(&self, keys: &HashSet<CacheKey>) -> Result<DeleteResponse>;
    fn len(&self) -> usize;
    fn clear(&self) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> Result<Product>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>>;

    async fn list_all(&self) -> Result<Vec<Product>>;

    /// Replace a stored product; fails with `NotFound` if it does not exist
    async fn update(&self, product: Product) -> Result<Product>;

    /// Remove a product, returning the removed record if there was one
    async fn delete(&self, id: &str) -> Result<Option<Product>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> Result<Order>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>>;

    async fn list_all(&self) -> Result<Vec<Order>>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>>;

    async fn update(&self, order: Order) -> Result<Order>;

    async fn delete(&self, id: &str) -> Result<Option<Order>>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Store a coupon; fails with `Conflict` if the code is taken
    async fn create(&self, coupon: Coupon) -> Result<Coupon>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>>;

    async fn list_all(&self) -> Result<Vec<Coupon>>;

    async fn delete(&self, id: &str) -> Result<Option<Coupon>>;
}

/// Port for the card processor that issues payment intents
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_minor: u64, currency: &str) -> Result<PaymentIntent>;
}
