use crate::cache::{CacheLayer, ChangeDescriptor, InvalidationPolicy, ReadThroughAccessor, views};
use crate::domain::{NewOrder, Order, Product};
use crate::ports::{OrderRepository, ProductRepository};
use crate::services::ProductLock;
use chrono::Utc;
use shared::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    cache: ReadThroughAccessor,
    invalidation: InvalidationPolicy,
    // Held across reservation so two orders cannot both claim the last unit
    lock: ProductLock,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        lock: ProductLock,
        cache: &CacheLayer,
    ) -> Self {
        Self {
            orders,
            products,
            cache: cache.accessor(),
            invalidation: cache.policy(),
            lock,
        }
    }

    /// Place an order: reserve stock for every item, store the order, then
    /// evict the affected product, order and dashboard views.
    pub async fn place(&self, input: NewOrder) -> Result<Order> {
        let user_id = validate_new_order(&input)?;

        let order = {
            let _guard = self.lock.acquire().await;
            let reserved = self.reserve_stock(&input).await?;

            let mut written = Vec::with_capacity(reserved.len());
            match self.commit(reserved, &mut written, input, user_id).await {
                Ok(order) => order,
                Err(e) => {
                    self.release_stock(&written).await;
                    return Err(e);
                }
            }
        };

        let product_ids: Vec<&str> = order.product_ids().collect();
        self.invalidation.invalidate(
            &ChangeDescriptor::new()
                .with_products(product_ids)
                .with_admin()
                .with_user(order.user_id.clone())
                .with_order(order.id.clone()),
        )?;

        info!(
            "NEW_ORDER: {} for user {} ({} items)",
            order.id,
            order.user_id,
            order.item_count()
        );
        Ok(order)
    }

    /// Write the reduced stock, then the order. `written` collects each
    /// product write that committed, with the quantity it took.
    async fn commit(
        &self,
        reserved: Vec<(Product, u32)>,
        written: &mut Vec<(String, u32)>,
        input: NewOrder,
        user_id: String,
    ) -> Result<Order> {
        for (product, quantity) in reserved {
            let id = product.id.clone();
            self.products.update(product).await?;
            written.push((id, quantity));
        }
        self.orders.create(Order::new(input, user_id)).await
    }

    /// Give back the stock of a failed order and evict the products it touched.
    /// Runs under the product lock, so no other write interleaves.
    async fn release_stock(&self, written: &[(String, u32)]) {
        if written.is_empty() {
            return;
        }

        for (product_id, quantity) in written {
            let restored = match self.products.find_by_id(product_id).await {
                Ok(Some(mut product)) => {
                    product.stock += quantity;
                    product.updated_at = Utc::now();
                    self.products.update(product).await.map(|_| ())
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = restored {
                warn!("Failed to restore {} units of {}: {}", quantity, product_id, e);
            }
        }

        let descriptor = ChangeDescriptor::new()
            .with_products(written.iter().map(|(id, _)| id.clone()))
            .with_admin();
        if let Err(e) = self.invalidation.invalidate(&descriptor) {
            warn!("Failed to evict products of a failed order: {}", e);
        }
    }

    /// Check every line against current stock and return the products with
    /// their reduced stock and the quantity taken. Nothing is written here.
    async fn reserve_stock(&self, input: &NewOrder) -> Result<Vec<(Product, u32)>> {
        let mut wanted: BTreeMap<&str, u32> = BTreeMap::new();
        for item in &input.order_items {
            *wanted.entry(item.product_id.as_str()).or_insert(0) += item.quantity;
        }

        let mut updated = Vec::with_capacity(wanted.len());
        for (product_id, quantity) in wanted {
            let mut product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or_else(|| Error::not_found(format!("product {}", product_id)))?;

            if product.stock < quantity {
                return Err(Error::validation(format!(
                    "insufficient stock for {}: {} left, {} requested",
                    product.title, product.stock, quantity
                )));
            }

            product.stock -= quantity;
            product.updated_at = Utc::now();
            updated.push((product, quantity));
        }

        Ok(updated)
    }

    pub async fn my_orders(&self, user_id: &str) -> Result<Vec<Order>> {
        self.cache
            .get(&views::user_orders(user_id), || async {
                let mut orders = self.orders.list_by_user(user_id).await?;
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok::<_, Error>(orders)
            })
            .await
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.cache
            .get(&views::admin_orders(), || async {
                let mut orders = self.orders.list_all().await?;
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok::<_, Error>(orders)
            })
            .await
    }

    pub async fn order(&self, id: &str) -> Result<Order> {
        self.cache
            .get(&views::order(id), || async {
                self.orders
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| Error::not_found("order"))
            })
            .await
    }

    /// Advance the fulfilment status by one step
    pub async fn process(&self, id: &str) -> Result<Order> {
        let mut order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("order"))?;

        order.status = order.status.advance();
        order.updated_at = Utc::now();
        let order = self.orders.update(order).await?;

        self.invalidation.invalidate(&order_changed(&order))?;

        info!("PROCESS_ORDER: {} is now {:?}", order.id, order.status);
        Ok(order)
    }

    pub async fn delete(&self, id: &str) -> Result<Order> {
        let order = self
            .orders
            .delete(id)
            .await?
            .ok_or_else(|| Error::not_found("order"))?;

        self.invalidation.invalidate(&order_changed(&order))?;

        info!("DELETE_ORDER: {}", order.id);
        Ok(order)
    }
}

fn order_changed(order: &Order) -> ChangeDescriptor {
    ChangeDescriptor::new()
        .with_admin()
        .with_user(order.user_id.clone())
        .with_order(order.id.clone())
}

fn validate_new_order(input: &NewOrder) -> Result<String> {
    let shipping = &input.shipping_info;
    if [
        &shipping.address,
        &shipping.city,
        &shipping.state,
        &shipping.country,
        &shipping.pin_code,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return Err(Error::validation("shipping information is required"));
    }
    if input.order_items.is_empty() {
        return Err(Error::validation("order items are required"));
    }
    if input.order_items.iter().any(|item| item.quantity == 0) {
        return Err(Error::validation("item quantity must be at least 1"));
    }
    if input.subtotal.is_nan() || input.subtotal <= 0.0 {
        return Err(Error::validation("subtotal is required"));
    }
    if input.tax.is_nan() || input.tax < 0.0 {
        return Err(Error::validation("tax cannot be negative"));
    }
    if input.total.is_nan() || input.total <= 0.0 {
        return Err(Error::validation("total is required"));
    }

    input
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::validation("user is required"))
}
