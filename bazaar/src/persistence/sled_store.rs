use super::{decode, encode, load_all, open_tree, storage_error};
use crate::domain::{Coupon, Order, Product};
use crate::ports::{CouponRepository, OrderRepository, ProductRepository};
use async_trait::async_trait;
use shared::{Error, Result};
use sled::Db;

const PRODUCTS_TREE: &str = "products";
const ORDERS_TREE: &str = "orders";
const COUPONS_TREE: &str = "coupons";
const COUPONS_BY_CODE_TREE: &str = "coupons_by_code";

#[derive(Clone)]
pub struct SledProductRepository {
    db: Db,
}

impl SledProductRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn products_tree(&self) -> Result<sled::Tree> {
        open_tree(&self.db, PRODUCTS_TREE)
    }
}

#[async_trait]
impl ProductRepository for SledProductRepository {
    async fn create(&self, product: Product) -> Result<Product> {
        let tree = self.products_tree()?;
        tree.insert(product.id.as_bytes(), encode(&product)?)
            .map_err(storage_error)?;
        Ok(product)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        let tree = self.products_tree()?;
        match tree.get(id.as_bytes()).map_err(storage_error)? {
            Some(data) => Ok(Some(decode(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        load_all(&self.products_tree()?)
    }

    async fn update(&self, product: Product) -> Result<Product> {
        let tree = self.products_tree()?;

        let encoded = encode(&product)?;

        // Replace only a record that still exists; a concurrent delete wins
        let stored = tree
            .update_and_fetch(product.id.as_bytes(), |current| {
                current.map(|_| encoded.clone())
            })
            .map_err(storage_error)?;
        if stored.is_none() {
            return Err(Error::not_found("product"));
        }
        Ok(product)
    }

    async fn delete(&self, id: &str) -> Result<Option<Product>> {
        let tree = self.products_tree()?;
        match tree.remove(id.as_bytes()).map_err(storage_error)? {
            Some(data) => Ok(Some(decode(&data)?)),
            None => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct SledOrderRepository {
    db: Db,
}

impl SledOrderRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn orders_tree(&self) -> Result<sled::Tree> {
        open_tree(&self.db, ORDERS_TREE)
    }
}

#[async_trait]
impl OrderRepository for SledOrderRepository {
    async fn create(&self, order: Order) -> Result<Order> {
        let tree = self.orders_tree()?;
        tree.insert(order.id.as_bytes(), encode(&order)?)
            .map_err(storage_error)?;
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>> {
        let tree = self.orders_tree()?;
        match tree.get(id.as_bytes()).map_err(storage_error)? {
            Some(data) => Ok(Some(decode(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        load_all(&self.orders_tree()?)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>> {
        let orders: Vec<Order> = load_all(&self.orders_tree()?)?;
        Ok(orders
            .into_iter()
            .filter(|order| order.user_id == user_id)
            .collect())
    }

    async fn update(&self, order: Order) -> Result<Order> {
        let tree = self.orders_tree()?;

        let encoded = encode(&order)?;

        // Replace only a record that still exists; a concurrent delete wins
        let stored = tree
            .update_and_fetch(order.id.as_bytes(), |current| {
                current.map(|_| encoded.clone())
            })
            .map_err(storage_error)?;
        if stored.is_none() {
            return Err(Error::not_found("order"));
        }
        Ok(order)
    }

    async fn delete(&self, id: &str) -> Result<Option<Order>> {
        let tree = self.orders_tree()?;
        match tree.remove(id.as_bytes()).map_err(storage_error)? {
            Some(data) => Ok(Some(decode(&data)?)),
            None => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct SledCouponRepository {
    db: Db,
}

impl SledCouponRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn coupons_tree(&self) -> Result<sled::Tree> {
        open_tree(&self.db, COUPONS_TREE)
    }

    fn coupons_by_code_tree(&self) -> Result<sled::Tree> {
        open_tree(&self.db, COUPONS_BY_CODE_TREE)
    }
}

#[async_trait]
impl CouponRepository for SledCouponRepository {
    async fn create(&self, coupon: Coupon) -> Result<Coupon> {
        let coupons = self.coupons_tree()?;
        let by_code = self.coupons_by_code_tree()?;

        // Claim the code first so two coupons can never share it
        let claimed = by_code
            .compare_and_swap(
                coupon.code.as_bytes(),
                None as Option<&[u8]>,
                Some(coupon.id.as_bytes()),
            )
            .map_err(storage_error)?;
        if claimed.is_err() {
            return Err(Error::Conflict(format!(
                "coupon code {} already exists",
                coupon.code
            )));
        }

        coupons
            .insert(coupon.id.as_bytes(), encode(&coupon)?)
            .map_err(storage_error)?;
        Ok(coupon)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        let coupons = self.coupons_tree()?;
        let by_code = self.coupons_by_code_tree()?;

        if let Some(coupon_id) = by_code.get(code.as_bytes()).map_err(storage_error)? {
            if let Some(data) = coupons.get(&coupon_id).map_err(storage_error)? {
                return Ok(Some(decode(&data)?));
            }
        }

        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<Coupon>> {
        load_all(&self.coupons_tree()?)
    }

    async fn delete(&self, id: &str) -> Result<Option<Coupon>> {
        let coupons = self.coupons_tree()?;
        let by_code = self.coupons_by_code_tree()?;

        match coupons.remove(id.as_bytes()).map_err(storage_error)? {
            Some(data) => {
                let coupon: Coupon = decode(&data)?;
                by_code
                    .remove(coupon.code.as_bytes())
                    .map_err(storage_error)?;
                Ok(Some(coupon))
            }
            None => Ok(None),
        }
    }
}
