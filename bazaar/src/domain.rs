use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod response {

    #[derive(Clone, Debug)]
    pub struct PutResponse {
        pub replaced: bool,
    }

    impl PutResponse {
        pub fn new(replaced: bool) -> Self {
            Self { replaced }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct DeleteResponse {
        pub deleted: usize,
    }

    impl DeleteResponse {
        pub fn new(deleted: usize) -> Self {
            Self { deleted }
        }
    }
}

// === Catalog ===

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub description: Option<String>,
    pub photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            price: input.price,
            category: input.category.trim().to_lowercase(),
            stock: input.stock,
            description: input.description,
            photo: input.photo,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub description: Option<String>,
    pub photo: String,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub description: Option<String>,
    pub photo: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.description.is_none()
            && self.photo.is_none()
    }

    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            product.title = title.trim().to_string();
        }
        if let Some(price) = self.price.filter(|p| *p > 0.0) {
            product.price = price;
        }
        if let Some(category) = self.category.filter(|c| !c.trim().is_empty()) {
            product.category = category.trim().to_lowercase();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(photo) = self.photo.filter(|p| !p.is_empty()) {
            product.photo = photo;
        }
        product.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSort {
    Asc,
    Desc,
}

/// Filters for the uncached product search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub sort: Option<PriceSort>,
    pub page: Option<usize>,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !product
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if product.category != category.to_lowercase() {
                return false;
            }
        }
        if let Some(max_price) = self.price {
            if product.price > max_price {
                return false;
            }
        }
        if let Some(description) = self.description.as_deref() {
            if product.description.as_deref() != Some(description) {
                return false;
            }
        }
        true
    }

    pub fn page(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: usize,
}

// === Orders ===

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub photo: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Next fulfilment step; delivered orders stay delivered
    pub fn advance(self) -> Self {
        match self {
            OrderStatus::Processing => OrderStatus::Shipped,
            OrderStatus::Shipped | OrderStatus::Delivered => OrderStatus::Delivered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping_charges: f64,
    pub discount: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(input: NewOrder, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            shipping_info: input.shipping_info,
            order_items: input.order_items,
            subtotal: input.subtotal,
            tax: input.tax,
            shipping_charges: input.shipping_charges.unwrap_or(0.0),
            discount: input.discount.unwrap_or(0.0),
            total: input.total,
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn item_count(&self) -> u32 {
        self.order_items.iter().map(|item| item.quantity).sum()
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.order_items.iter().map(|item| item.product_id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    /// Ordering user; the HTTP layer fills this from the session for non-admins
    pub user_id: Option<String>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping_charges: Option<f64>,
    pub discount: Option<f64>,
    pub total: f64,
}

// === Payments ===

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: &str, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.trim().to_uppercase(),
            amount,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    /// Amount in minor currency units
    pub amount: u64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product::new(NewProduct {
            title: "  Mechanical Keyboard ".to_string(),
            price: 89.5,
            category: "Electronics".to_string(),
            stock: 12,
            description: Some("Tactile switches".to_string()),
            photo: "https://cdn.example.com/kb.png".to_string(),
        })
    }

    #[test]
    fn test_new_product_normalizes_fields() {
        let product = sample_product();
        assert_eq!(product.title, "Mechanical Keyboard");
        assert_eq!(product.category, "electronics");
        assert!(product.in_stock());
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_product_update_applies_only_present_fields() {
        let mut product = sample_product();
        let update = ProductUpdate {
            price: Some(79.0),
            category: Some("Peripherals".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());

        update.apply(&mut product);
        assert_eq!(product.price, 79.0);
        assert_eq!(product.category, "peripherals");
        assert_eq!(product.title, "Mechanical Keyboard");
        assert_eq!(product.stock, 12);
    }

    #[test]
    fn test_product_query_matching() {
        let product = sample_product();

        let query = ProductQuery {
            search: Some("KEYBOARD".to_string()),
            price: Some(100.0),
            ..Default::default()
        };
        assert!(query.matches(&product));

        let too_cheap = ProductQuery {
            price: Some(50.0),
            ..Default::default()
        };
        assert!(!too_cheap.matches(&product));

        let other_category = ProductQuery {
            category: Some("books".to_string()),
            ..Default::default()
        };
        assert!(!other_category.matches(&product));

        assert_eq!(ProductQuery::default().page(), 1);
    }

    #[test]
    fn test_order_status_advance() {
        assert_eq!(OrderStatus::Processing.advance(), OrderStatus::Shipped);
        assert_eq!(OrderStatus::Shipped.advance(), OrderStatus::Delivered);
        assert_eq!(OrderStatus::Delivered.advance(), OrderStatus::Delivered);
    }

    #[test]
    fn test_coupon_code_uppercased() {
        let coupon = Coupon::new(" save10 ", 10.0);
        assert_eq!(coupon.code, "SAVE10");
    }
}
