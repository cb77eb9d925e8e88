//! Cache key taxonomy.
//!
//! Every cached view is named by a `CacheView` (family plus parameters). The
//! read path and the invalidation path both derive keys through
//! `CacheView::key`, so a view always maps to the same string.

use std::fmt;
use std::marker::PhantomData;

/// Identifies one cached view of the underlying data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheView {
    // Catalog singletons
    LatestProducts,
    Categories,
    AdminProducts,

    // Per-entity views
    Product(String),
    UserOrders(String),
    AdminOrders,
    Order(String),

    // Admin dashboard aggregates
    DashboardStats,
    DashboardPie,
    DashboardBar,
    DashboardLine,
}

impl CacheView {
    /// Dashboard aggregates evicted by any admin-relevant write
    pub const DASHBOARD: [CacheView; 4] = [
        CacheView::DashboardStats,
        CacheView::DashboardPie,
        CacheView::DashboardBar,
        CacheView::DashboardLine,
    ];

    pub fn key(&self) -> CacheKey {
        let key = match self {
            CacheView::LatestProducts => "latest-products".to_string(),
            CacheView::Categories => "category-list".to_string(),
            CacheView::AdminProducts => "admin-products".to_string(),
            CacheView::Product(id) => format!("single-product-{id}"),
            CacheView::UserOrders(user_id) => format!("user-orders-{user_id}"),
            CacheView::AdminOrders => "admin-orders".to_string(),
            CacheView::Order(id) => format!("single-order-{id}"),
            CacheView::DashboardStats => "admin-stats".to_string(),
            CacheView::DashboardPie => "admin-pie-charts".to_string(),
            CacheView::DashboardBar => "admin-bar-charts".to_string(),
            CacheView::DashboardLine => "admin-line-charts".to_string(),
        };
        CacheKey(key)
    }
}

/// Deterministic key string for one cached view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap a raw key string. Prefer `CacheView::key` on the read and write paths.
    pub fn raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&CacheView> for CacheKey {
    fn from(view: &CacheView) -> Self {
        view.key()
    }
}

/// A `CacheView` tied to the type of value cached under it.
pub struct View<T> {
    view: CacheView,
    _value: PhantomData<fn() -> T>,
}

impl<T> View<T> {
    fn new(view: CacheView) -> Self {
        Self {
            view,
            _value: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(view: CacheView) -> Self {
        Self::new(view)
    }

    pub fn view(&self) -> &CacheView {
        &self.view
    }

    pub fn key(&self) -> CacheKey {
        self.view.key()
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("View").field(&self.view).finish()
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self::new(self.view.clone())
    }
}

/// Typed constructors, one per view family.
pub mod views {
    use super::{CacheView, View};
    use crate::domain::{Order, Product};
    use crate::services::dashboard::{BarCharts, DashboardStats, LineCharts, PieCharts};

    pub fn latest_products() -> View<Vec<Product>> {
        View::new(CacheView::LatestProducts)
    }

    pub fn categories() -> View<Vec<String>> {
        View::new(CacheView::Categories)
    }

    pub fn admin_products() -> View<Vec<Product>> {
        View::new(CacheView::AdminProducts)
    }

    pub fn product(id: &str) -> View<Product> {
        View::new(CacheView::Product(id.to_string()))
    }

    pub fn user_orders(user_id: &str) -> View<Vec<Order>> {
        View::new(CacheView::UserOrders(user_id.to_string()))
    }

    pub fn admin_orders() -> View<Vec<Order>> {
        View::new(CacheView::AdminOrders)
    }

    pub fn order(id: &str) -> View<Order> {
        View::new(CacheView::Order(id.to_string()))
    }

    pub fn dashboard_stats() -> View<DashboardStats> {
        View::new(CacheView::DashboardStats)
    }

    pub fn dashboard_pie() -> View<PieCharts> {
        View::new(CacheView::DashboardPie)
    }

    pub fn dashboard_bar() -> View<BarCharts> {
        View::new(CacheView::DashboardBar)
    }

    pub fn dashboard_line() -> View<LineCharts> {
        View::new(CacheView::DashboardLine)
    }
}
