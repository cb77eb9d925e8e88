//! Admin dashboard aggregates.
//!
//! Every figure is computed from a full [`Snapshot`] of products, orders and
//! users at a given `now`, so the aggregation itself is pure. The service
//! caches each aggregate under its admin view; any write that raises the
//! `admin` flag evicts all four.

use crate::auth::{User, UserRepository};
use crate::cache::{CacheLayer, ReadThroughAccessor, views};
use crate::domain::{Order, OrderStatus, Product};
use crate::ports::{OrderRepository, ProductRepository};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

const STATS_CHART_MONTHS: usize = 6;
const BAR_SHORT_MONTHS: usize = 6;
const BAR_LONG_MONTHS: usize = 12;
const LINE_MONTHS: usize = 12;
const LATEST_TRANSACTIONS: usize = 4;
const MARKETING_SHARE: f64 = 0.30;

// === Aggregate shapes ===

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Totals {
    pub revenue: f64,
    pub users: usize,
    pub products: usize,
    pub orders: usize,
}

/// Month-over-month change, in whole percent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangePercent {
    pub revenue: i64,
    pub users: i64,
    pub products: i64,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatestTransaction {
    pub id: String,
    pub discount: f64,
    pub amount: f64,
    pub quantity: u32,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyOrders {
    pub orders: Vec<usize>,
    pub revenue: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub change_percent: ChangePercent,
    pub count: Totals,
    /// Percent of the catalog in each category
    pub category_share: BTreeMap<String, u32>,
    pub chart: MonthlyOrders,
    pub latest_transactions: Vec<LatestTransaction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderFulfillment {
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockAvailability {
    pub in_stock: usize,
    pub out_of_stock: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RevenueDistribution {
    pub net_margin: f64,
    pub discount: f64,
    pub production_cost: f64,
    pub burnt: f64,
    pub marketing_cost: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRoles {
    pub admin: usize,
    pub customers: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PieCharts {
    pub order_fulfillment: OrderFulfillment,
    pub product_categories: BTreeMap<String, usize>,
    pub stock_availability: StockAvailability,
    pub revenue_distribution: RevenueDistribution,
    pub user_roles: UserRoles,
}

/// Oldest month first; the last slot is the current month
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BarCharts {
    pub products: Vec<usize>,
    pub users: Vec<usize>,
    pub orders: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineCharts {
    pub users: Vec<usize>,
    pub products: Vec<usize>,
    pub discount: Vec<f64>,
    pub revenue: Vec<f64>,
}

// === Pure aggregation ===

/// Everything the dashboard reads
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub users: Vec<User>,
}

/// `this*100` when there was nothing last month, else the relative change
pub fn change_percent(this_month: f64, last_month: f64) -> i64 {
    if last_month == 0.0 {
        return (this_month * 100.0).round() as i64;
    }
    ((this_month - last_month) / last_month * 100.0).round() as i64
}

fn month_index(at: DateTime<Utc>) -> i64 {
    i64::from(at.year()) * 12 + i64::from(at.month0())
}

/// Calendar months between `at` and `now`; negative for future timestamps
fn months_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    month_index(now) - month_index(at)
}

/// Slot of `at` in an oldest-first series of `len` months ending at `now`
fn month_slot(at: DateTime<Utc>, now: DateTime<Utc>, len: usize) -> Option<usize> {
    let ago = months_ago(at, now);
    if ago < 0 || ago >= len as i64 {
        return None;
    }
    Some(len - 1 - ago as usize)
}

fn count_by_month<I>(dates: I, now: DateTime<Utc>, len: usize) -> Vec<usize>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut series = vec![0; len];
    for at in dates {
        if let Some(slot) = month_slot(at, now, len) {
            series[slot] += 1;
        }
    }
    series
}

fn sum_by_month<I>(entries: I, now: DateTime<Utc>, len: usize) -> Vec<f64>
where
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let mut series = vec![0.0; len];
    for (at, amount) in entries {
        if let Some(slot) = month_slot(at, now, len) {
            series[slot] += amount;
        }
    }
    series
}

/// (this month, last month) tallies for one kind of record
fn month_pair<I>(entries: I, now: DateTime<Utc>) -> (f64, f64)
where
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let series = sum_by_month(entries, now, 2);
    (series[1], series[0])
}

fn category_counts(products: &[Product]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for product in products {
        *counts.entry(product.category.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn stats(snapshot: &Snapshot, now: DateTime<Utc>) -> DashboardStats {
    let Snapshot {
        products,
        orders,
        users,
    } = snapshot;

    let (revenue_now, revenue_last) =
        month_pair(orders.iter().map(|o| (o.created_at, o.total)), now);
    let (users_now, users_last) = month_pair(users.iter().map(|u| (u.created_at, 1.0)), now);
    let (products_now, products_last) =
        month_pair(products.iter().map(|p| (p.created_at, 1.0)), now);
    let (orders_now, orders_last) = month_pair(orders.iter().map(|o| (o.created_at, 1.0)), now);

    let category_share = category_counts(products)
        .into_iter()
        .map(|(category, count)| {
            let percent = (count as f64 / products.len() as f64 * 100.0).round() as u32;
            (category, percent)
        })
        .collect();

    let mut latest: Vec<&Order> = orders.iter().collect();
    latest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let latest_transactions = latest
        .into_iter()
        .take(LATEST_TRANSACTIONS)
        .map(|order| LatestTransaction {
            id: order.id.clone(),
            discount: order.discount,
            amount: order.total,
            quantity: order.item_count(),
            status: order.status,
        })
        .collect();

    DashboardStats {
        change_percent: ChangePercent {
            revenue: change_percent(revenue_now, revenue_last),
            users: change_percent(users_now, users_last),
            products: change_percent(products_now, products_last),
            orders: change_percent(orders_now, orders_last),
        },
        count: Totals {
            revenue: orders.iter().map(|o| o.total).sum(),
            users: users.len(),
            products: products.len(),
            orders: orders.len(),
        },
        category_share,
        chart: MonthlyOrders {
            orders: count_by_month(orders.iter().map(|o| o.created_at), now, STATS_CHART_MONTHS),
            revenue: sum_by_month(
                orders.iter().map(|o| (o.created_at, o.total)),
                now,
                STATS_CHART_MONTHS,
            ),
        },
        latest_transactions,
    }
}

pub fn pie(snapshot: &Snapshot) -> PieCharts {
    let Snapshot {
        products,
        orders,
        users,
    } = snapshot;

    let mut order_fulfillment = OrderFulfillment::default();
    for order in orders {
        match order.status {
            OrderStatus::Processing => order_fulfillment.processing += 1,
            OrderStatus::Shipped => order_fulfillment.shipped += 1,
            OrderStatus::Delivered => order_fulfillment.delivered += 1,
        }
    }

    let in_stock = products.iter().filter(|p| p.in_stock()).count();

    let gross: f64 = orders.iter().map(|o| o.total).sum();
    let discount: f64 = orders.iter().map(|o| o.discount).sum();
    let production_cost: f64 = orders.iter().map(|o| o.shipping_charges).sum();
    let burnt: f64 = orders.iter().map(|o| o.tax).sum();
    let marketing_cost = (gross * MARKETING_SHARE).round();

    let admin = users.iter().filter(|u| u.is_admin()).count();

    PieCharts {
        order_fulfillment,
        product_categories: category_counts(products),
        stock_availability: StockAvailability {
            in_stock,
            out_of_stock: products.len() - in_stock,
        },
        revenue_distribution: RevenueDistribution {
            net_margin: gross - discount - production_cost - burnt - marketing_cost,
            discount,
            production_cost,
            burnt,
            marketing_cost,
        },
        user_roles: UserRoles {
            admin,
            customers: users.len() - admin,
        },
    }
}

pub fn bar(snapshot: &Snapshot, now: DateTime<Utc>) -> BarCharts {
    BarCharts {
        products: count_by_month(
            snapshot.products.iter().map(|p| p.created_at),
            now,
            BAR_SHORT_MONTHS,
        ),
        users: count_by_month(
            snapshot.users.iter().map(|u| u.created_at),
            now,
            BAR_SHORT_MONTHS,
        ),
        orders: count_by_month(
            snapshot.orders.iter().map(|o| o.created_at),
            now,
            BAR_LONG_MONTHS,
        ),
    }
}

pub fn line(snapshot: &Snapshot, now: DateTime<Utc>) -> LineCharts {
    LineCharts {
        users: count_by_month(snapshot.users.iter().map(|u| u.created_at), now, LINE_MONTHS),
        products: count_by_month(
            snapshot.products.iter().map(|p| p.created_at),
            now,
            LINE_MONTHS,
        ),
        discount: sum_by_month(
            snapshot.orders.iter().map(|o| (o.created_at, o.discount)),
            now,
            LINE_MONTHS,
        ),
        revenue: sum_by_month(
            snapshot.orders.iter().map(|o| (o.created_at, o.total)),
            now,
            LINE_MONTHS,
        ),
    }
}

// === Service ===

pub struct DashboardService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    cache: ReadThroughAccessor,
}

impl DashboardService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        cache: &CacheLayer,
    ) -> Self {
        Self {
            products,
            orders,
            users,
            cache: cache.accessor(),
        }
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            products: self.products.list_all().await?,
            orders: self.orders.list_all().await?,
            users: self.users.list_all().await?,
        })
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        self.cache
            .get(&views::dashboard_stats(), || async {
                Ok::<_, Error>(stats(&self.snapshot().await?, Utc::now()))
            })
            .await
    }

    pub async fn pie(&self) -> Result<PieCharts> {
        self.cache
            .get(&views::dashboard_pie(), || async {
                Ok::<_, Error>(pie(&self.snapshot().await?))
            })
            .await
    }

    pub async fn bar(&self) -> Result<BarCharts> {
        self.cache
            .get(&views::dashboard_bar(), || async {
                Ok::<_, Error>(bar(&self.snapshot().await?, Utc::now()))
            })
            .await
    }

    pub async fn line(&self) -> Result<LineCharts> {
        self.cache
            .get(&views::dashboard_line(), || async {
                Ok::<_, Error>(line(&self.snapshot().await?, Utc::now()))
            })
            .await
    }
}
