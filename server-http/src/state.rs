use bazaar::auth::{
    AuthError, AuthService, MokaSessionRepository, SessionStore, SledUserRepository,
    UserRepository, UserService, defaults::ensure_default_admin,
};
use bazaar::cache::CacheLayer;
use bazaar::persistence::{SledCouponRepository, SledOrderRepository, SledProductRepository};
use bazaar::ports::CacheStore;
use bazaar::services::{
    DashboardService, LocalPaymentGateway, OrderService, PaymentService, ProductLock,
    ProductService,
};
use shared::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub session_store: SessionStore,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
    pub dashboard: Arc<DashboardService>,
    pub cache: CacheLayer,
}

impl AppState {
    /// Wire repositories, the response cache and the services over one database,
    /// creating the configured admin account on first start.
    pub async fn init(
        config: &Config,
        db: sled::Db,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, AuthError> {
        let cache = CacheLayer::new(store);

        let users: Arc<dyn UserRepository> = Arc::new(SledUserRepository::new(db.clone()));
        let products = Arc::new(SledProductRepository::new(db.clone()));
        let orders = Arc::new(SledOrderRepository::new(db.clone()));
        let coupons = Arc::new(SledCouponRepository::new(db));

        if ensure_default_admin(
            users.as_ref(),
            &config.admin_name,
            &config.admin_email,
            &config.admin_password,
        )
        .await?
        .is_none()
        {
            info!("Admin account {} already present", config.admin_email);
        }

        let ttl = Duration::from_secs(config.session_ttl_secs);
        let session_store = SessionStore::new(
            Arc::new(MokaSessionRepository::new(None, Some(ttl))),
            ttl,
        );

        // Admin edits and order placement both rewrite product stock
        let product_lock = ProductLock::new();

        Ok(Self {
            auth_service: Arc::new(AuthService::new(users.clone())),
            user_service: Arc::new(UserService::new(
                users.clone(),
                session_store.clone(),
                cache.policy(),
            )),
            session_store,
            products: Arc::new(ProductService::new(
                products.clone(),
                product_lock.clone(),
                &cache,
                config.products_per_page,
            )),
            orders: Arc::new(OrderService::new(
                orders.clone(),
                products.clone(),
                product_lock,
                &cache,
            )),
            payments: Arc::new(PaymentService::new(
                coupons,
                Arc::new(LocalPaymentGateway),
                config.payment_currency.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(products, orders, users, &cache)),
            cache,
        })
    }
}
