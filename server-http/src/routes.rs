use crate::handlers::{self, dashboard, order, payment, product, user};
use crate::middleware::{admin_only, auth_middleware};
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use shared::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build and configure the application router. Every route lives under `/api/v1`.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health_check))
        // Signup honours the requested role, so any caller can register an admin
        .route("/user/new", post(user::signup))
        .route("/user/login", post(user::login))
        .route("/product/latest", get(product::latest_products))
        .route("/product/categories", get(product::categories))
        .route("/product/all", get(product::search_products))
        .route("/product/{id}", get(product::get_product))
        .route("/payment/discount", get(payment::apply_discount));

    let signed_in = Router::new()
        .route("/user/logout", post(user::logout))
        .route("/user/{id}", get(user::get_user))
        .route("/order/new", post(order::new_order))
        .route("/order/my", get(order::my_orders))
        .route("/order/{id}", get(order::get_order))
        .route("/payment/create", post(payment::create_payment_intent))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let admin = Router::new()
        .route("/user/all", get(user::list_users))
        .route("/user/{id}", delete(user::delete_user))
        .route("/product/admin-products", get(product::admin_products))
        .route("/product/new", post(product::create_product))
        .route(
            "/product/{id}",
            put(product::update_product).delete(product::delete_product),
        )
        .route("/order/all", get(order::all_orders))
        .route(
            "/order/{id}",
            put(order::process_order).delete(order::delete_order),
        )
        .route("/payment/coupon/new", post(payment::new_coupon))
        .route("/payment/coupon/all", get(payment::all_coupons))
        .route("/payment/coupon/{id}", delete(payment::delete_coupon))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/pie", get(dashboard::pie_charts))
        .route("/dashboard/bar", get(dashboard::bar_charts))
        .route("/dashboard/line", get(dashboard::line_charts))
        // Last added runs first: resolve the session, then check the role
        .route_layer(from_fn(admin_only))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = public.merge(signed_in).merge(admin);

    Router::new()
        .nest("/api/v1", api)
        // Middleware
        .layer(build_cors_layer(config))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if config.allows_any_origin() {
        info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        info!("CORS: allowing origins {:?}", config.allowed_origins);
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}
