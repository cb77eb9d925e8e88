use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use bazaar::persistence::open_database;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server_http::{AppState, build_router};
use shared::config::Config;
use std::sync::Arc;
use storage_engine::MemoryCacheStore;
use tempfile::TempDir;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@shop.test";
const ADMIN_PASSWORD: &str = "adminpass1";

struct TestApp {
    _dir: TempDir,
    router: Router,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::from_lookup(|name| match name {
            "BAZAAR_ADMIN_EMAIL" => Some(ADMIN_EMAIL.to_string()),
            "BAZAAR_ADMIN_PASSWORD" => Some(ADMIN_PASSWORD.to_string()),
            "BAZAAR_PRODUCTS_PER_PAGE" => Some("2".to_string()),
            _ => None,
        });
        let db = open_database(dir.path().join("api.sled")).unwrap();
        let state = AppState::init(&config, db, Arc::new(MemoryCacheStore::new()))
            .await
            .unwrap();
        let router = build_router(state.clone(), &config);

        Self {
            _dir: dir,
            router,
            state,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/user/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    async fn signup(&self, name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/user/new",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "shopper2024",
                    "confirm_password": "shopper2024",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn create_product(&self, token: &str, title: &str, price: f64, stock: u32) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/product/new",
                Some(token),
                Some(json!({
                    "title": title,
                    "price": price,
                    "category": "Electronics",
                    "stock": stock,
                    "photo": "https://cdn.example.com/p.png",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["product"].clone()
    }
}

fn order_body(product: &Value, quantity: u32) -> Value {
    let price = product["price"].as_f64().unwrap();
    let subtotal = price * f64::from(quantity);
    json!({
        "shipping_info": {
            "address": "12 Market Road",
            "city": "Pune",
            "state": "MH",
            "country": "India",
            "pin_code": "411001",
        },
        "order_items": [{
            "product_id": product["id"],
            "name": product["title"],
            "photo": product["photo"],
            "price": price,
            "quantity": quantity,
        }],
        "subtotal": subtotal,
        "tax": 0.0,
        "total": subtotal,
    })
}

#[tokio::test]
async fn test_health_reports_cache_entries() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["cache_entries"], 0);

    app.get("/api/v1/product/latest", None).await;
    let (_, body) = app.get("/api/v1/health", None).await;
    assert_eq!(body["cache_entries"], 1);
}

#[tokio::test]
async fn test_signup_login_and_logout() {
    let app = TestApp::new().await;
    let (token, user_id) = app.signup("Asha", "Asha@Shop.test").await;

    let (status, body) = app.get(&format!("/api/v1/user/{user_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "asha@shop.test");
    assert!(body["user"].get("password_hash").is_none());

    // Basic credentials are accepted in place of a JSON body
    let basic = format!("Basic {}", STANDARD.encode("asha@shop.test:shopper2024"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/user/login")
        .header(header::AUTHORIZATION, basic)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/user/login",
            None,
            Some(json!({ "email": "asha@shop.test", "password": "wrong-pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(Method::POST, "/api/v1/user/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/v1/order/my", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = TestApp::new().await;
    app.signup("Ravi", "ravi@shop.test").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/user/new",
            None,
            Some(json!({
                "name": "Ravi again",
                "email": "ravi@shop.test",
                "password": "shopper2024",
                "confirm_password": "shopper2024",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_access_control() {
    let app = TestApp::new().await;
    let (token, _) = app.signup("Meera", "meera@shop.test").await;
    let (_, other_id) = app.signup("Kabir", "kabir@shop.test").await;

    let new_product = json!({
        "title": "Phone",
        "price": 300.0,
        "category": "electronics",
        "stock": 3,
        "photo": "https://cdn.example.com/phone.png",
    });

    let (status, _) = app
        .send(Method::POST, "/api/v1/product/new", None, Some(new_product.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(Method::POST, "/api/v1/product/new", Some(&token), Some(new_product))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/v1/dashboard/stats", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/v1/user/{other_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, body) = app.get("/api/v1/user/all", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_product_update_is_visible_on_next_read() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let product = app.create_product(&admin, "Headphones", 120.0, 10).await;
    let id = product["id"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/v1/product/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["price"], 120.0);
    let (_, latest) = app.get("/api/v1/product/latest", None).await;
    assert_eq!(latest["products"][0]["price"], 120.0);
    assert!(app.state.cache.entry_count() >= 2);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/v1/product/{id}"),
            Some(&admin),
            Some(json!({ "price": 99.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&format!("/api/v1/product/{id}"), None).await;
    assert_eq!(body["product"]["price"], 99.0);
    let (_, latest) = app.get("/api/v1/product/latest", None).await;
    assert_eq!(latest["products"][0]["price"], 99.0);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/product/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/v1/product/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    let (_, latest) = app.get("/api/v1/product/latest", None).await;
    assert!(latest["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_product_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/product/new",
            Some(&admin),
            Some(json!({
                "title": "Free lunch",
                "price": 0.0,
                "category": "food",
                "stock": 1,
                "photo": "https://cdn.example.com/lunch.png",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/product/new",
            Some(&admin),
            Some(json!({ "title": "Missing fields" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_paginates() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    for (title, price) in [("Cable", 5.0), ("Charger", 25.0), ("Case", 15.0)] {
        app.create_product(&admin, title, price, 4).await;
    }

    let (status, body) = app.get("/api/v1/product/all?sort=asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_page"], 2);
    assert_eq!(body["products"][0]["price"], 5.0);
    assert_eq!(body["products"][1]["price"], 15.0);

    let (_, body) = app.get("/api/v1/product/all?sort=asc&page=2", None).await;
    assert_eq!(body["products"][0]["price"], 25.0);

    let (_, body) = app.get("/api/v1/product/categories", None).await;
    assert_eq!(body["categories"], json!(["electronics"]));
}

#[tokio::test]
async fn test_order_flow_keeps_cached_views_coherent() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (token, user_id) = app.signup("Nisha", "nisha@shop.test").await;
    let product = app.create_product(&admin, "Keyboard", 50.0, 5).await;
    let product_id = product["id"].as_str().unwrap();

    // Warm every view the order will touch
    let (_, body) = app.get(&format!("/api/v1/product/{product_id}"), None).await;
    assert_eq!(body["product"]["stock"], 5);
    let (_, mine) = app.get("/api/v1/order/my", Some(&token)).await;
    assert!(mine["orders"].as_array().unwrap().is_empty());
    let (_, stats) = app.get("/api/v1/dashboard/stats", Some(&admin)).await;
    assert_eq!(stats["stats"]["count"]["orders"], 0);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/order/new",
            Some(&token),
            Some(order_body(&product, 2)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["order"]["user_id"], user_id.as_str());
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.get(&format!("/api/v1/product/{product_id}"), None).await;
    assert_eq!(body["product"]["stock"], 3);
    let (_, mine) = app.get("/api/v1/order/my", Some(&token)).await;
    assert_eq!(mine["orders"].as_array().unwrap().len(), 1);
    let (_, stats) = app.get("/api/v1/dashboard/stats", Some(&admin)).await;
    assert_eq!(stats["stats"]["count"]["orders"], 1);

    let (_, order) = app
        .get(&format!("/api/v1/order/{order_id}"), Some(&token))
        .await;
    assert_eq!(order["order"]["status"], "Processing");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/v1/order/{order_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, order) = app
        .get(&format!("/api/v1/order/{order_id}"), Some(&token))
        .await;
    assert_eq!(order["order"]["status"], "Shipped");

    // Another shopper cannot read it
    let (other, _) = app.signup("Dev", "dev@shop.test").await;
    let (status, _) = app
        .get(&format!("/api/v1/order/{order_id}"), Some(&other))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_order_beyond_stock_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (token, _) = app.signup("Omar", "omar@shop.test").await;
    let product = app.create_product(&admin, "Monitor", 200.0, 1).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/order/new",
            Some(&token),
            Some(order_body(&product, 2)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let id = product["id"].as_str().unwrap();
    let (_, body) = app.get(&format!("/api/v1/product/{id}"), None).await;
    assert_eq!(body["product"]["stock"], 1);
}

#[tokio::test]
async fn test_coupons_and_payments() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (token, _) = app.signup("Lena", "lena@shop.test").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/payment/coupon/new",
            Some(&admin),
            Some(json!({ "coupon": "save50", "amount": 50.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get("/api/v1/payment/discount?coupon=SAVE50", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["discount"], 50.0);

    let (status, _) = app.get("/api/v1/payment/discount?coupon=NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/v1/payment/coupon/all", Some(&admin)).await;
    let coupon_id = body["coupons"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/payment/coupon/{coupon_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payment/create",
            Some(&token),
            Some(json!({ "amount": 12.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"], 1250);
    assert!(body["client_secret"].as_str().unwrap().starts_with("pi_"));
}

#[tokio::test]
async fn test_admin_cannot_delete_self_but_can_delete_others() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (user_token, user_id) = app.signup("Tara", "tara@shop.test").await;

    let (_, users) = app.get("/api/v1/user/all", Some(&admin)).await;
    let admin_id = users["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == ADMIN_EMAIL)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/user/{admin_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/user/{user_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Deleting a user ends their sessions
    let (status, _) = app.get("/api/v1/order/my", Some(&user_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
