use crate::api::{
    ApiError, CategoriesResponse, MessageResponse, ProductResponse, ProductsResponse,
    SearchResponse, json_body,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use bazaar::domain::{NewProduct, ProductQuery, ProductUpdate};

/// GET /product/latest
pub async fn latest_products(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = state.products.latest_products().await?;
    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

/// GET /product/categories
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.products.categories().await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// GET /product/admin-products
pub async fn admin_products(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = state.products.admin_products().await?;
    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

/// GET /product/all?search=&category=&price=&sort=&page=
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = state.products.search(&query).await?;
    Ok(Json(SearchResponse {
        success: true,
        products: page.products,
        total_page: page.total_pages,
    }))
}

/// GET /product/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.products.product(&id).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// POST /product/new
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state.products.create(json_body(body)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product,
        }),
    ))
}

/// PUT /product/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.products.update(&id, json_body(body)?).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// DELETE /product/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let product = state.products.delete(&id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Product {} deleted successfully",
        product.title
    ))))
}
