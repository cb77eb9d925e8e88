use crate::api::{ApiError, MessageResponse, OrderResponse, OrdersResponse, json_body};
use crate::middleware::ensure_self_or_admin;
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use bazaar::auth::User;
use bazaar::domain::NewOrder;

/// POST /order/new
///
/// Orders are placed for the caller. Admins may name another user.
pub async fn new_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let mut input = json_body(body)?;
    if !user.is_admin() || input.user_id.is_none() {
        input.user_id = Some(user.id);
    }

    let order = state.orders.place(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order,
        }),
    ))
}

/// GET /order/my
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.orders.my_orders(&user.id).await?;
    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// GET /order/all
pub async fn all_orders(State(state): State<AppState>) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.orders.all_orders().await?;
    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// GET /order/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.order(&id).await?;
    ensure_self_or_admin(&user, &order.user_id)?;

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// PUT /order/{id}
pub async fn process_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.process(&id).await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// DELETE /order/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order = state.orders.delete(&id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Order {} deleted successfully",
        order.id
    ))))
}
