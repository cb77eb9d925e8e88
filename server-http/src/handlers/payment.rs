use crate::api::{
    ApiError, CouponsResponse, DiscountQuery, DiscountResponse, MessageResponse,
    NewCouponRequest, PaymentIntentRequest, PaymentIntentResponse, json_body,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

/// POST /payment/create
pub async fn create_payment_intent(
    State(state): State<AppState>,
    body: Result<Json<PaymentIntentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentIntentResponse>), ApiError> {
    let request = json_body(body)?;
    let intent = state.payments.create_payment_intent(request.amount).await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentIntentResponse {
            success: true,
            client_secret: intent.client_secret,
            amount: intent.amount,
            currency: intent.currency,
        }),
    ))
}

/// POST /payment/coupon/new
pub async fn new_coupon(
    State(state): State<AppState>,
    body: Result<Json<NewCouponRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request = json_body(body)?;
    let coupon = state
        .payments
        .new_coupon(&request.coupon, request.amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Coupon {} created successfully",
            coupon.code
        ))),
    ))
}

/// GET /payment/discount?coupon=
pub async fn apply_discount(
    State(state): State<AppState>,
    Query(query): Query<DiscountQuery>,
) -> Result<Json<DiscountResponse>, ApiError> {
    let discount = state.payments.apply_discount(&query.coupon).await?;
    Ok(Json(DiscountResponse {
        success: true,
        discount,
    }))
}

/// GET /payment/coupon/all
pub async fn all_coupons(State(state): State<AppState>) -> Result<Json<CouponsResponse>, ApiError> {
    let coupons = state.payments.all_coupons().await?;
    Ok(Json(CouponsResponse {
        success: true,
        coupons,
    }))
}

/// DELETE /payment/coupon/{id}
pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let coupon = state.payments.delete_coupon(&id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Coupon {} deleted successfully",
        coupon.code
    ))))
}
