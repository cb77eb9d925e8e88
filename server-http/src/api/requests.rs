use super::error::ApiError;
use axum::{Json, extract::rejection::JsonRejection};
use serde::Deserialize;

/// Unwrap a JSON body, reporting malformed input as a 400 in the error envelope
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Login body; the same credentials may arrive as HTTP Basic instead
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewCouponRequest {
    pub coupon: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct DiscountQuery {
    #[serde(default)]
    pub coupon: String,
}
