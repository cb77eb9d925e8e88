use crate::domain::{Coupon, PaymentIntent};
use crate::ports::{CouponRepository, PaymentGateway};
use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Gateway that mints intents locally instead of calling a card processor
#[derive(Debug, Default, Clone)]
pub struct LocalPaymentGateway;

#[async_trait]
impl PaymentGateway for LocalPaymentGateway {
    async fn create_intent(&self, amount_minor: u64, currency: &str) -> Result<PaymentIntent> {
        let id = format!("pi_{}", Uuid::new_v4().simple());
        let client_secret = format!("{}_secret_{}", id, Uuid::new_v4().simple());

        Ok(PaymentIntent {
            id,
            client_secret,
            amount: amount_minor,
            currency: currency.to_string(),
        })
    }
}

/// Payment intents and discount coupons. Nothing here is cached.
pub struct PaymentService {
    coupons: Arc<dyn CouponRepository>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentService {
    pub fn new(
        coupons: Arc<dyn CouponRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            coupons,
            gateway,
            currency: currency.into(),
        }
    }

    pub async fn create_payment_intent(&self, amount: f64) -> Result<PaymentIntent> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::validation("please enter a valid amount"));
        }

        let amount_minor = (amount * 100.0).round() as u64;
        self.gateway
            .create_intent(amount_minor, &self.currency)
            .await
            .map_err(|e| match e {
                Error::Payment(_) => e,
                other => Error::Payment(other.to_string()),
            })
    }

    pub async fn new_coupon(&self, code: &str, amount: f64) -> Result<Coupon> {
        if code.trim().is_empty() {
            return Err(Error::validation("coupon code is required"));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::validation("coupon amount must be greater than zero"));
        }

        let coupon = self.coupons.create(Coupon::new(code, amount)).await?;
        info!("NEW_COUPON: {} worth {}", coupon.code, coupon.amount);
        Ok(coupon)
    }

    /// Discount amount for a coupon code, matched case-insensitively
    pub async fn apply_discount(&self, code: &str) -> Result<f64> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(Error::validation("coupon code is required"));
        }

        self.coupons
            .find_by_code(&code)
            .await?
            .map(|coupon| coupon.amount)
            .ok_or_else(|| Error::not_found("coupon"))
    }

    pub async fn all_coupons(&self) -> Result<Vec<Coupon>> {
        let mut coupons = self.coupons.list_all().await?;
        coupons.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(coupons)
    }

    pub async fn delete_coupon(&self, id: &str) -> Result<Coupon> {
        let coupon = self
            .coupons
            .delete(id)
            .await?
            .ok_or_else(|| Error::not_found("coupon"))?;

        info!("DELETE_COUPON: {}", coupon.code);
        Ok(coupon)
    }
}
