//! Coupon route handlers.
//!
//! The validate endpoint is ADVISORY: it answers "would this coupon apply to
//! this subtotal right now". Checkout re-runs the same evaluator against the
//! fresh server-side subtotal, so nothing decided here is trusted later.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use kitab_core::coupon::evaluate_coupon;
use kitab_core::{CouponRejection, DiscountType, Money};

use crate::error::ApiError;
use crate::state::SharedState;

/// Creates routes for coupon operations.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/coupons/validate", post(validate_coupon))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub code: String,
    pub subtotal_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidateCouponResponse {
    fn invalid(message: String) -> Self {
        ValidateCouponResponse {
            valid: false,
            discount_type: None,
            discount_value: None,
            discount_cents: None,
            free_shipping: None,
            message: Some(message),
        }
    }
}

/// Endpoint: POST /coupons/validate
///
/// Ineligible coupons are a normal answer, not an HTTP error: the response
/// is always 200 with `valid: false` and the reason.
async fn validate_coupon(
    State(state): State<SharedState>,
    Json(payload): Json<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>, ApiError> {
    debug!(code = %payload.code, subtotal = payload.subtotal_cents, "Validating coupon");

    let coupon = match state.db.coupons().get_by_code(&payload.code).await? {
        Some(coupon) => coupon,
        None => {
            return Ok(Json(ValidateCouponResponse::invalid(
                CouponRejection::UnknownCode.to_string(),
            )))
        }
    };

    let subtotal = Money::from_cents(payload.subtotal_cents);
    match evaluate_coupon(&coupon, subtotal, Utc::now()) {
        Ok(benefit) => Ok(Json(ValidateCouponResponse {
            valid: true,
            discount_type: Some(benefit.discount_type),
            discount_value: Some(benefit.discount_value),
            discount_cents: Some(benefit.discount.cents()),
            free_shipping: Some(benefit.free_shipping),
            message: None,
        })),
        Err(rejection) => Ok(Json(ValidateCouponResponse::invalid(rejection.to_string()))),
    }
}
