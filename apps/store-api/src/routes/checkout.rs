//! Checkout route handler: the authoritative order path.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /checkout                                                         │
//! │                                                                         │
//! │  1. Field validation          → 400 with one entry per bad field        │
//! │  2. Empty cart check          → 400                                     │
//! │  3. Canonical price resolve   → 409 with ALL unresolvable ids           │
//! │  4. Coupon lookup + evaluate  → 422 with the reason (whole order        │
//! │     against the FRESH subtotal  fails; the discount never silently      │
//! │                                 disappears)                             │
//! │  5. price_order()             → the only totals that get persisted      │
//! │  6. Transactional insert      → order + items + coupon increment,       │
//! │                                 all-or-nothing                          │
//! │                                                                         │
//! │  Client-submitted prices never enter: the request carries              │
//! │  {bookId, quantity} and a coupon CODE, nothing else.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use kitab_core::coupon::normalize_code;
use kitab_core::validation::{
    validate_address, validate_city, validate_customer_name, validate_email,
    validate_line_quantity, validate_phone,
};
use kitab_core::{
    price_order, Coupon, CouponRejection, DeliveryType, Order, OrderItem, OrderLine, OrderStatus,
    ValidationError,
};
use kitab_db::repository::order::{generate_order_id, generate_order_number, generate_tracking_number};

use crate::error::ApiError;
use crate::state::SharedState;

/// Creates routes for checkout.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/checkout", post(checkout))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub delivery_type: DeliveryType,
    pub coupon_code: Option<String>,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: CheckoutOrder,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub order_number: String,
    pub tracking_number: String,
}

/// Endpoint: POST /checkout
async fn checkout(
    State(state): State<SharedState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    debug!(items = payload.items.len(), "Checkout requested");

    // 1. Contact/address fields, collected so the form can show them all.
    //    Runs before any pricing work.
    let field_errors = validate_fields(&payload);
    if !field_errors.is_empty() {
        return Err(ApiError::fields(field_errors));
    }

    if payload.items.is_empty() {
        return Err(ApiError::validation("Cart is empty"));
    }

    // 2. Canonical catalog slice for the referenced ids. price_order()
    //    reports every id that did not resolve.
    let ids: Vec<String> = payload.items.iter().map(|l| l.book_id.clone()).collect();
    let catalog = state.db.books().get_by_ids(&ids).await?;

    // 3. Coupon: a submitted code that doesn't exist rejects the order
    //    outright, same as an ineligible one.
    let coupon = resolve_coupon(&state, &payload.coupon_code).await?;

    // 4. Authoritative totals from canonical data only.
    let now = Utc::now();
    let quote = price_order(
        &payload.items,
        &catalog,
        coupon.as_ref(),
        payload.delivery_type,
        now,
    )?;

    // 5. Persist the snapshot; the coupon redemption is consumed inside the
    //    same transaction.
    let order_id = generate_order_id();
    let order = Order {
        id: order_id.clone(),
        order_number: generate_order_number(),
        tracking_number: generate_tracking_number(),
        status: OrderStatus::Pending,
        customer_name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        address: payload.address.trim().to_string(),
        city: payload.city.trim().to_string(),
        delivery_type: payload.delivery_type,
        coupon_code: coupon.as_ref().map(|c| c.code.clone()),
        subtotal_cents: quote.subtotal.cents(),
        discount_cents: quote.discount.cents(),
        delivery_fee_cents: quote.delivery_fee.cents(),
        total_cents: quote.total.cents(),
        created_at: now,
        updated_at: now,
    };

    let items: Vec<OrderItem> = quote
        .lines
        .iter()
        .map(|line| OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            book_id: line.book_id.clone(),
            title_snapshot: line.title.clone(),
            unit_price_cents: line.unit_price_cents,
            quantity: line.quantity,
            line_total_cents: line.line_total_cents,
            created_at: now,
        })
        .collect();

    state
        .db
        .orders()
        .create_order(&order, &items, coupon.as_ref().map(|c| c.id.as_str()))
        .await?;

    info!(
        order_number = %order.order_number,
        total_cents = order.total_cents,
        "Checkout complete"
    );

    Ok(Json(CheckoutResponse {
        success: true,
        order: CheckoutOrder {
            order_number: order.order_number,
            tracking_number: order.tracking_number,
        },
    }))
}

/// Runs every field rule and collects the failures.
fn validate_fields(payload: &CheckoutRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let checks = [
        validate_customer_name(&payload.name),
        validate_email(&payload.email),
        validate_phone(&payload.phone),
        validate_address(&payload.address),
        validate_city(&payload.city),
    ];
    for check in checks {
        if let Err(e) = check {
            errors.push(e);
        }
    }

    // Negative quantities would subtract from the subtotal; one error covers
    // the lot.
    if let Some(e) = payload
        .items
        .iter()
        .find_map(|line| validate_line_quantity(line.quantity).err())
    {
        errors.push(e);
    }

    errors
}

/// Resolves an optional coupon code to its row, treating an unknown code as
/// a rejection of the whole order.
async fn resolve_coupon(
    state: &SharedState,
    coupon_code: &Option<String>,
) -> Result<Option<Coupon>, ApiError> {
    let code = match coupon_code {
        Some(code) if !normalize_code(code).is_empty() => code,
        _ => return Ok(None),
    };

    match state.db.coupons().get_by_code(code).await? {
        Some(coupon) => Ok(Some(coupon)),
        None => Err(CouponRejection::UnknownCode.into()),
    }
}
