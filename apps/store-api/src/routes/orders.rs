//! Order tracking route handlers.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;

use kitab_core::{DeliveryType, OrderStatus};

use crate::error::ApiError;
use crate::state::SharedState;

/// Creates routes for order tracking.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/orders/track/{tracking_number}", get(track_order))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOrderResponse {
    pub order_number: String,
    pub tracking_number: String,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub created_at: String,
    pub items: Vec<TrackedItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub title: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Endpoint: GET /orders/track/{tracking_number}
///
/// Returns the persisted snapshot - totals exactly as they were recomputed
/// and stored at checkout.
async fn track_order(
    State(state): State<SharedState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackOrderResponse>, ApiError> {
    debug!(tracking_number = %tracking_number, "Tracking order");

    let order = state
        .db
        .orders()
        .get_by_tracking_number(&tracking_number)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &tracking_number))?;

    let items = state.db.orders().get_items(&order.id).await?;

    Ok(Json(TrackOrderResponse {
        order_number: order.order_number,
        tracking_number: order.tracking_number,
        status: order.status,
        delivery_type: order.delivery_type,
        subtotal_cents: order.subtotal_cents,
        discount_cents: order.discount_cents,
        delivery_fee_cents: order.delivery_fee_cents,
        total_cents: order.total_cents,
        created_at: order.created_at.to_rfc3339(),
        items: items
            .into_iter()
            .map(|i| TrackedItem {
                title: i.title_snapshot,
                quantity: i.quantity,
                unit_price_cents: i.unit_price_cents,
                line_total_cents: i.line_total_cents,
            })
            .collect(),
    }))
}
