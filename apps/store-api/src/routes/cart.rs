//! Cart mirror route handlers.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::SharedState;

/// Creates routes for cart operations.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/cart/sync", post(sync_cart))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCartItem {
    pub book_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCartRequest {
    /// Absent on a client's first sync; the server assigns one.
    pub cart_id: Option<String>,
    pub items: Vec<SyncCartItem>,
    pub coupon_code: Option<String>,
}

/// The stored mirror payload: the raw client snapshot, nothing derived.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MirrorPayload<'a> {
    items: &'a [SyncCartItem],
    coupon_code: &'a Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCartResponse {
    pub success: bool,
    pub synced: bool,
    pub cart_id: String,
}

/// Endpoint: POST /cart/sync
///
/// Best-effort by contract: a mirror that fails to persist is reported as
/// `synced: false`, never as an HTTP error - the client cart is the source
/// of truth for the session and checkout re-prices everything regardless.
async fn sync_cart(
    State(state): State<SharedState>,
    Json(payload): Json<SyncCartRequest>,
) -> Result<Json<SyncCartResponse>, ApiError> {
    let cart_id = payload
        .cart_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    debug!(cart_id = %cart_id, items = payload.items.len(), "Mirroring cart");

    let mirror = MirrorPayload {
        items: &payload.items,
        coupon_code: &payload.coupon_code,
    };
    let body = serde_json::to_string(&mirror)
        .map_err(|e| ApiError::validation(format!("Unserializable cart payload: {e}")))?;

    let synced = match state.db.cart_mirrors().upsert(&cart_id, &body).await {
        Ok(()) => true,
        Err(e) => {
            warn!(cart_id = %cart_id, error = %e, "Cart mirror write failed");
            false
        }
    };

    Ok(Json(SyncCartResponse {
        success: true,
        synced,
        cart_id,
    }))
}
