//! HTTP route modules.

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod health;
pub mod orders;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

/// Builds the application router with all routes and middleware.
pub fn create_app_router(state: SharedState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(coupon::routes())
        .merge(cart::routes())
        .merge(checkout::routes())
        .merge(orders::routes())
        .layer(TraceLayer::new_for_http())
        // The storefront runs on a different origin in development
        .layer(CorsLayer::permissive())
        .with_state(state)
}
