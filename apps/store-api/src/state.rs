//! Shared application state for HTTP handlers.

use std::sync::Arc;

use kitab_db::Database;

/// Shared application state.
///
/// Handlers receive this through axum's `State` extractor and reach the
/// repositories through `state.db`.
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// The state handle cloned into every handler.
pub type SharedState = Arc<AppState>;
