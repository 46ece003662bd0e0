//! # Kitab Store API
//!
//! Library surface of the HTTP server, exposed so integration tests can
//! build the real router against an in-memory database.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::create_app_router;
pub use state::{AppState, SharedState};
