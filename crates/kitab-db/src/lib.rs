//! # kitab-db: Database Layer for Kitab Commerce
//!
//! This crate provides database access for the Kitab Commerce backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Kitab Commerce Data Flow                           │
//! │                                                                         │
//! │  HTTP Handler (POST /checkout)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kitab-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (book, coupon │    │  (embedded)  │  │   │
//! │  │   │               │    │  order, cart  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  mirror)      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │               │    │              │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (book, coupon, order, cart mirror)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kitab_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/kitab.db")).await?;
//!
//! let books = db.books().get_by_ids(&ids).await?;
//! let coupon = db.coupons().get_by_code("SAVE10").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::book::BookRepository;
pub use repository::cart_mirror::CartMirrorRepository;
pub use repository::coupon::CouponRepository;
pub use repository::order::OrderRepository;
