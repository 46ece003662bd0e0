//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository (this module) ← Owns all SQL for one entity family        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool ← Shared connection pool                                   │
//! │                                                                         │
//! │  Handlers never write SQL; repositories never evaluate business        │
//! │  rules (that is kitab-core's job).                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod book;
pub mod cart_mirror;
pub mod coupon;
pub mod order;
