//! # kitab-core: Pure Business Logic for Kitab Commerce
//!
//! This crate is the **heart** of the bookstore backend. It contains all
//! pricing and coupon logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Kitab Commerce Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront (browser)                           │   │
//! │  │    Catalog ──► Cart UI ──► Checkout Form ──► Order Tracking    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    store-api (axum)                             │   │
//! │  │    /coupons/validate, /checkout, /cart/sync, /orders/track     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kitab-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  coupon   │  │   │
//! │  │   │   Book    │  │   Money   │  │   Cart    │  │ evaluate  │  │   │
//! │  │   │  Coupon   │  │  percent  │  │ CartItem  │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │  pricing  │  │ delivery  │  │ validation│                 │   │
//! │  │   │OrderQuote │  │ fee table │  │   rules   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kitab-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Coupon, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Pure cart state and derived totals
//! - [`coupon`] - The single shared coupon evaluator
//! - [`pricing`] - Authoritative order-total calculator
//! - [`delivery`] - Flat delivery-fee table
//! - [`validation`] - Checkout input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **One Evaluator**: Coupon rules exist exactly once; the advisory client
//!    check and the authoritative checkout recomputation call the same code
//! 5. **No Clock Reads**: `now` is always a parameter, never `Utc::now()` inside
//!    the engine, so validity-window logic is testable at any instant
//!
//! ## Example Usage
//!
//! ```rust
//! use kitab_core::money::Money;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(2000); // $20.00
//!
//! // 10% of $20.00
//! let discount = price.percentage(10);
//! assert_eq!(discount.cents(), 200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod coupon;
pub mod delivery;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kitab_core::Money` instead of
// `use kitab_core::money::Money`

pub use cart::{normalize_quantity, Cart, CartItem, CartTotals};
pub use coupon::{evaluate_coupon, CouponBenefit};
pub use error::{CouponRejection, PricingError, ValidationError};
pub use money::Money;
pub use pricing::{price_order, OrderLine, OrderQuote, PricedLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct books allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable order sizes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single book per order
///
/// ## Business Reason
/// The store sells at most one copy of a title per order; adding a book that
/// is already in the cart is a no-op rather than a quantity bump. Every
/// quantity that enters the cart passes through
/// [`cart::normalize_quantity`], which clamps into `{0, 1}`.
pub const MAX_QUANTITY_PER_BOOK: i64 = 1;
