//! # Domain Types
//!
//! Core domain types used throughout Kitab Commerce.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │     Coupon      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  title          │   │  code (business)│   │  order_number   │       │
//! │  │  price_cents    │   │  discount_type  │   │  tracking_number│       │
//! │  │  is_active      │   │  valid window   │   │  totals snapshot│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountType   │   │  DeliveryType   │   │  OrderStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Percentage     │   │  Home           │   │  Pending        │       │
//! │  │  Fixed          │   │  Office         │   │  Confirmed      │       │
//! │  │  FreeShipping   │   └─────────────────┘   │  Shipped        │       │
//! │  └─────────────────┘                         │  Delivered      │       │
//! │                                              │  Cancelled      │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (coupon code, order number, tracking number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Book
// =============================================================================

/// A book available in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Book {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display title shown in the catalog and on order lines.
    pub title: String,

    /// Author name, if recorded.
    pub author: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cover image URL.
    pub cover_image: Option<String>,

    /// Whether the book is purchasable (soft delete).
    pub is_active: bool,

    /// When the book was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the book was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Returns the canonical price as a Money type.
    ///
    /// ## Note
    /// This is the ONLY price an order may be priced from. Prices submitted
    /// by a client are never read.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the subtotal (e.g. 10 = 10%).
    Percentage,
    /// `discount_value` is an absolute amount in cents.
    Fixed,
    /// No subtotal discount; the delivery fee is zeroed instead.
    FreeShipping,
}

// =============================================================================
// Coupon
// =============================================================================

/// A named discount rule with eligibility constraints.
///
/// ## Applicability
/// A coupon applies to a subtotal only if it is active, `now` falls inside
/// `[valid_from, valid_until]`, `used_count < usage_limit` (when a limit is
/// set), and the subtotal meets `min_purchase_cents`. The rules live in
/// [`crate::coupon::evaluate_coupon`] - this struct is plain data.
///
/// ## Lifecycle
/// Created and edited by an administrator. `used_count` is incremented
/// exactly once per completed order, atomically, inside the order-creation
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,

    /// Business identifier, stored and compared uppercased.
    pub code: String,

    pub discount_type: DiscountType,

    /// Percent for [`DiscountType::Percentage`], cents for
    /// [`DiscountType::Fixed`], ignored for free shipping.
    pub discount_value: i64,

    /// Minimum subtotal (cents) required for the coupon to apply.
    pub min_purchase_cents: Option<i64>,

    /// Upper bound (cents) on a percentage discount.
    pub max_discount_cents: Option<i64>,

    /// Maximum number of redemptions. Unset means unlimited.
    pub usage_limit: Option<i64>,

    /// Redemptions so far.
    pub used_count: i64,

    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,

    #[ts(as = "String")]
    pub valid_until: DateTime<Utc>,

    /// Whether the coupon is enabled (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Returns the minimum purchase as Money (zero when unset).
    #[inline]
    pub fn min_purchase(&self) -> Money {
        Money::from_cents(self.min_purchase_cents.unwrap_or(0))
    }

    /// Whether this coupon zeroes the delivery fee.
    #[inline]
    pub fn grants_free_shipping(&self) -> bool {
        self.discount_type == DiscountType::FreeShipping
    }
}

// =============================================================================
// Delivery Type
// =============================================================================

/// The delivery method chosen at checkout.
///
/// The fee for each method is a flat lookup in [`crate::delivery`],
/// independent of destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// Courier to the customer's address.
    Home,
    /// Pickup at a relay office.
    Office,
}

impl Default for DeliveryType {
    fn default() -> Self {
        DeliveryType::Home
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, awaiting confirmation.
    Pending,
    /// Confirmed by the store.
    Confirmed,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order: the authoritative snapshot of cart + coupon + delivery
/// at the moment of purchase, re-derived server-side from canonical prices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub tracking_number: String,
    pub status: OrderStatus,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub delivery_type: DeliveryType,
    /// Coupon code applied at purchase, if any (frozen).
    pub coupon_code: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze book data at time of purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub book_id: String,
    /// Title at time of purchase (frozen).
    pub title_snapshot: String,
    /// Unit price in cents at time of purchase (frozen, canonical).
    pub unit_price_cents: i64,
    /// Quantity purchased.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
