//! # Cart State
//!
//! The pure cart reducer: line items, the applied coupon, and derived totals.
//!
//! ## Purity
//! This module holds RAW state only (items, coupon, delivery choice) and
//! recomputes every derived figure on demand. Derived totals are never
//! stored, so they can never drift from the items that produce them.
//! Persistence and server sync are side effects that live in `kitab-cart`,
//! outside this crate.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Storefront Action        Mutation                 State Change         │
//! │  ─────────────────        ────────                 ────────────         │
//! │                                                                         │
//! │  Click "Add to cart" ───► add_item() ────────────► push(qty 1) or      │
//! │                                                    no-op if present     │
//! │  Quantity stepper ───────► update_quantity() ────► clamp to {0,1},     │
//! │                                                    0 removes the line   │
//! │  Click remove ───────────► remove_item() ────────► retain(≠ id)        │
//! │                                                                         │
//! │  "Apply" coupon ─────────► apply_coupon() ───────► evaluate, store      │
//! │                                                                         │
//! │  Clear ──────────────────► clear() ──────────────► items + coupon gone  │
//! │                                                                         │
//! │  Any read ───────────────► totals() ─────────────► recomputed fresh     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coupon::evaluate_coupon;
use crate::delivery::delivery_fee;
use crate::error::CouponRejection;
use crate::money::Money;
use crate::types::{Book, Coupon, DeliveryType};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Quantity Invariant
// =============================================================================

/// Clamps a requested quantity into the allowed set `{0, 1}`.
///
/// The store sells at most one copy of a title per order. Every quantity
/// that enters the cart passes through here - there is no second clamp
/// hidden in UI code.
///
/// ## Example
/// ```rust
/// use kitab_core::cart::normalize_quantity;
///
/// assert_eq!(normalize_quantity(5), 1);
/// assert_eq!(normalize_quantity(1), 1);
/// assert_eq!(normalize_quantity(0), 0);
/// assert_eq!(normalize_quantity(-3), 0);
/// ```
#[inline]
pub const fn normalize_quantity(quantity: i64) -> i64 {
    if quantity <= 0 {
        0
    } else {
        1
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line item in the cart.
///
/// ## Design Notes
/// - `book_id`: Reference to the catalog book
/// - `title`/`unit_price_cents`/`cover_image`: Frozen copies of book data at
///   time of adding, so the cart displays consistently even if the catalog
///   changes underneath. The frozen price is DISPLAY data only - checkout
///   re-prices every line from the canonical catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Book ID (UUID)
    pub book_id: String,

    /// Title at time of adding (frozen)
    pub title: String,

    /// Price in cents at time of adding (frozen, display only)
    pub unit_price_cents: i64,

    /// Cover image at time of adding (frozen)
    pub cover_image: Option<String>,

    /// Quantity in cart, always 0 or 1
    pub quantity: i64,

    /// When this item was added to cart
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a catalog book, quantity 1.
    pub fn from_book(book: &Book, added_at: DateTime<Utc>) -> Self {
        CartItem {
            book_id: book.id.clone(),
            title: book.title.clone(),
            unit_price_cents: book.price_cents,
            cover_image: book.cover_image.clone(),
            quantity: 1,
            added_at,
        }
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart: raw state only.
///
/// ## Invariants (hold after every mutation)
/// - Items are unique by `book_id`; adding a present book is a no-op
/// - Every quantity is in `{0, 1}` via [`normalize_quantity`]; quantity 0 is
///   delete-intent and removes the line immediately
/// - `subtotal = Σ(unit_price × quantity)`
/// - `discount = evaluate_coupon(subtotal, coupon)`, clamped to `[0, subtotal]`
/// - `delivery_fee = 0` when the coupon grants free shipping
/// - `total = subtotal − discount + delivery_fee`, never negative
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Items in the cart
    pub items: Vec<CartItem>,

    /// Applied coupon, if any. Stored whole so totals can re-evaluate it
    /// against the current subtotal on every read.
    pub coupon: Option<Coupon>,

    /// Delivery method selected for fee preview
    pub delivery_type: DeliveryType,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            coupon: None,
            delivery_type: DeliveryType::default(),
            created_at: Utc::now(),
        }
    }

    /// Adds a book to the cart with quantity 1.
    ///
    /// ## Behavior
    /// - Book already in cart: no-op (one copy per title)
    /// - Cart at capacity: no-op
    ///
    /// ## Returns
    /// `true` if a line was added, `false` on either no-op.
    pub fn add_item(&mut self, book: &Book) -> bool {
        if self.items.iter().any(|i| i.book_id == book.id) {
            return false;
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return false;
        }

        self.items.push(CartItem::from_book(book, Utc::now()));
        true
    }

    /// Removes an item from the cart by book ID.
    ///
    /// ## Returns
    /// `true` if a line was removed.
    pub fn remove_item(&mut self, book_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.book_id != book_id);
        self.items.len() != initial_len
    }

    /// Updates the quantity of an item in the cart.
    ///
    /// ## Behavior
    /// - Negative quantity: no-op
    /// - Quantity 0: removes the line (delete-intent is delete; a retained
    ///   zero-quantity line would still show up in the item list)
    /// - Anything positive: clamped to 1
    ///
    /// ## Returns
    /// `true` if the cart changed.
    pub fn update_quantity(&mut self, book_id: &str, quantity: i64) -> bool {
        if quantity < 0 {
            return false;
        }

        let quantity = normalize_quantity(quantity);
        if quantity == 0 {
            return self.remove_item(book_id);
        }

        match self.items.iter_mut().find(|i| i.book_id == book_id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Selects the delivery method used for the fee preview.
    pub fn set_delivery_type(&mut self, delivery_type: DeliveryType) {
        self.delivery_type = delivery_type;
    }

    /// Applies a coupon after evaluating it against the CURRENT subtotal.
    ///
    /// Validation normally happened upstream (the validate endpoint), but the
    /// cart may have changed since - re-running the shared evaluator here
    /// catches a coupon that no longer meets its minimum purchase. On
    /// rejection the coupon is not stored.
    pub fn apply_coupon(
        &mut self,
        coupon: Coupon,
        now: DateTime<Utc>,
    ) -> Result<crate::coupon::CouponBenefit, CouponRejection> {
        let benefit = evaluate_coupon(&coupon, self.subtotal(), now)?;
        self.coupon = Some(coupon);
        Ok(benefit)
    }

    /// Clears the applied coupon. Returns the removed coupon, if any.
    pub fn remove_coupon(&mut self) -> Option<Coupon> {
        self.coupon.take()
    }

    /// Clears all items and the coupon.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon = None;
        self.created_at = Utc::now();
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all lines. With the one-per-book rule this
    /// equals the number of lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Calculates the subtotal (before discount and delivery).
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.items.iter().map(|i| i.line_total_cents()).sum())
    }

    /// Recomputes every derived figure from raw state.
    ///
    /// A stored coupon that is no longer eligible (expired while the tab was
    /// open, subtotal dropped below its minimum) contributes zero discount
    /// but STAYS attached: checkout re-validation will then reject loudly
    /// with the reason instead of the discount silently vanishing.
    pub fn totals(&self, now: DateTime<Utc>) -> CartTotals {
        let subtotal = self.subtotal();

        let (discount, free_shipping) = match &self.coupon {
            Some(coupon) => match evaluate_coupon(coupon, subtotal, now) {
                Ok(benefit) => (benefit.discount, benefit.free_shipping),
                Err(_) => (Money::zero(), false),
            },
            None => (Money::zero(), false),
        };

        let fee = if free_shipping {
            Money::zero()
        } else {
            delivery_fee(self.delivery_type)
        };

        let total = (subtotal - discount + fee).max(Money::zero());

        CartTotals {
            item_count: self.item_count(),
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
            delivery_fee_cents: fee.cents(),
            total_cents: total.cents(),
            free_shipping,
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived cart figures for API responses and UI display.
/// Never persisted - always recomputed from raw state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub free_shipping: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
