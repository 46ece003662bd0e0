//! # Coupon Evaluation
//!
//! The single shared coupon evaluator.
//!
//! ## One Function, Every Call Site
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Client "Validate" button ────┐                                        │
//! │   Cart totals recompute ───────┼──► evaluate_coupon(coupon, subtotal,   │
//! │   POST /coupons/validate ──────┤                     now)               │
//! │   POST /checkout (authority) ──┘                                        │
//! │                                                                         │
//! │   The advisory sites and the authoritative site run the SAME code,     │
//! │   so a coupon that shows a discount in the cart computes the same      │
//! │   discount at order creation - or fails loudly if the subtotal         │
//! │   changed in between.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rule Order
//! 1. Coupon must be active
//! 2. `now` must fall inside `[valid_from, valid_until]`
//! 3. Subtotal must meet the minimum purchase
//! 4. `used_count` must be strictly below `usage_limit` (when set) -
//!    a coupon at exactly its limit is rejected
//! 5. Discount amount:
//!    - percentage: `subtotal × value / 100`, capped by `max_discount_cents`
//!    - fixed: `min(value, subtotal)` - never exceeds the subtotal
//!    - free_shipping: zero discount, delivery fee zeroed downstream
//!
//! The result is always clamped into `[0, subtotal]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponRejection;
use crate::money::Money;
use crate::types::{Coupon, DiscountType};

// =============================================================================
// Coupon Benefit
// =============================================================================

/// What an applicable coupon grants against a specific subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponBenefit {
    /// Amount subtracted from the subtotal. Always in `[0, subtotal]`.
    pub discount: Money,

    /// Whether the delivery fee is zeroed.
    pub free_shipping: bool,

    /// Echo of the coupon's discount type, for display.
    pub discount_type: DiscountType,

    /// Echo of the coupon's raw value, for display.
    pub discount_value: i64,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Normalizes a coupon code for lookup and comparison.
///
/// Codes are case-insensitive and surrounding whitespace is user noise:
/// `" save10 "` and `"SAVE10"` are the same coupon.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Decides whether `coupon` applies to `subtotal` at instant `now` and
/// computes the granted benefit.
///
/// Pure: no state is read or mutated, so the advisory UI check and the
/// authoritative order recomputation cannot drift apart.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use kitab_core::coupon::evaluate_coupon;
/// use kitab_core::money::Money;
/// use kitab_core::types::{Coupon, DiscountType};
///
/// let now = Utc::now();
/// let coupon = Coupon {
///     id: "c1".into(),
///     code: "SAVE10".into(),
///     discount_type: DiscountType::Percentage,
///     discount_value: 10,
///     min_purchase_cents: Some(1500),
///     max_discount_cents: None,
///     usage_limit: None,
///     used_count: 0,
///     valid_from: now - Duration::days(1),
///     valid_until: now + Duration::days(1),
///     is_active: true,
///     created_at: now,
///     updated_at: now,
/// };
///
/// let benefit = evaluate_coupon(&coupon, Money::from_cents(2000), now).unwrap();
/// assert_eq!(benefit.discount.cents(), 200); // 10% of $20.00
/// ```
pub fn evaluate_coupon(
    coupon: &Coupon,
    subtotal: Money,
    now: DateTime<Utc>,
) -> Result<CouponBenefit, CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }

    if now < coupon.valid_from {
        return Err(CouponRejection::NotYetValid);
    }

    if coupon.valid_until < now {
        return Err(CouponRejection::Expired);
    }

    if subtotal < coupon.min_purchase() {
        return Err(CouponRejection::BelowMinimumPurchase {
            required: coupon.min_purchase(),
        });
    }

    // Boundary is the limit itself: used_count == usage_limit is exhausted.
    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(CouponRejection::UsageLimitReached);
        }
    }

    let raw_discount = match coupon.discount_type {
        DiscountType::Percentage => {
            let pct = subtotal.percentage(coupon.discount_value);
            match coupon.max_discount_cents {
                Some(cap) => pct.min(Money::from_cents(cap)),
                None => pct,
            }
        }
        DiscountType::Fixed => Money::from_cents(coupon.discount_value).min(subtotal),
        DiscountType::FreeShipping => Money::zero(),
    };

    Ok(CouponBenefit {
        discount: raw_discount.clamp(Money::zero(), subtotal),
        free_shipping: coupon.grants_free_shipping(),
        discount_type: coupon.discount_type,
        discount_value: coupon.discount_value,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
