//! # Error Types
//!
//! Domain-specific error types for kitab-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kitab-core errors (this file)                                         │
//! │  ├── ValidationError  - Checkout input failures (per field)            │
//! │  ├── CouponRejection  - Why a coupon does not apply                    │
//! │  └── PricingError     - Why an order cannot be priced                  │
//! │                                                                         │
//! │  kitab-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  store-api errors (in app)                                             │
//! │  └── ApiError         - What the storefront sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError / CouponRejection / PricingError                │
//! │          → ApiError → HTTP status + JSON body                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, ids, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a user-facing message; coupon and validation
//!    errors are returned as values so callers can render them inline

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when checkout input doesn't meet requirements and are
/// rejected before any pricing work runs. The API layer collects one per
/// offending field so the form can highlight them all at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email or phone).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },
}

impl ValidationError {
    /// The name of the field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::MustBeNonNegative { field } => field,
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Coupon Rejection
// =============================================================================

/// Why a coupon does not apply.
///
/// Returned as a value by [`crate::coupon::evaluate_coupon`] so both the
/// advisory check and the authoritative checkout can surface the same
/// human-readable reason. The whole order is rejected when checkout hits one
/// of these - a displayed discount must never silently vanish.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    /// No coupon with this code exists. Produced by callers after a failed
    /// lookup; kept here so the message exists in exactly one place.
    #[error("Invalid coupon code")]
    UnknownCode,

    /// The coupon has been disabled by an administrator.
    #[error("This coupon is no longer active")]
    Inactive,

    /// The validity window has not opened yet.
    #[error("This coupon is not valid yet")]
    NotYetValid,

    /// `valid_until` is in the past.
    #[error("This coupon has expired")]
    Expired,

    /// The subtotal is below the coupon's minimum purchase.
    #[error("A minimum purchase of {required} is needed to use this coupon")]
    BelowMinimumPurchase { required: Money },

    /// `used_count` has reached `usage_limit`.
    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Why an order cannot be priced.
///
/// Produced by [`crate::pricing::price_order`]; order creation aborts on any
/// of these - partial orders are never created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The submitted order has no line items.
    #[error("Cart is empty")]
    EmptyOrder,

    /// One or more books could not be resolved to a canonical price
    /// (deleted or inactive). ALL offending ids are reported so the client
    /// can prune its cart and retry, rather than silently dropping lines.
    #[error("Books unavailable: {}", ids.join(", "))]
    BooksUnavailable { ids: Vec<String> },

    /// The supplied coupon was rejected against the fresh subtotal.
    #[error(transparent)]
    Coupon(#[from] CouponRejection),
}

// =============================================================================
// Unit Tests
// =============================================================================
