//! # Order Pricing
//!
//! The authoritative order-total calculator.
//!
//! ## Tamper Resistance By Construction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Client submits:      {book_id, quantity} lines + coupon code           │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  Server resolves:     canonical Book rows from the catalog              │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  price_order():       subtotal from CANONICAL prices                    │
//! │                       coupon re-evaluated against the FRESH subtotal    │
//! │                       delivery fee from the flat table                  │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  OrderQuote:          the only numbers that ever reach the database     │
//! │                                                                         │
//! │  A client-submitted price has nowhere to enter: OrderLine carries no    │
//! │  price field.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Rules
//! - Empty line list: rejected (no empty orders)
//! - Any unresolvable book id: rejected, with ALL offending ids listed
//! - Coupon rejection: rejected - the whole order fails rather than the
//!   discount silently disappearing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coupon::evaluate_coupon;
use crate::delivery::delivery_fee;
use crate::error::PricingError;
use crate::money::Money;
use crate::types::{Book, Coupon, DeliveryType};

// =============================================================================
// Input / Output Types
// =============================================================================

/// A raw order line as submitted by a client: a book reference and a
/// quantity, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub book_id: String,
    pub quantity: i64,
}

/// An order line after canonical resolution.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub book_id: String,
    /// Title frozen from the catalog at pricing time.
    pub title: String,
    /// Canonical unit price in cents at pricing time.
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// The trusted totals for an order, derived entirely from canonical data.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuote {
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub free_shipping: bool,
}

// =============================================================================
// Calculator
// =============================================================================

/// Prices an order from raw lines and the canonical catalog slice.
///
/// `catalog` is whatever the caller fetched for the referenced ids; any line
/// whose book is absent from it (or inactive) makes the whole order fail
/// with the complete list of offending ids.
///
/// Quantities are summed exactly as given. The one-copy-per-book rule is a
/// cart-side invariant; this calculator does not assume it.
pub fn price_order(
    lines: &[OrderLine],
    catalog: &[Book],
    coupon: Option<&Coupon>,
    delivery_type: DeliveryType,
    now: DateTime<Utc>,
) -> Result<OrderQuote, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyOrder);
    }

    let mut missing: Vec<String> = Vec::new();
    let mut priced: Vec<PricedLine> = Vec::with_capacity(lines.len());

    for line in lines {
        match catalog
            .iter()
            .find(|b| b.id == line.book_id && b.is_active)
        {
            Some(book) => {
                let line_total = book.price().multiply_quantity(line.quantity);
                priced.push(PricedLine {
                    book_id: book.id.clone(),
                    title: book.title.clone(),
                    unit_price_cents: book.price_cents,
                    quantity: line.quantity,
                    line_total_cents: line_total.cents(),
                });
            }
            None => {
                if !missing.contains(&line.book_id) {
                    missing.push(line.book_id.clone());
                }
            }
        }
    }

    if !missing.is_empty() {
        return Err(PricingError::BooksUnavailable { ids: missing });
    }

    let subtotal = Money::from_cents(priced.iter().map(|l| l.line_total_cents).sum());

    let (discount, free_shipping) = match coupon {
        Some(coupon) => {
            let benefit = evaluate_coupon(coupon, subtotal, now)?;
            (benefit.discount, benefit.free_shipping)
        }
        None => (Money::zero(), false),
    };

    let fee = if free_shipping {
        Money::zero()
    } else {
        delivery_fee(delivery_type)
    };

    let total = (subtotal - discount + fee).max(Money::zero());

    Ok(OrderQuote {
        lines: priced,
        subtotal,
        discount,
        delivery_fee: fee,
        total,
        free_shipping,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::HOME_DELIVERY_FEE_CENTS;
    use crate::error::CouponRejection;
    use crate::types::DiscountType;
    use chrono::Duration;

    fn test_book(id: &str, price_cents: i64) -> Book {
        let now = Utc::now();
        Book {
            id: id.to_string(),
            title: format!("Book {}", id),
            author: None,
            price_cents,
            cover_image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_coupon(discount_type: DiscountType, value: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "c1".to_string(),
            code: "TEST".to_string(),
            discount_type,
            discount_value: value,
            min_purchase_cents: None,
            max_discount_cents: None,
            usage_limit: None,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(book_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            book_id: book_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_prices_come_from_catalog_only() {
        // OrderLine has no price field; the quote uses the canonical price
        // whatever the client believed the price was.
        let catalog = [test_book("a", 2000)];
        let quote = price_order(
            &[line("a", 1)],
            &catalog,
            None,
            DeliveryType::Home,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(quote.subtotal.cents(), 2000);
        assert_eq!(quote.lines[0].unit_price_cents, 2000);
        assert_eq!(
            quote.total.cents(),
            2000 + HOME_DELIVERY_FEE_CENTS
        );
    }

    #[test]
    fn test_empty_order_rejected() {
        let result = price_order(&[], &[], None, DeliveryType::Home, Utc::now());
        assert_eq!(result.unwrap_err(), PricingError::EmptyOrder);
    }

    #[test]
    fn test_all_missing_ids_reported() {
        let catalog = [test_book("a", 2000)];
        let result = price_order(
            &[line("a", 1), line("ghost-1", 1), line("ghost-2", 1)],
            &catalog,
            None,
            DeliveryType::Home,
            Utc::now(),
        );

        assert_eq!(
            result.unwrap_err(),
            PricingError::BooksUnavailable {
                ids: vec!["ghost-1".to_string(), "ghost-2".to_string()]
            }
        );
    }

    #[test]
    fn test_inactive_book_counts_as_unavailable() {
        let mut book = test_book("a", 2000);
        book.is_active = false;
        let result = price_order(
            &[line("a", 1)],
            &[book],
            None,
            DeliveryType::Home,
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(PricingError::BooksUnavailable { .. })
        ));
    }

    #[test]
    fn test_quantities_summed_as_given() {
        // The calculator does not assume the 0/1 cart invariant.
        let catalog = [test_book("a", 1000)];
        let quote = price_order(
            &[line("a", 3)],
            &catalog,
            None,
            DeliveryType::Office,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(quote.subtotal.cents(), 3000);
    }

    #[test]
    fn test_coupon_applied_against_fresh_subtotal() {
        let catalog = [test_book("a", 2000)];
        let coupon = test_coupon(DiscountType::Percentage, 10);
        let quote = price_order(
            &[line("a", 1)],
            &catalog,
            Some(&coupon),
            DeliveryType::Home,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(quote.discount.cents(), 200);
        assert_eq!(
            quote.total.cents(),
            2000 - 200 + HOME_DELIVERY_FEE_CENTS
        );
    }

    #[test]
    fn test_exhausted_coupon_rejects_whole_order() {
        let catalog = [test_book("a", 2000)];
        let mut coupon = test_coupon(DiscountType::Percentage, 10);
        coupon.usage_limit = Some(1);
        coupon.used_count = 1;

        let result = price_order(
            &[line("a", 1)],
            &catalog,
            Some(&coupon),
            DeliveryType::Home,
            Utc::now(),
        );
        assert_eq!(
            result.unwrap_err(),
            PricingError::Coupon(CouponRejection::UsageLimitReached)
        );
    }

    #[test]
    fn test_free_shipping_zeroes_delivery_fee() {
        let catalog = [test_book("a", 2000)];
        let coupon = test_coupon(DiscountType::FreeShipping, 0);
        let quote = price_order(
            &[line("a", 1)],
            &catalog,
            Some(&coupon),
            DeliveryType::Home,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(quote.discount, Money::zero());
        assert_eq!(quote.delivery_fee, Money::zero());
        assert_eq!(quote.total.cents(), 2000);
        assert!(quote.free_shipping);
    }

    #[test]
    fn test_total_never_negative() {
        let catalog = [test_book("a", 100)];
        let coupon = test_coupon(DiscountType::Fixed, 1_000_000);
        let quote = price_order(
            &[line("a", 1)],
            &catalog,
            Some(&coupon),
            DeliveryType::Office,
            Utc::now(),
        )
        .unwrap();

        assert!(quote.total >= Money::zero());
        assert!(quote.discount <= quote.subtotal);
    }

    #[test]
    fn test_subtotal_order_independent() {
        let catalog = [
            test_book("a", 1250),
            test_book("b", 999),
            test_book("c", 3600),
        ];
        let forward = price_order(
            &[line("a", 1), line("b", 1), line("c", 1)],
            &catalog,
            None,
            DeliveryType::Home,
            Utc::now(),
        )
        .unwrap();
        let reverse = price_order(
            &[line("c", 1), line("b", 1), line("a", 1)],
            &catalog,
            None,
            DeliveryType::Home,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(forward.subtotal, reverse.subtotal);
    }
}
