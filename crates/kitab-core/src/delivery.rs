//! # Delivery Fee Table
//!
//! Flat delivery fees by delivery method, independent of destination.
//!
//! ## Current Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Delivery Method        Fee                                             │
//! │  ───────────────        ─────                                           │
//! │  Home (courier)         $7.00                                           │
//! │  Office (relay pickup)  $4.00                                           │
//! │                                                                         │
//! │  Free-shipping coupons zero the fee regardless of method.               │
//! │  The zeroing happens in pricing, not here - this module only knows      │
//! │  the base table.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::DeliveryType;

/// Fee in cents for courier delivery to the customer's address.
pub const HOME_DELIVERY_FEE_CENTS: i64 = 700;

/// Fee in cents for pickup at a relay office.
pub const OFFICE_DELIVERY_FEE_CENTS: i64 = 400;

/// Returns the flat delivery fee for a delivery method.
///
/// ## Example
/// ```rust
/// use kitab_core::delivery::delivery_fee;
/// use kitab_core::types::DeliveryType;
///
/// assert!(delivery_fee(DeliveryType::Home) > delivery_fee(DeliveryType::Office));
/// ```
pub const fn delivery_fee(delivery_type: DeliveryType) -> Money {
    match delivery_type {
        DeliveryType::Home => Money::from_cents(HOME_DELIVERY_FEE_CENTS),
        DeliveryType::Office => Money::from_cents(OFFICE_DELIVERY_FEE_CENTS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_lookup() {
        assert_eq!(
            delivery_fee(DeliveryType::Home).cents(),
            HOME_DELIVERY_FEE_CENTS
        );
        assert_eq!(
            delivery_fee(DeliveryType::Office).cents(),
            OFFICE_DELIVERY_FEE_CENTS
        );
    }
}
