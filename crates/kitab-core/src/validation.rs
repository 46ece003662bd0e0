//! # Validation Module
//!
//! Checkout input validation for Kitab Commerce.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: store-api (Rust)                                             │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, run BEFORE any pricing work             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are returned as [`ValidationError`] values, one per field, so
//! the API layer can surface them field-by-field.

use crate::error::{ValidationError, ValidationResult};

// =============================================================================
// Contact Fields
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 120 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with a dot somewhere after it
/// - Maximum 200 characters
///
/// Deliberately shallow: real deliverability is only proven by sending mail.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 200,
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    let shape_ok = parts.len() == 2
        && !parts[0].is_empty()
        && parts[1].contains('.')
        && !parts[1].starts_with('.')
        && !parts[1].ends_with('.');

    if !shape_ok {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - 6 to 20 characters after trimming
/// - Digits, spaces, and a leading `+` only
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() < 6 || phone.len() > 20 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be between 6 and 20 characters".to_string(),
        });
    }

    let digits_ok = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || (c == '+' && i == 0));

    if !digits_ok {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, and a leading +".to_string(),
        });
    }

    Ok(())
}

/// Validates a street address.
pub fn validate_address(address: &str) -> ValidationResult<()> {
    let address = address.trim();

    if address.is_empty() {
        return Err(ValidationError::Required {
            field: "address".to_string(),
        });
    }

    if address.len() > 300 {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: 300,
        });
    }

    Ok(())
}

/// Validates a city name.
pub fn validate_city(city: &str) -> ValidationResult<()> {
    let city = city.trim();

    if city.is_empty() {
        return Err(ValidationError::Required {
            field: "city".to_string(),
        });
    }

    if city.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "city".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Order Lines
// =============================================================================

/// Validates a submitted order-line quantity.
///
/// ## Rules
/// - Must not be negative. Zero is tolerated here (it prices to nothing);
///   negative quantities would let a line subtract from the subtotal.
pub fn validate_line_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
