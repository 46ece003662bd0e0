//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Error Flow in store-api                                │
//! │                                                                         │
//! │  ValidationError (per field) ──► 400 + fieldErrors list                 │
//! │  PricingError::BooksUnavailable ──► 409 + missingBookIds list           │
//! │  CouponRejection ──► 422 + human-readable reason                        │
//! │  DbError (persistence) ──► 500, detail logged, generic message          │
//! │                                                                         │
//! │  Body shape:                                                            │
//! │  {                                                                      │
//! │    "code": "COUPON_REJECTED",                                           │
//! │    "message": "This coupon has expired",                                │
//! │    "fieldErrors": [...],      // validation only                        │
//! │    "missingBookIds": [...]    // catalog inconsistency only             │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kitab_core::{CouponRejection, PricingError, ValidationError};
use kitab_db::DbError;

/// API error returned from HTTP handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// One entry per offending checkout field (validation errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,

    /// Cart book ids that no longer resolve (catalog inconsistency only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_book_ids: Option<Vec<String>>,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Coupon cannot be applied (422)
    CouponRejected,

    /// Cart references books that no longer resolve (409)
    CatalogInconsistency,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::CouponRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::CatalogInconsistency => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field_errors: None,
            missing_book_ids: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error with a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a validation error carrying one entry per offending field.
    pub fn fields(errors: Vec<ValidationError>) -> Self {
        let field_errors = errors
            .iter()
            .map(|e| FieldError {
                field: e.field().to_string(),
                message: e.to_string(),
            })
            .collect();

        ApiError {
            code: ErrorCode::ValidationError,
            message: "Some fields are invalid".to_string(),
            field_errors: Some(field_errors),
            missing_book_ids: None,
        }
    }
}

/// Coupon rejections abort checkout with the evaluator's own wording.
impl From<CouponRejection> for ApiError {
    fn from(rejection: CouponRejection) -> Self {
        ApiError::new(ErrorCode::CouponRejected, rejection.to_string())
    }
}

/// Pricing failures map to the taxonomy: empty cart is a validation error,
/// unresolvable books carry their full id list, coupon failures pass through.
impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::EmptyOrder => ApiError::validation("Cart is empty"),
            PricingError::BooksUnavailable { ids } => ApiError {
                code: ErrorCode::CatalogInconsistency,
                message: "Some books in your cart are no longer available".to_string(),
                field_errors: None,
                missing_book_ids: Some(ids),
            },
            PricingError::Coupon(rejection) => rejection.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            // A concurrent checkout consumed the last redemption
            DbError::CouponExhausted { .. } => {
                ApiError::from(CouponRejection::UsageLimitReached)
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            // Persistence failures: log the detail, return a generic message
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_mapping() {
        let err: ApiError = PricingError::BooksUnavailable {
            ids: vec!["b1".to_string()],
        }
        .into();
        assert!(matches!(err.code, ErrorCode::CatalogInconsistency));
        assert_eq!(err.missing_book_ids.as_deref(), Some(&["b1".to_string()][..]));

        let err: ApiError = PricingError::EmptyOrder.into();
        assert!(matches!(err.code, ErrorCode::ValidationError));
    }

    #[test]
    fn test_coupon_exhausted_maps_to_rejection() {
        let err: ApiError = DbError::CouponExhausted {
            code: "ONCE".to_string(),
        }
        .into();
        assert!(matches!(err.code, ErrorCode::CouponRejected));
        assert_eq!(err.message, "This coupon has reached its usage limit");
    }

    #[test]
    fn test_field_errors_carry_field_names() {
        let err = ApiError::fields(vec![ValidationError::Required {
            field: "email".to_string(),
        }]);
        let fields = err.field_errors.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "email");
    }
}
