//! # Error Types
//!
//! Domain error taxonomy for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                     │
//! │  ├── CoreError        - The taxonomy every core operation returns      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mostrador-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, resolved into CoreError      │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - HTTP status + JSON body                        │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → CoreError → ApiError → Mobile client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product, sale, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each variant belongs to exactly one [`ErrorCategory`]

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by every ledger, sale and catalog operation.
///
/// Any of these raised inside a unit of work means the unit of work was
/// rolled back: callers never observe partial side effects.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or missing input. Nothing was written.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity absent, or present but owned by another tenant.
    ///
    /// Cross-tenant lookups deliberately produce the same error as missing
    /// rows so tenants cannot discover each other's ids.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Not enough stock to complete a debit.
    ///
    /// ## User Workflow
    /// ```text
    /// New Sale (Coffee × 5)
    ///      │
    ///      ▼
    /// Lock stock row: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_name: "Coffee", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// App shows: "Only 3 Coffee in stock"
    /// ```
    #[error("Insufficient stock for {product_name} ({product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        product_name: String,
        available: i64,
        requested: i64,
    },

    /// The sale was already cancelled; cancellation is terminal.
    #[error("Sale {sale_id} is already cancelled")]
    AlreadyCancelled { sale_id: String },

    /// A uniqueness rule was violated (duplicate SKU, sale number).
    #[error("{field} '{value}' already exists")]
    Conflict { field: String, value: String },

    /// Transaction-layer fault. The unit of work was rolled back.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the stable status category the boundary layer maps to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Validation(_) => ErrorCategory::BadInput,
            CoreError::NotFound { .. } => ErrorCategory::NotFound,
            CoreError::InsufficientStock { .. }
            | CoreError::AlreadyCancelled { .. }
            | CoreError::Conflict { .. } => ErrorCategory::Conflict,
            CoreError::Storage(_) => ErrorCategory::ServerFault,
        }
    }
}

/// Stable classification of [`CoreError`] for callers.
///
/// Exact transport codes are chosen by the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadInput,
    NotFound,
    Conflict,
    ServerFault,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any unit of work is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid SKU characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Discount would push the sale total below zero.
    #[error("discount {discount} exceeds sale amount {max}")]
    DiscountTooLarge { discount: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            product_name: "Coffee".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coffee (p-1): available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::DiscountTooLarge {
            discount: 500,
            max: 400,
        };
        assert_eq!(err.to_string(), "discount 500 exceeds sale amount 400");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_categories() {
        let bad: CoreError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert_eq!(bad.category(), ErrorCategory::BadInput);
        assert_eq!(
            CoreError::not_found("Sale", "s-1").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            CoreError::AlreadyCancelled {
                sale_id: "s-1".to_string()
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            CoreError::conflict("sku", "CAFE-1").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            CoreError::Storage("disk I/O error".to_string()).category(),
            ErrorCategory::ServerFault
        );
    }
}
