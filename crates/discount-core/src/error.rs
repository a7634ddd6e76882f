//! # Error Types
//!
//! Error types for discount-core.
//!
//! ## Two Failure Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Failure Classes                                 │
//! │                                                                         │
//! │  Request-level (this file, returned as Err)                            │
//! │  ├── ValidationError  - malformed request, rejected before pipeline    │
//! │  └── CoreError        - ValidationError | store unreachable            │
//! │                                                                         │
//! │  Domain-level (NOT an error, returned as Ok)                           │
//! │  └── DiscountCalculationResult { is_valid: false, error_message }      │
//! │      expired, limit reached, wrong user/group, basket too small...     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller (HTTP 422 / 500)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value)
//! 3. A promotion code being unusable is data, never an `Err`

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by the calculator's public operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request was structurally invalid and never reached the pipeline.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The code repository could not be queried.
    ///
    /// ## When This Occurs
    /// - Database unreachable or pool exhausted
    /// - Query failed while resolving codes
    ///
    /// This is fatal for the call; the caller cannot tell whether any of the
    /// submitted codes exist.
    #[error("Code repository unavailable: {0}")]
    Repository(String),
}

impl CoreError {
    /// Wraps a repository failure.
    pub fn repository(message: impl Into<String>) -> Self {
        CoreError::Repository(message.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Structural problems with a calculation request.
#[derive(Debug, Error, PartialEq, Eq)]
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
    Negative { field: String },

    /// Invalid format (e.g. unknown discount type tag).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. the same code submitted twice).
    #[error("{field} '{value}' was submitted more than once")]
    Duplicate { field: String, value: String },
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
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer.id".to_string(),
        };
        assert_eq!(err.to_string(), "customer.id is required");

        let err = ValidationError::Duplicate {
            field: "discount_codes".to_string(),
            value: "PERCENT20".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "discount_codes 'PERCENT20' was submitted more than once"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Negative {
            field: "cart.total".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: cart.total must not be negative"
        );
    }

    #[test]
    fn test_repository_error_message() {
        let err = CoreError::repository("pool timed out");
        assert_eq!(err.to_string(), "Code repository unavailable: pool timed out");
    }
}
