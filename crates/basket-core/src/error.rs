//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  basket-core errors (this file)                                        │
//! │  ├── CoreError        - Cart rule and snapshot failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  basket-store errors (separate crate)                                  │
//! │  └── StoreError       - Usage, hydration, persistence, backend         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → caller / logs        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cart logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A snapshot could not be decoded into a cart.
    ///
    /// ## When This Occurs
    /// - Stored text is not JSON, or not an array of line items
    /// - Stored items break a cart invariant (duplicate id, zero quantity)
    #[error("Invalid cart snapshot: {0}")]
    InvalidSnapshot(String),

    /// A cart could not be encoded.
    #[error("Failed to encode cart snapshot: {0}")]
    Encode(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value appears more than once where it must be unique.
    #[error("{field} '{value}' appears more than once")]
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
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "id is required");

        let err = ValidationError::Duplicate {
            field: "id".to_string(),
            value: "p1".to_string(),
        };
        assert_eq!(err.to_string(), "id 'p1' appears more than once");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: quantity must be positive"
        );
    }
}
