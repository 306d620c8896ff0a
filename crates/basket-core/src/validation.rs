//! # Validation Module
//!
//! Input checks for line items, run before anything touches the cart.
//!
//! ```rust
//! use basket_core::money::Money;
//! use basket_core::validation::{validate_item_id, validate_price, validate_quantity};
//!
//! assert!(validate_item_id("p1").is_ok());
//! assert!(validate_quantity(0).is_err());
//! assert!(validate_price(Money::from_cents(-5)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_ID_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line item id.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most `MAX_ITEM_ID_LEN` characters
///
/// Otherwise ids are opaque: no format is imposed.
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.chars().count() > MAX_ITEM_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ITEM_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a line quantity. Rows with zero units don't exist.
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "unitPrice".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
