//! # Validation Module
//!
//! Input validation utilities for the register.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input handler (scanner / console)                            │
//! │  ├── Trims and forwards raw text                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Empty UPC, quantity < 1, negative price                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK / primary key constraints                        │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::DEFAULT_CATEGORY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a UPC.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 20 characters
///
/// ## Returns
/// The trimmed UPC.
///
/// ## Example
/// ```rust
/// use register_core::validation::validate_upc;
///
/// assert_eq!(validate_upc(" 036000291452 ").unwrap(), "036000291452");
/// assert!(validate_upc("").is_err());
/// ```
pub fn validate_upc(upc: &str) -> ValidationResult<String> {
    let upc = upc.trim();

    if upc.is_empty() {
        return Err(ValidationError::Required {
            field: "upc".to_string(),
        });
    }

    if upc.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "upc".to_string(),
            max: 20,
        });
    }

    Ok(upc.to_string())
}

/// Validates an item description.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 255 characters
pub fn validate_description(description: &str) -> ValidationResult<String> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 255,
        });
    }

    Ok(description.to_string())
}

/// Normalizes a category tag.
///
/// Categories are compared case-insensitively against the tax rate table,
/// so they are stored uppercase. A blank category becomes `OTHER`.
pub fn normalize_category(category: &str) -> String {
    let category = category.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_uppercase()
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be at least 1. A line with quantity 0 does not exist: voiding the
///   line, not zeroing it, is the only way to eliminate it.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBeAtLeast {
            field: "quantity".to_string(),
            min: 1,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use register_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upc() {
        assert_eq!(validate_upc("012345678905").unwrap(), "012345678905");
        assert_eq!(validate_upc("  4011  ").unwrap(), "4011");

        assert!(validate_upc("").is_err());
        assert!(validate_upc("   ").is_err());
        assert!(validate_upc(&"9".repeat(30)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Cola 12oz Can").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("tobacco"), "TOBACCO");
        assert_eq!(normalize_category(" Alcohol "), "ALCOHOL");
        assert_eq!(normalize_category(""), "OTHER");
        assert_eq!(normalize_category("   "), "OTHER");
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }
}
