//! # Error Types
//!
//! Domain-specific error types for register-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  register-core errors (this file)                                      │
//! │  ├── CoreError        - Transaction/state/serialization failures       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  register-engine errors (separate crate)                               │
//! │  └── RegisterError    - Orchestration failures (limit, conflict, ...)  │
//! │                                                                         │
//! │  register-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RegisterError → caller/display    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (UPC, index, quantity, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They never mutate the state they were raised against: a rejected operation
/// leaves the transaction exactly as it was.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Operation not permitted in the transaction's current state.
    ///
    /// ## When This Occurs
    /// - Starting the tendering phase on an empty transaction
    /// - Adding items while payment is being collected
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A line index does not refer to an existing line item.
    #[error("line index {index} is out of range ({len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// A suspension payload could not be decoded back into line items.
    ///
    /// ## When This Occurs
    /// - Corrupted or hand-edited rows in the suspension store
    /// - A payload written by an incompatible schema version
    #[error("malformed snapshot payload: {reason}")]
    Serialization { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidState error with the given message.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidState {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization {
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs; the caller's state
/// is unchanged and the message is fit to show on the operator display.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is below its floor.
    #[error("{field} must be at least {min}")]
    MustBeAtLeast { field: String, min: i64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-decimal price string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A cash tender that does not cover the transaction total.
    #[error("insufficient payment: {tendered} tendered for {total} total")]
    InsufficientPayment { tendered: String, total: String },
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
    fn test_error_messages() {
        let err = CoreError::LineOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "line index 4 is out of range (2 lines)");

        let err = CoreError::invalid_state("cannot tender an empty transaction");
        assert_eq!(
            err.to_string(),
            "invalid state: cannot tender an empty transaction"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "upc".to_string(),
        };
        assert_eq!(err.to_string(), "upc is required");

        let err = ValidationError::MustBeAtLeast {
            field: "quantity".to_string(),
            min: 1,
        };
        assert_eq!(err.to_string(), "quantity must be at least 1");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "upc".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
