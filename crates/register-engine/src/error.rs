//! # Orchestration Error Types
//!
//! The error taxonomy the register surfaces to its callers. Every variant is
//! a rejection: the operation that raised it performed no mutation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variant              Raised when                                       │
//! │  ───────────────────  ─────────────────────────────────────────────     │
//! │  Validation           empty UPC, quantity < 1, short cash tender        │
//! │  InvalidState         tender an empty tx, scan during TENDERING         │
//! │  LineOutOfRange       void / quantity-change at a bad index             │
//! │  LimitExceeded        suspend beyond the ceiling (message names it)     │
//! │  Conflict             resume while the live transaction has items       │
//! │  ItemNotFound         scanned UPC absent from the catalog               │
//! │  SuspensionNotFound   resume of an unknown suspension id                │
//! │  Serialization        malformed snapshot payload on restore             │
//! │  Persistence          store failure during suspend/resume/delete/clean  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use register_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// Persistence Error
// =============================================================================

/// A failure reported by a persistence collaborator.
///
/// Deliberately opaque: the engine treats the store as a black box that
/// either fully succeeds or leaves state unchanged. The concrete store crate
/// converts its own error type into this one.
#[derive(Debug, Error)]
#[error("persistence failure: {message}")]
pub struct PersistenceError {
    message: String,
}

impl PersistenceError {
    /// Creates a persistence error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        PersistenceError {
            message: message.into(),
        }
    }
}

// =============================================================================
// Register Error
// =============================================================================

/// Errors surfaced by register orchestration.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Input failed validation; reported to the display, state unchanged.
    #[error("validation error: {0}")]
    Validation(ValidationError),

    /// Operation not permitted in the current transaction state.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A line index does not refer to an existing line.
    #[error("line index {index} is out of range ({len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// Suspension ceiling reached. The message names the ceiling.
    #[error("cannot suspend: maximum of {max} suspended transactions reached")]
    LimitExceeded { max: usize },

    /// The live transaction has items; suspend or void it first.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Scanned UPC is not in the catalog.
    #[error("item not found: {upc}")]
    ItemNotFound { upc: String },

    /// No suspension with the requested id.
    #[error("suspension not found: {id}")]
    SuspensionNotFound { id: String },

    /// Snapshot payload could not be decoded on restore.
    #[error("malformed snapshot payload: {reason}")]
    Serialization { reason: String },

    /// The persistence collaborator failed; no state was mutated.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<CoreError> for RegisterError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => RegisterError::Validation(v),
            CoreError::InvalidState { message } => RegisterError::InvalidState { message },
            CoreError::LineOutOfRange { index, len } => {
                RegisterError::LineOutOfRange { index, len }
            }
            CoreError::Serialization { reason } => RegisterError::Serialization { reason },
        }
    }
}

impl From<ValidationError> for RegisterError {
    fn from(err: ValidationError) -> Self {
        RegisterError::Validation(err)
    }
}

/// Result type for register operations.
pub type RegisterResult<T> = Result<T, RegisterError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_message_names_the_ceiling() {
        let err = RegisterError::LimitExceeded {
            max: register_core::MAX_SUSPENDED_TRANSACTIONS,
        };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_core_error_mapping() {
        let err: RegisterError = CoreError::invalid_state("nope").into();
        assert!(matches!(err, RegisterError::InvalidState { .. }));

        let err: RegisterError = CoreError::LineOutOfRange { index: 3, len: 1 }.into();
        assert!(matches!(
            err,
            RegisterError::LineOutOfRange { index: 3, len: 1 }
        ));
    }
}
