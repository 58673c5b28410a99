//! # Error Types
//!
//! Domain-specific error types for cashup-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cashup-core errors (this file)                                        │
//! │  ├── CoreError        - Reconciliation / domain failures               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cashup-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  cashup-register errors (service crate)                                │
//! │  └── ServiceError     - What callers see (Conflict/Validation/...)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Reconciliation and domain logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A counted breakdown referenced a denomination the catalog does not
    /// contain.
    ///
    /// ## When This Occurs
    /// - Stale terminal cache offering a retired denomination
    /// - Caller bug sending an arbitrary id
    #[error("Unknown denomination: {denomination_id}")]
    UnknownDenomination { denomination_id: i64 },

    /// Extended amount (`quantity * value`) overflowed the monetary range.
    /// Cannot happen with validated quantities; kept so the arithmetic is
    /// total rather than panicking.
    #[error("Breakdown amount overflow for denomination {denomination_id}")]
    AmountOverflow { denomination_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements, before any
/// reconciliation or persistence runs.
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

    /// Duplicate value (e.g. the same denomination listed twice in one
    /// counted breakdown).
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
    fn test_error_messages() {
        let err = CoreError::UnknownDenomination {
            denomination_id: 42,
        };
        assert_eq!(err.to_string(), "Unknown denomination: 42");

        let err = ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "breakdown".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
