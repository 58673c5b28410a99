//! # Validation Module
//!
//! Input validation for session open/close requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service request (cashup-register)                            │
//! │  ├── THIS MODULE: field-level rules on the typed request               │
//! │  └── Reconciliation check (declared vs counted)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── Partial UNIQUE index (one open session per register)              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::CountedDenomination;
use crate::MAX_DENOMINATION_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of opening/closing notes.
pub const MAX_NOTES_LEN: usize = 500;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a counted quantity.
///
/// ## Rules
/// - Must not be negative (zero is a valid count)
/// - Must not exceed [`MAX_DENOMINATION_QUANTITY`]
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_DENOMINATION_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_DENOMINATION_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a declared balance in cents.
///
/// ## Rules
/// - Must not be negative (an empty drawer is declared as zero)
pub fn validate_declared_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "declared balance".to_string(),
        });
    }

    Ok(())
}

/// Validates an external catalog id (register, branch, user, denomination).
///
/// ## Rules
/// - Must be positive; the surrounding catalogs never issue id 0 or below
pub fn validate_entity_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Breakdown Validators
// =============================================================================

/// Validates a counted denomination breakdown.
///
/// ## Rules
/// - Every quantity passes [`validate_quantity`]
/// - No denomination appears more than once
///
/// An empty breakdown is structurally valid here; whether it reconciles
/// against the declared balance is the engine's decision.
pub fn validate_breakdown(counted: &[CountedDenomination]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(counted.len());

    for line in counted {
        validate_quantity(line.quantity)?;

        if !seen.insert(line.denomination_id) {
            return Err(ValidationError::Duplicate {
                field: "denomination".to_string(),
                value: line.denomination_id.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates optional session notes.
///
/// ## Rules
/// - At most [`MAX_NOTES_LEN`] characters
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    if let Some(notes) = notes {
        if notes.len() > MAX_NOTES_LEN {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_NOTES_LEN,
            });
        }
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
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(5).is_ok());
        assert!(validate_quantity(MAX_DENOMINATION_QUANTITY).is_ok());

        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_DENOMINATION_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_declared_cents() {
        assert!(validate_declared_cents(0).is_ok());
        assert!(validate_declared_cents(50_000).is_ok());
        assert!(validate_declared_cents(-1).is_err());
    }

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("register_id", 1).is_ok());
        assert!(validate_entity_id("register_id", 0).is_err());
        assert!(validate_entity_id("register_id", -3).is_err());
    }

    #[test]
    fn test_validate_breakdown_rejects_duplicates() {
        let counted = vec![
            CountedDenomination {
                denomination_id: 1,
                quantity: 2,
            },
            CountedDenomination {
                denomination_id: 1,
                quantity: 3,
            },
        ];
        assert!(matches!(
            validate_breakdown(&counted),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_validate_breakdown_ok() {
        let counted = vec![
            CountedDenomination {
                denomination_id: 1,
                quantity: 4,
            },
            CountedDenomination {
                denomination_id: 2,
                quantity: 0,
            },
        ];
        assert!(validate_breakdown(&counted).is_ok());
        assert!(validate_breakdown(&[]).is_ok());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("morning shift")).is_ok());
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN + 1))).is_err());
    }
}
