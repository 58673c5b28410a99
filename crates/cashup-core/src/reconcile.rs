//! # Reconciliation Engine
//!
//! Pure, side-effect-free balance verification and discrepancy math.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Open register                                                          │
//! │                                                                         │
//! │  User declares: 500.00      User counts: 5 × $100 bill                 │
//! │       │                          │                                      │
//! │       └──────────┬───────────────┘                                      │
//! │                  ▼                                                      │
//! │  verify_balance(declared, counted, catalog) ← THIS MODULE              │
//! │                  │                                                      │
//! │       ├── |500.00 − 500.00| ≤ 0.01 → ok, session may open             │
//! │       └── mismatch → Validation error with BOTH amounts                │
//! │                                                                         │
//! │  Close register                                                         │
//! │                                                                         │
//! │  compute_discrepancy(system_expected, calculated_closing)              │
//! │       = expected − calculated   (positive = shortage)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CountedDenomination, DenominationType};
use crate::validation::validate_breakdown;
use crate::BALANCE_TOLERANCE;

// =============================================================================
// Balance Check
// =============================================================================

/// Outcome of verifying a declared balance against a counted breakdown.
///
/// Both amounts are always carried so a failed check can be reported as
/// "declared 300.00, counted 250.00" and corrected by re-entering the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceCheck {
    /// Balance the user asserted is in the drawer.
    pub declared: Money,

    /// Balance derived from the counted denominations.
    pub calculated: Money,
}

impl BalanceCheck {
    /// Whether the declared balance matches the count within
    /// [`BALANCE_TOLERANCE`] (one minor currency unit).
    #[inline]
    pub fn is_balanced(&self) -> bool {
        (self.declared - self.calculated).abs() <= BALANCE_TOLERANCE
    }

    /// Signed difference `declared - calculated`.
    #[inline]
    pub fn difference(&self) -> Money {
        self.declared - self.calculated
    }
}

// =============================================================================
// Engine Functions
// =============================================================================

/// Sums a counted breakdown against the denomination catalog.
///
/// `Σ quantity_i × value(denomination_id_i)`, with each multiply widened
/// through i128 so a corrupt count reports an error instead of wrapping.
///
/// ## Errors
/// - [`CoreError::Validation`] for negative quantities, absurd quantities
///   or duplicate lines
/// - [`CoreError::UnknownDenomination`] when a line references an id the
///   catalog does not contain
pub fn breakdown_total(
    counted: &[CountedDenomination],
    catalog: &[DenominationType],
) -> CoreResult<Money> {
    validate_breakdown(counted)?;

    let values: HashMap<i64, Money> = catalog.iter().map(|d| (d.id, d.value())).collect();

    let mut total = Money::zero();
    for line in counted {
        let value = values.get(&line.denomination_id).copied().ok_or(
            CoreError::UnknownDenomination {
                denomination_id: line.denomination_id,
            },
        )?;

        let amount =
            value
                .multiply_quantity(line.quantity)
                .ok_or(CoreError::AmountOverflow {
                    denomination_id: line.denomination_id,
                })?;

        total = total
            .checked_add(amount)
            .ok_or(CoreError::AmountOverflow {
                denomination_id: line.denomination_id,
            })?;
    }

    Ok(total)
}

/// Verifies a declared balance against a counted denomination breakdown.
///
/// Returns the check with both amounts; callers decide what a mismatch
/// means (for session open/close it aborts the whole operation).
///
/// ## Example
/// ```rust
/// use cashup_core::{verify_balance, CountedDenomination, DenominationType, Money};
///
/// let catalog = vec![DenominationType {
///     id: 1,
///     name: "$100 bill".into(),
///     value_cents: 10_000,
///     is_active: true,
///     sort_order: 1,
/// }];
/// let counted = vec![CountedDenomination { denomination_id: 1, quantity: 5 }];
///
/// let check = verify_balance(Money::from_cents(50_000), &counted, &catalog).unwrap();
/// assert!(check.is_balanced());
/// assert_eq!(check.calculated.cents(), 50_000);
/// ```
pub fn verify_balance(
    declared: Money,
    counted: &[CountedDenomination],
    catalog: &[DenominationType],
) -> CoreResult<BalanceCheck> {
    let calculated = breakdown_total(counted, catalog)?;
    Ok(BalanceCheck {
        declared,
        calculated,
    })
}

/// Signed discrepancy between what the system expected in the drawer and
/// what was actually counted at close.
///
/// Sign convention: **positive = shortage** (drawer holds less than the
/// system expects), negative = surplus.
#[inline]
pub fn compute_discrepancy(system_expected: Money, calculated_closing: Money) -> Money {
    system_expected - calculated_closing
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<DenominationType> {
        vec![
            DenominationType {
                id: 1,
                name: "$100 bill".into(),
                value_cents: 10_000,
                is_active: true,
                sort_order: 1,
            },
            DenominationType {
                id: 2,
                name: "$10 bill".into(),
                value_cents: 1_000,
                is_active: true,
                sort_order: 2,
            },
            DenominationType {
                id: 3,
                name: "25¢ coin".into(),
                value_cents: 25,
                is_active: true,
                sort_order: 3,
            },
        ]
    }

    fn count(lines: &[(i64, i64)]) -> Vec<CountedDenomination> {
        lines
            .iter()
            .map(|&(denomination_id, quantity)| CountedDenomination {
                denomination_id,
                quantity,
            })
            .collect()
    }

    #[test]
    fn test_breakdown_total_sums_quantity_times_value() {
        // 4 × $100 + 8 × $10 = $480.00
        let total = breakdown_total(&count(&[(1, 4), (2, 8)]), &catalog()).unwrap();
        assert_eq!(total, Money::from_cents(48_000));
    }

    #[test]
    fn test_breakdown_total_empty_is_zero() {
        let total = breakdown_total(&[], &catalog()).unwrap();
        assert_eq!(total, Money::zero());
    }

    #[test]
    fn test_breakdown_zero_quantity_line_is_allowed() {
        let total = breakdown_total(&count(&[(1, 5), (3, 0)]), &catalog()).unwrap();
        assert_eq!(total, Money::from_cents(50_000));
    }

    #[test]
    fn test_unknown_denomination_is_rejected() {
        let err = breakdown_total(&count(&[(99, 1)]), &catalog()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnknownDenomination {
                denomination_id: 99
            }
        ));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let err = breakdown_total(&count(&[(1, -1)]), &catalog()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_duplicate_denomination_line_is_rejected() {
        let err = breakdown_total(&count(&[(1, 2), (1, 3)]), &catalog()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_verify_balance_exact_match() {
        let check =
            verify_balance(Money::from_cents(50_000), &count(&[(1, 5)]), &catalog()).unwrap();
        assert!(check.is_balanced());
        assert_eq!(check.difference(), Money::zero());
    }

    #[test]
    fn test_verify_balance_tolerance_boundary() {
        // Off by exactly one cent: within tolerance, both directions
        let check =
            verify_balance(Money::from_cents(50_001), &count(&[(1, 5)]), &catalog()).unwrap();
        assert!(check.is_balanced());
        let check =
            verify_balance(Money::from_cents(49_999), &count(&[(1, 5)]), &catalog()).unwrap();
        assert!(check.is_balanced());

        // Off by two cents: out of tolerance
        let check =
            verify_balance(Money::from_cents(50_002), &count(&[(1, 5)]), &catalog()).unwrap();
        assert!(!check.is_balanced());
    }

    #[test]
    fn test_verify_balance_mismatch_surfaces_both_amounts() {
        // Declared 300.00, counted 250.00
        let check = verify_balance(
            Money::from_cents(30_000),
            &count(&[(1, 2), (2, 5)]),
            &catalog(),
        )
        .unwrap();
        assert!(!check.is_balanced());
        assert_eq!(check.declared.cents(), 30_000);
        assert_eq!(check.calculated.cents(), 25_000);
    }

    #[test]
    fn test_compute_discrepancy_sign_convention() {
        // System expects 500.00, drawer counted 480.00 → 20.00 shortage
        let d = compute_discrepancy(Money::from_cents(50_000), Money::from_cents(48_000));
        assert_eq!(d, Money::from_cents(2_000));
        assert!(d.is_positive());

        // Drawer over by 5.00 → negative
        let d = compute_discrepancy(Money::from_cents(50_000), Money::from_cents(50_500));
        assert_eq!(d, Money::from_cents(-500));
        assert!(d.is_negative());

        // Equal → exactly zero
        let d = compute_discrepancy(Money::from_cents(50_000), Money::from_cents(50_000));
        assert!(d.is_zero());
    }
}
