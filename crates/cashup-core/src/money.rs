//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A drawer count of 3 × $0.10 + 2 × $0.05 must equal $0.40 EXACTLY,     │
//! │  or every reconciliation report becomes noise.                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every balance, denomination value and discrepancy is an i64 count   │
//! │    of minor currency units. Arithmetic is exact.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashup_core::money::Money;
//!
//! // Create from cents (preferred)
//! let declared = Money::from_cents(50_000); // $500.00
//!
//! // Arithmetic operations
//! let shortage = declared - Money::from_cents(48_000); // $20.00
//! assert_eq!(shortage.cents(), 2_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discrepancies are signed - a drawer can be short
///   (positive) or over (negative)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: Serializes as a bare integer, which is also how
///   the database stores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use cashup_core::money::Money;
    ///
    /// let balance = Money::from_cents(50_000); // $500.00
    /// assert_eq!(balance.cents(), 50_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use cashup_core::money::Money;
    ///
    /// let balance = Money::from_major_minor(480, 50); // $480.50
    /// assert_eq!(balance.cents(), 48_050);
    ///
    /// let shortage = Money::from_major_minor(-5, 50); // -$5.50
    /// assert_eq!(shortage.cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// ## Example
    /// ```rust
    /// use cashup_core::money::Money;
    ///
    /// let surplus = Money::from_cents(-550);
    /// assert_eq!(surplus.abs().cents(), 550);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity, widening through i128 to avoid
    /// overflow on pathological counts.
    ///
    /// ## Example
    /// ```rust
    /// use cashup_core::money::Money;
    ///
    /// let hundred = Money::from_cents(10_000); // $100.00 bill
    /// let five_of_them = hundred.multiply_quantity(5);
    /// assert_eq!(five_of_them, Some(Money::from_cents(50_000)));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        let wide = self.0 as i128 * qty as i128;
        i64::try_from(wide).ok().map(Money)
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and error messages. Presentation-layer formatting
/// (locale, currency symbol) is a caller concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02}",
            sign,
            self.major_units().abs(),
            self.minor_units()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations where overflow is
/// already ruled out by validation).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(48_050);
        assert_eq!(money.cents(), 48_050);
        assert_eq!(money.major_units(), 480);
        assert_eq!(money.minor_units(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(480, 50);
        assert_eq!(money.cents(), 48_050);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(50_000)), "500.00");
        assert_eq!(format!("{}", Money::from_cents(2_000)), "20.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let expected = Money::from_cents(50_000);
        let counted = Money::from_cents(48_000);

        assert_eq!((expected - counted).cents(), 2_000);
        assert_eq!((expected + counted).cents(), 98_000);
        let tripled: Money = counted * 3;
        assert_eq!(tripled.cents(), 144_000);
    }

    #[test]
    fn test_multiply_quantity() {
        let hundred = Money::from_cents(10_000);
        assert_eq!(
            hundred.multiply_quantity(5),
            Some(Money::from_cents(50_000))
        );
        // Overflow is reported, not wrapped
        assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let shortage = Money::from_cents(2_000);
        assert!(shortage.is_positive());

        let surplus = Money::from_cents(-2_000);
        assert!(surplus.is_negative());
        assert_eq!(surplus.abs().cents(), 2_000);
    }

    #[test]
    fn test_serde_transparent() {
        let money = Money::from_cents(48_050);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "48050");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }
}
