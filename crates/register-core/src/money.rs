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
//! │  A register that drifts by a cent per basket fails its till audit.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    $2.00 at 7%  = 200 × 700 bps  = 14 cents, exactly                    │
//! │    $5.00 at 20% = 500 × 2000 bps = 100 cents, exactly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use register_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                     // $21.98
//! let total = price + Money::from_cents(500);  // $15.99
//!
//! // Parse a price-book decimal without ever touching a float
//! let parsed: Money = "10.99".parse().unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::tax::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for change math intermediate steps
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for the snapshot payload
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use register_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(amount * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large subtotals.
    ///
    /// ## Example
    /// ```rust
    /// use register_core::money::Money;
    /// use register_core::tax::TaxRate;
    ///
    /// let subtotal = Money::from_cents(500); // $5.00
    /// let rate = TaxRate::from_bps(2000);    // 20% (tobacco)
    ///
    /// assert_eq!(subtotal.calculate_tax(rate).cents(), 100); // $1.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use register_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Rounds up to the next whole dollar.
    ///
    /// Used by the next-dollar cash tender path: a $8.14 total tenders $9.00.
    /// Amounts already on a dollar boundary are unchanged.
    ///
    /// ## Example
    /// ```rust
    /// use register_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(814).next_dollar().cents(), 900);
    /// assert_eq!(Money::from_cents(900).next_dollar().cents(), 900);
    /// ```
    #[inline]
    pub fn next_dollar(&self) -> Self {
        let remainder = self.0.rem_euclid(100);
        if remainder == 0 {
            *self
        } else {
            Money(self.0 - remainder + 100)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for receipts, journals, and debugging; no localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Parses a decimal price string ("1.99", "10", ".50") into cents.
///
/// ## Why Not f64?
/// Price books carry decimal strings; routing them through a float would
/// reintroduce the representation error this type exists to avoid. The parse
/// is pure string/integer work. More than two fraction digits is rejected.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a decimal amount like 1.99".to_string(),
        };

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole_str, frac_str) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole_str.is_empty() && frac_str.is_empty() {
            return Err(invalid());
        }
        if frac_str.len() > 2 {
            return Err(invalid());
        }
        if !whole_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole_str.is_empty() {
            0
        } else {
            whole_str.parse().map_err(|_| invalid())?
        };

        // ".5" means 50 cents: pad the fraction to two digits
        let frac: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_str.parse().map_err(|_| invalid())?,
        };

        let cents = whole * 100 + frac;
        Ok(Money(if negative { -cents } else { cents }))
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

/// Multiplication by integer (for quantity calculations).
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
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_exact_rates() {
        // $2.00 at 7% = $0.14, $5.00 at 20% = $1.00 - both exact
        assert_eq!(
            Money::from_cents(200)
                .calculate_tax(TaxRate::from_bps(700))
                .cents(),
            14
        );
        assert_eq!(
            Money::from_cents(500)
                .calculate_tax(TaxRate::from_bps(2000))
                .cents(),
            100
        );
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $10.01 at 15% = $1.5015 -> rounds to $1.50
        let tax = Money::from_cents(1001).calculate_tax(TaxRate::from_bps(1500));
        assert_eq!(tax.cents(), 150);

        // $0.99 at 7% = $0.0693 -> rounds to $0.07
        let tax = Money::from_cents(99).calculate_tax(TaxRate::from_bps(700));
        assert_eq!(tax.cents(), 7);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }

    #[test]
    fn test_next_dollar() {
        assert_eq!(Money::from_cents(814).next_dollar().cents(), 900);
        assert_eq!(Money::from_cents(801).next_dollar().cents(), 900);
        assert_eq!(Money::from_cents(900).next_dollar().cents(), 900);
        assert_eq!(Money::from_cents(0).next_dollar().cents(), 0);
        assert_eq!(Money::from_cents(1).next_dollar().cents(), 100);
    }

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!("1.99".parse::<Money>().unwrap().cents(), 199);
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!(".50".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("0.5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!(" 2.00 ".parse::<Money>().unwrap().cents(), 200);
        assert_eq!("-5.50".parse::<Money>().unwrap().cents(), -550);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("1.999".parse::<Money>().is_err());
        assert!("12a.99".parse::<Money>().is_err());
        assert!("1,99".parse::<Money>().is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(-100).is_negative());
    }
}
