//! # Money Module
//!
//! Provides the `Money` type for monetary values and `DiscountValue` for the
//! fixed-point numeric value stored on a promotion code.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  STACKED DISCOUNTS WITH FLOATS                                          │
//! │                                                                         │
//! │    153.00 * 0.20 = 30.600000000000001  ❌                               │
//! │    100.00 → 90.00 → 80.99999999999999  ❌                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    15300 * 2000 bps / 10000 = 3060 cents                               │
//! │    10000 → 9000 → 8100 cents                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use discount_core::money::{DiscountValue, Money};
//!
//! let total = Money::from_cents(15300); // $153.00
//! let rate = DiscountValue::from_hundredths(2000); // 20.00
//!
//! let discount = total.percentage(rate.as_bps());
//! assert_eq!(discount.cents(), 3060); // $30.60
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: a negative final total is representable so it can be
///   detected, never silently wrapped
/// - **Serialized as a bare integer**: `"total": 15300` on the wire
///
/// ## Where Money Flows
/// ```text
/// Cart.total ──► CalculationContext.remaining ──► stage amount ──► AppliedDiscount.amount
///                         │                                              │
///                         └──────────── reduced by each ◄────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
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

    /// Returns the smaller of two values.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Returns the larger of two values.
    #[inline]
    pub fn max(self, other: Money) -> Money {
        Money(self.0.max(other.0))
    }

    /// Computes `bps` basis points of this amount.
    ///
    /// ## Rounding
    /// Integer math with half-up rounding on the half cent:
    /// `(amount * bps + 5000) / 10000`. `i128` keeps large carts from
    /// overflowing the intermediate product.
    ///
    /// ## Example
    /// ```rust
    /// use discount_core::money::Money;
    ///
    /// // 20% of $153.00
    /// assert_eq!(Money::from_cents(15300).percentage(2000).cents(), 3060);
    ///
    /// // 10% of $0.05 = 0.5 cents → rounds to 1 cent
    /// assert_eq!(Money::from_cents(5).percentage(1000).cents(), 1);
    /// ```
    pub fn percentage(&self, bps: i64) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Discount Value
// =============================================================================

/// The numeric `value` of a promotion code, a decimal with two places
/// stored as hundredths (`20.00` → `2000`).
///
/// The same field is read differently depending on the discount type:
///
/// | Type                  | Reading        | `20.00` means |
/// |-----------------------|----------------|---------------|
/// | `percentage`          | basis points   | 20%           |
/// | `fixed_amount`        | cents          | $20.00        |
/// | `percentage_with_cap` | both           | 20%, max $20  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountValue(i64);

impl DiscountValue {
    /// Creates a value from hundredths.
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        DiscountValue(hundredths)
    }

    /// Creates a value from a whole number (`from_whole(20)` is `20.00`).
    #[inline]
    pub const fn from_whole(whole: i64) -> Self {
        DiscountValue(whole * 100)
    }

    /// Returns the raw hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Reads the value as a percentage rate in basis points.
    #[inline]
    pub const fn as_bps(&self) -> i64 {
        self.0
    }

    /// Reads the value as a monetary amount.
    #[inline]
    pub const fn as_money(&self) -> Money {
        Money::from_cents(self.0)
    }
}

impl fmt::Display for DiscountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$10.99`, used in human-readable domain messages.
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

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

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
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(153, 0).cents(), 15300);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(20000)), "$200.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Money::from_cents(15300).percentage(2000).cents(), 3060);
        assert_eq!(Money::from_cents(10000).percentage(1000).cents(), 1000);
        assert_eq!(Money::from_cents(9000).percentage(1000).cents(), 900);
        assert_eq!(Money::from_cents(10000).percentage(0).cents(), 0);
    }

    #[test]
    fn test_percentage_rounds_half_cent_up() {
        // 12.5% of $0.04 = 0.5 cents
        assert_eq!(Money::from_cents(4).percentage(1250).cents(), 1);
        // 12.5% of $0.03 = 0.375 cents
        assert_eq!(Money::from_cents(3).percentage(1250).cents(), 0);
    }

    #[test]
    fn test_min_and_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.min(b), b);
        assert_eq!(a.max(b), a);
        assert_eq!(Money::from_cents(-3).max(Money::zero()), Money::zero());
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b * 3).cents(), 1500);
        assert_eq!(b.multiply_quantity(2).cents(), 1000);
    }

    #[test]
    fn test_discount_value_readings() {
        let value = DiscountValue::from_whole(20);
        assert_eq!(value.hundredths(), 2000);
        assert_eq!(value.as_bps(), 2000);
        assert_eq!(value.as_money(), Money::from_cents(2000));
        assert_eq!(value.to_string(), "20.00");
        assert_eq!(DiscountValue::from_hundredths(1250).to_string(), "12.50");
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_cents(12240)).unwrap();
        assert_eq!(json, "12240");
    }
}
