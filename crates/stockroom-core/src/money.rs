//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The remote store sends prices as decimal strings: "2.99", "1.49"      │
//! │  Parsing those into f64 and summing:                                   │
//! │    2 × 2.99 + 3 × 1.49 = 10.450000000000001  ❌ WRONG!                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "2.99" → 299 cents, "1.49" → 149 cents                              │
//! │    2 × 299 + 3 × 149 = 1045 cents → "10.45"  ✅                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::parse_decimal("2.99").unwrap();
//! assert_eq!(price.cents(), 299);
//!
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.to_decimal_string(), "5.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Wire format**: Decimal strings, produced by [`Money::to_decimal_string`]
///
/// ## Where Money Is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.unit_price ──► OrderItem.unit_price ──► OrderItem.line_total  │
/// │                          (snapshot at add time)          │              │
/// │                                                          ▼              │
/// │                                  Order.total ──► SaleDraft.amount      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal string as sent by the remote store.
    ///
    /// ## Accepted Forms
    /// - `"10"`, `"10.5"`, `"10.50"`, `"-5.50"`
    /// - Trailing zeros beyond the second fraction digit: `"10.500"`
    ///
    /// ## Rejected Forms
    /// - Empty strings, `"abc"`, `"1.2.3"`, `".5"`
    /// - A non-zero third fraction digit: `"2.995"` (sub-cent precision)
    /// - Magnitudes above [`MAX_MONEY_CENTS`](crate::MAX_MONEY_CENTS)
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("2.99").unwrap().cents(), 299);
    /// assert_eq!(Money::parse_decimal("10").unwrap().cents(), 1000);
    /// assert!(Money::parse_decimal("2.995").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' {}", input, reason),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("is not a decimal number"));
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("is not a decimal number"));
        }
        if fraction.len() > 2 && fraction[2..].chars().any(|c| c != '0') {
            return Err(invalid("has more than two decimal places"));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| invalid("is out of range"))?;

        let mut minor = 0;
        for (idx, digit) in fraction.chars().take(2).enumerate() {
            let value = i64::from(digit.to_digit(10).unwrap_or(0));
            minor += if idx == 0 { value * 10 } else { value };
        }

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .filter(|c| *c <= crate::MAX_MONEY_CENTS)
            .ok_or_else(|| invalid("is out of range"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Renders the value in the remote store's decimal-string format.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1045).to_decimal_string(), "10.45");
    /// assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Cola $2.99
    /// Quantity: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: $5.98
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with a currency sign, for logs.
///
/// ## Note
/// The console UI does its own localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_decimal(s)
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("2.99").unwrap().cents(), 299);
        assert_eq!(Money::parse_decimal("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse_decimal("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse_decimal("10.500").unwrap().cents(), 1050);
        assert_eq!(Money::parse_decimal("-5.50").unwrap().cents(), -550);
        assert_eq!(Money::parse_decimal(" 0.01 ").unwrap().cents(), 1);
        assert_eq!(Money::parse_decimal("7.").unwrap().cents(), 700);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal("abc").is_err());
        assert!(Money::parse_decimal("1.2.3").is_err());
        assert!(Money::parse_decimal(".5").is_err());
        assert!(Money::parse_decimal("2.995").is_err());
        assert!(Money::parse_decimal("1e3").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(Money::from_cents(1045).to_decimal_string(), "10.45");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_cents(0).to_decimal_string(), "0.00");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
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
    fn test_parse_decimal_caps_magnitude() {
        assert_eq!(
            Money::parse_decimal("10000000000").unwrap().cents(),
            crate::MAX_MONEY_CENTS
        );
        assert!(Money::parse_decimal("10000000000.01").is_err());
        assert!(Money::parse_decimal("-92233720368547758").is_err());
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_cents(i64::MAX / 2);

        assert_eq!(huge.multiply_quantity(999).cents(), i64::MAX);
        assert_eq!((huge * 3).cents(), i64::MAX);
        assert_eq!((huge + huge + huge).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);

        let mut total = huge;
        total += huge;
        total += huge;
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_sum_avoids_float_drift() {
        let cola = Money::parse_decimal("2.99").unwrap();
        let water = Money::parse_decimal("1.49").unwrap();
        let total: Money = [cola.multiply_quantity(2), water.multiply_quantity(3)]
            .into_iter()
            .sum();
        assert_eq!(total.to_decimal_string(), "10.45");
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }
}
