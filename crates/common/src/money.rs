//! Money amounts in integer cents.

use serde::{Deserialize, Serialize};

/// Largest cent count an `f64` holds without skipping integers (2^53).
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Parses a decimal amount such as `19.99`.
    ///
    /// Returns `None` for non-finite values, values with more than two
    /// fractional digits, or amounts too large for every cent to be
    /// represented exactly in an `f64`.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let scaled = amount * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 || rounded.abs() > MAX_EXACT_CENTS {
            return None;
        }
        Some(Self {
            cents: rounded as i64,
        })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns the amount as a decimal number, e.g. `24.99`.
    pub fn to_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.cents.checked_add(rhs.cents).map(Self::from_cents)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(19.99), Some(Money::from_cents(1999)));
        assert_eq!(Money::from_decimal(5.0), Some(Money::from_cents(500)));
        assert_eq!(Money::from_decimal(0.1), Some(Money::from_cents(10)));
        assert_eq!(Money::from_decimal(-2.5), Some(Money::from_cents(-250)));
    }

    #[test]
    fn test_money_from_decimal_rejects_sub_cent_precision() {
        assert_eq!(Money::from_decimal(1.005), None);
        assert_eq!(Money::from_decimal(f64::NAN), None);
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
    }

    #[test]
    fn test_money_from_decimal_rejects_inexact_magnitudes() {
        assert_eq!(
            Money::from_decimal(1_000_000.0),
            Some(Money::from_cents(100_000_000))
        );
        assert_eq!(Money::from_decimal(50_000_000_000_000_000.0), None);
        assert_eq!(Money::from_decimal(-1e20), None);
    }

    #[test]
    fn test_money_checked_add() {
        let a = Money::from_cents(1999);
        assert_eq!(
            a.checked_add(Money::from_cents(500)),
            Some(Money::from_cents(2499))
        );
        assert_eq!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)),
            None
        );
        assert_eq!(
            Money::from_cents(i64::MAX / 2 + 1).checked_add(Money::from_cents(i64::MAX / 2 + 1)),
            None
        );
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }
}
