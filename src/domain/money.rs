use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Absolute tolerance for reconciling client-supplied totals against
/// server-side sums.
pub const RECONCILE_TOLERANCE: Decimal = dec!(0.01);

/// A monetary value in whole currency units with fractional precision.
///
/// Wrapper around `rust_decimal::Decimal` so the pricing pipelines never touch
/// binary floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to the nearest whole currency unit, halves away from zero.
    pub fn round_unit(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `rate` percent of this amount, rounded to the nearest whole unit.
    pub fn percent(&self, rate: Decimal) -> Self {
        Self(self.0 * rate / dec!(100)).round_unit()
    }

    /// True when the two amounts differ by at most [`RECONCILE_TOLERANCE`].
    pub fn reconciles_with(&self, other: Money) -> bool {
        (self.0 - other.0).abs() <= RECONCILE_TOLERANCE
    }

    pub fn min(self, other: Money) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_to_whole_unit() {
        assert_eq!(Money::new(dec!(1000)).percent(dec!(10)), Money::new(dec!(100)));
        assert_eq!(Money::new(dec!(900)).percent(dec!(18)), Money::new(dec!(162)));
        // 905 * 10% = 90.5 rounds away from zero
        assert_eq!(Money::new(dec!(905)).percent(dec!(10)), Money::new(dec!(91)));
    }

    #[test]
    fn test_reconciles_within_tolerance() {
        let a = Money::new(dec!(1400));
        assert!(a.reconciles_with(Money::new(dec!(1400.01))));
        assert!(a.reconciles_with(Money::new(dec!(1399.99))));
        assert!(!a.reconciles_with(Money::new(dec!(1399))));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let total: Money = [Money::new(dec!(500)), Money::new(dec!(300))]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(dec!(800)));
        assert_eq!(Money::new(dec!(500)) * 2, Money::new(dec!(1000)));
    }

    #[test]
    fn test_min_clamps() {
        let base = Money::new(dec!(100));
        let discount = Money::new(dec!(250));
        assert_eq!(discount.min(base), base);
    }
}
