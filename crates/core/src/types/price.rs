//! Type-safe price representation using decimal arithmetic.
//!
//! All listings on the marketplace are priced in rubles. Amounts are stored
//! in the standard unit (rubles, not kopecks) and serialize as JSON numbers
//! because that is how the backend's `numeric` columns come back.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A ruble amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero rubles.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rubles.
    #[must_use]
    pub fn rubles(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₽{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::rubles(1500).to_string(), "₽1500.00");
        assert_eq!(Price::new(Decimal::new(19_99, 2)).to_string(), "₽19.99");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::rubles(100).times(3), Price::new(Decimal::new(250, 1))]
            .into_iter()
            .sum();
        assert_eq!(total, Price::rubles(325));
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("1299.5").unwrap();
        assert_eq!(price, Price::new(Decimal::new(12995, 1)));
        assert_eq!(serde_json::to_string(&price).unwrap(), "1299.5");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::rubles(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
