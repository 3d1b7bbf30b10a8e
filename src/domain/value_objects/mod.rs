//! Value objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of copies of a product in a cart or on an order line. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Anything at or below zero, or too large for a `u32`, is not a quantity.
    pub fn from_signed(value: i64) -> Option<Self> {
        u32::try_from(value).ok().and_then(Self::new)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_signed(value).ok_or(QuantityError(value))
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl From<Quantity> for Decimal {
    fn from(q: Quantity) -> Self {
        Decimal::from(q.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Error)]
#[error("quantity must be a positive integer, got {0}")]
pub struct QuantityError(pub i64);

/// Fraction of the subtotal charged as tax, between 0 and 1 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub fn new(rate: Decimal) -> Result<Self, TaxRateError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(TaxRateError(rate));
        }
        Ok(Self(rate))
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    /// Tax owed on `amount`, rounded to cents.
    pub fn apply(self, amount: Decimal) -> Decimal {
        (amount * self.0).round_dp(2)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self(Decimal::new(5, 2))
    }
}

#[derive(Debug, Clone, Error)]
#[error("tax rate must be between 0 and 1, got {0}")]
pub struct TaxRateError(pub Decimal);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_rejects_non_positive() {
        assert!(Quantity::from_signed(0).is_none());
        assert!(Quantity::from_signed(-3).is_none());
        assert_eq!(Quantity::from_signed(4).map(Quantity::value), Some(4));
    }

    #[test]
    fn test_quantity_deserialize() {
        let q: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(q.value(), 2);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!(TaxRate::new(Decimal::new(5, 2)).is_ok());
        assert!(TaxRate::new(Decimal::new(-1, 2)).is_err());
        assert!(TaxRate::new(Decimal::new(101, 2)).is_err());
    }

    #[test]
    fn test_tax_rate_apply_rounds_to_cents() {
        let rate = TaxRate::new(Decimal::new(5, 2)).unwrap();
        assert_eq!(rate.apply(Decimal::new(25, 0)), Decimal::new(125, 2));
        assert_eq!(rate.apply(Decimal::new(333, 2)), Decimal::new(17, 2));
    }
}
