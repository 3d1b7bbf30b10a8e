//! Cart totals.
//!
//! The same [`PricingPolicy`] prices the cart preview and the committed order,
//! so the amount a customer sees is the amount that gets stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    aggregates::{Cart, OrderItem, Product},
    value_objects::{Quantity, TaxRate, TaxRateError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    delivery_charge: Decimal,
    tax_rate: TaxRate,
}

impl PricingPolicy {
    pub fn new(delivery_charge: Decimal, tax_rate: Decimal) -> Result<Self, PricingError> {
        if delivery_charge < Decimal::ZERO {
            return Err(PricingError::NegativeDeliveryCharge(delivery_charge));
        }
        Ok(Self { delivery_charge, tax_rate: TaxRate::new(tax_rate)? })
    }

    pub fn delivery_charge(&self) -> Decimal {
        self.delivery_charge
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate.value()
    }

    /// Prices `(product, quantity)` lines against a catalog snapshot.
    ///
    /// Lines whose product is missing from the catalog contribute nothing.
    /// Shipping is waived when the subtotal is zero and is never taxed.
    pub fn quote<I>(&self, lines: I, catalog: &[Product]) -> CartTotals
    where
        I: IntoIterator<Item = (Uuid, Quantity)>,
    {
        let prices: HashMap<Uuid, Decimal> =
            catalog.iter().map(|p| (p.id, p.unit_price())).collect();

        let subtotal: Decimal = lines
            .into_iter()
            .filter_map(|(id, qty)| prices.get(&id).map(|price| *price * Decimal::from(qty)))
            .sum();

        let shipping_fee = if subtotal.is_zero() { Decimal::ZERO } else { self.delivery_charge };
        let tax = self.tax_rate.apply(subtotal);

        CartTotals { subtotal, shipping_fee, tax, total: subtotal + shipping_fee + tax }
    }

    pub fn quote_cart(&self, cart: &Cart, catalog: &[Product]) -> CartTotals {
        self.quote(cart.entries(), catalog)
    }

    pub fn quote_items(&self, items: &[OrderItem], catalog: &[Product]) -> CartTotals {
        self.quote(items.iter().map(|i| (i.product, i.quantity)), catalog)
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            delivery_charge: Decimal::TEN,
            tax_rate: TaxRate::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Error)]
pub enum PricingError {
    #[error("delivery charge cannot be negative, got {0}")]
    NegativeDeliveryCharge(Decimal),
    #[error(transparent)]
    TaxRate(#[from] TaxRateError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::fixtures::book;

    fn policy(tax_rate: Decimal) -> PricingPolicy {
        PricingPolicy::new(Decimal::TEN, tax_rate).unwrap()
    }

    #[test]
    fn test_quote_breakdown() {
        let a = book("A", Decimal::new(10, 0));
        let b = book("B", Decimal::new(5, 0));
        let cart = Cart::from_entries([(a.id, 2), (b.id, 1)]);

        let totals = policy(Decimal::new(5, 2)).quote_cart(&cart, &[a, b]);

        assert_eq!(totals.subtotal, Decimal::new(25, 0));
        assert_eq!(totals.shipping_fee, Decimal::new(10, 0));
        assert_eq!(totals.tax, Decimal::new(125, 2));
        assert_eq!(totals.total, Decimal::new(3625, 2));
    }

    #[test]
    fn test_empty_cart_is_free() {
        let totals = PricingPolicy::default().quote_cart(&Cart::new(), &[]);
        assert_eq!(totals, CartTotals::default());
    }

    #[test]
    fn test_unknown_products_are_skipped() {
        let a = book("A", Decimal::new(20, 0));
        let cart = Cart::from_entries([(a.id, 1), (Uuid::now_v7(), 4)]);
        let totals = policy(Decimal::new(2, 2)).quote_cart(&cart, &[a]);
        assert_eq!(totals.subtotal, Decimal::new(20, 0));
        assert_eq!(totals.total, Decimal::new(3040, 2));
    }

    #[test]
    fn test_total_identity_holds() {
        let books: Vec<Product> =
            (1..=4).map(|n| book(&format!("B{n}"), Decimal::new(n * 333, 2))).collect();
        let policy = policy(Decimal::new(7, 2));
        for take in 0..=books.len() {
            let cart = Cart::from_entries(books.iter().take(take).map(|b| (b.id, 3)));
            let t = policy.quote_cart(&cart, &books);
            let expected_shipping =
                if t.subtotal.is_zero() { Decimal::ZERO } else { policy.delivery_charge() };
            assert_eq!(t.shipping_fee, expected_shipping);
            assert_eq!(t.tax, (t.subtotal * policy.tax_rate()).round_dp(2));
            assert_eq!(t.total, t.subtotal + t.shipping_fee + t.tax);
        }
    }

    #[test]
    fn test_policy_rejects_bad_constants() {
        assert!(PricingPolicy::new(Decimal::new(-1, 0), Decimal::ZERO).is_err());
        assert!(PricingPolicy::new(Decimal::ZERO, Decimal::TWO).is_err());
    }
}
