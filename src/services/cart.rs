//! Server-side cart, the authoritative copy for signed-in users.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::{aggregates::Cart, CartTotals, PricingPolicy},
    error::{Result, StoreError},
    store::{CartStore, CatalogStore},
};

/// A cart together with its priced breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub cart_data: Cart,
    pub item_count: u64,
    pub totals: CartTotals,
}

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogStore>,
    pricing: PricingPolicy,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, catalog: Arc<dyn CatalogStore>, pricing: PricingPolicy) -> Self {
        Self { carts, catalog, pricing }
    }

    pub async fn cart(&self, user: Uuid) -> Result<Cart> {
        self.carts.load_cart(user).await
    }

    /// One more copy of `product`.
    pub async fn add_to_cart(&self, user: Uuid, product: Uuid) -> Result<Cart> {
        self.ensure_product(product).await?;
        let mut cart = self.carts.load_cart(user).await?;
        let quantity = cart.add_one(product);
        self.carts.save_cart(user, &cart).await?;
        debug!(%user, %product, %quantity, "cart item added");
        Ok(cart)
    }

    /// Sets the quantity outright; zero or less removes the line.
    pub async fn update_quantity(&self, user: Uuid, product: Uuid, quantity: i64) -> Result<Cart> {
        if quantity > 0 {
            self.ensure_product(product).await?;
        }
        let mut cart = self.carts.load_cart(user).await?;
        cart.set_quantity(product, quantity);
        self.carts.save_cart(user, &cart).await?;
        debug!(%user, %product, quantity, "cart quantity updated");
        Ok(cart)
    }

    pub async fn summary(&self, user: Uuid) -> Result<CartSummary> {
        let cart = self.carts.load_cart(user).await?;
        let totals = self.quote(&cart).await?;
        Ok(CartSummary { item_count: cart.item_count(), cart_data: cart, totals })
    }

    /// Prices any cart, including an anonymous one held by the client.
    pub async fn quote(&self, cart: &Cart) -> Result<CartTotals> {
        let ids = cart.product_ids();
        let catalog = if ids.is_empty() { vec![] } else { self.catalog.products_by_ids(&ids).await? };
        Ok(self.pricing.quote_cart(cart, &catalog))
    }

    async fn ensure_product(&self, product: Uuid) -> Result<()> {
        match self.catalog.get_product(product).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::ProductNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{aggregates::product::fixtures::book, value_objects::Quantity},
        store::MemoryStore,
    };

    async fn setup() -> (CartService, MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::new();
        let a = book("A", Decimal::new(10, 0));
        let b = book("B", Decimal::new(5, 0));
        store.insert_product(&a).await.unwrap();
        store.insert_product(&b).await.unwrap();
        let service = CartService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            PricingPolicy::new(Decimal::TEN, Decimal::new(5, 2)).unwrap(),
        );
        (service, store, a.id, b.id)
    }

    #[tokio::test]
    async fn adding_twice_yields_quantity_two() -> TestResult {
        let (carts, _, a, _) = setup().await;
        let user = Uuid::now_v7();
        carts.add_to_cart(user, a).await?;
        let cart = carts.add_to_cart(user, a).await?;
        assert_eq!(cart.quantity_of(a).map(Quantity::value), Some(2));
        assert_eq!(carts.cart(user).await?, cart);
        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_removes_line() -> TestResult {
        let (carts, _, a, _) = setup().await;
        let user = Uuid::now_v7();
        carts.update_quantity(user, a, 3).await?;
        let cart = carts.update_quantity(user, a, 0).await?;
        assert!(cart.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_rejected() {
        let (carts, _, _, _) = setup().await;
        let user = Uuid::now_v7();
        let result = carts.add_to_cart(user, Uuid::now_v7()).await;
        assert!(matches!(result, Err(StoreError::ProductNotFound)));
        // removing something that never existed is harmless
        assert!(carts.update_quantity(user, Uuid::now_v7(), -1).await.is_ok());
    }

    #[tokio::test]
    async fn summary_prices_the_stored_cart() -> TestResult {
        let (carts, _, a, b) = setup().await;
        let user = Uuid::now_v7();
        carts.update_quantity(user, a, 2).await?;
        carts.add_to_cart(user, b).await?;

        let summary = carts.summary(user).await?;

        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.totals.subtotal, Decimal::new(25, 0));
        assert_eq!(summary.totals.total, Decimal::new(3625, 2));
        Ok(())
    }
}
