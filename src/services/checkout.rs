//! Order placement.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{
        aggregates::{Order, OrderItem, PaymentMethod, Product},
        events::OrderEvent,
        value_objects::Quantity,
        PricingPolicy,
    },
    error::{Result, StoreError},
    publisher::EventPublisher,
    store::{AddressStore, CatalogStore, OrderStore},
};

/// One requested line, as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub items: Vec<CheckoutLine>,
    pub address: Option<Uuid>,
    pub payment_method: PaymentMethod,
}

#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStore>,
    addresses: Arc<dyn AddressStore>,
    orders: Arc<dyn OrderStore>,
    pricing: PricingPolicy,
    events: EventPublisher,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        addresses: Arc<dyn AddressStore>,
        orders: Arc<dyn OrderStore>,
        pricing: PricingPolicy,
        events: EventPublisher,
    ) -> Self {
        Self { catalog, addresses, orders, pricing, events }
    }

    /// Validates the request, prices it with the shared policy and stores the
    /// order while emptying the user's cart in the same write. Nothing is
    /// written unless every check passes.
    pub async fn place_order(&self, user: Uuid, request: PlaceOrder) -> Result<Order> {
        let address_id = request.address.ok_or(StoreError::MissingAddress)?;
        if !request.payment_method.is_available() {
            return Err(StoreError::PaymentUnavailable(request.payment_method));
        }
        if request.items.is_empty() {
            return Err(StoreError::EmptyOrder);
        }

        let items = request
            .items
            .iter()
            .map(|line| {
                Quantity::from_signed(line.quantity)
                    .map(|quantity| OrderItem { product: line.product, quantity })
                    .ok_or(StoreError::InvalidQuantity)
            })
            .collect::<Result<Vec<_>>>()?;

        let catalog = self.resolve_products(&items).await?;

        let address = self.addresses.get_address(address_id).await?;
        if address.map_or(true, |a| a.user_id != user) {
            return Err(StoreError::AddressNotFound);
        }

        let totals = self.pricing.quote_items(&items, &catalog);
        let order = Order::create(user, items, totals.total, address_id, request.payment_method);
        self.orders.place_order(&order).await?;

        info!(order_id = %order.id, %user, amount = %order.amount, "order placed");
        self.events
            .publish(OrderEvent::Placed {
                order_id: order.id,
                user_id: user,
                amount: order.amount,
                payment_method: order.payment_method,
            })
            .await;
        Ok(order)
    }

    /// Every line must name an existing, in-stock product.
    async fn resolve_products(&self, items: &[OrderItem]) -> Result<Vec<Product>> {
        let mut ids: Vec<Uuid> = items.iter().map(|i| i.product).collect();
        ids.sort_unstable();
        ids.dedup();

        let products = self.catalog.products_by_ids(&ids).await?;
        let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
        for item in items {
            match by_id.get(&item.product) {
                None => return Err(StoreError::ProductNotFound),
                Some(p) if !p.in_stock => return Err(StoreError::OutOfStock(p.name.clone())),
                Some(_) => {}
            }
        }
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            aggregates::{
                address::fixtures::new_address, product::fixtures::book, Address, Cart, OrderStatus,
            },
            events::DomainEvent,
        },
        store::{CartStore, MemoryStore},
    };

    struct Fixture {
        store: MemoryStore,
        checkout: CheckoutService,
        events: Arc<std::sync::Mutex<Vec<DomainEvent>>>,
        user: Uuid,
        address: Uuid,
        product: Product,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let (publisher, events) = EventPublisher::recording();
        let pricing = PricingPolicy::new(Decimal::TEN, Decimal::new(2, 2)).unwrap();
        let checkout = CheckoutService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            pricing,
            publisher,
        );
        let user = Uuid::now_v7();
        let address = Address::create(user, new_address());
        store.insert_address(&address).await.unwrap();
        let product = book("A", Decimal::new(20, 0));
        store.insert_product(&product).await.unwrap();
        store.save_cart(user, &Cart::from_entries([(product.id, 1)])).await.unwrap();
        Fixture { store, checkout, events, user, address: address.id, product }
    }

    fn cod(items: Vec<CheckoutLine>, address: Option<Uuid>) -> PlaceOrder {
        PlaceOrder { items, address, payment_method: PaymentMethod::Cod }
    }

    #[tokio::test]
    async fn cod_order_is_priced_stored_and_clears_cart() -> TestResult {
        let f = fixture().await;
        let line = CheckoutLine { product: f.product.id, quantity: 1 };

        let order = f.checkout.place_order(f.user, cod(vec![line], Some(f.address))).await?;

        // 20 + 10 delivery + 20 * 0.02 tax
        assert_eq!(order.amount, Decimal::new(3040, 2));
        assert_eq!(order.payment_method, PaymentMethod::Cod);
        assert!(!order.is_paid);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(f.store.load_cart(f.user).await?.is_empty());
        assert_eq!(f.store.list_orders(Some(f.user)).await?, vec![order]);
        assert_eq!(f.events.lock().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_address_is_rejected_before_anything_is_written() -> TestResult {
        let f = fixture().await;
        let line = CheckoutLine { product: f.product.id, quantity: 1 };

        let result = f.checkout.place_order(f.user, cod(vec![line], None)).await;

        assert!(matches!(result, Err(StoreError::MissingAddress)));
        assert!(f.store.list_orders(None).await?.is_empty());
        assert_eq!(f.store.load_cart(f.user).await?.line_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn zarinpal_reports_maintenance_without_side_effects() -> TestResult {
        let f = fixture().await;
        let request = PlaceOrder {
            items: vec![CheckoutLine { product: f.product.id, quantity: 1 }],
            address: Some(f.address),
            payment_method: PaymentMethod::ZarinPal,
        };

        let err = f.checkout.place_order(f.user, request).await.unwrap_err();

        assert_eq!(err.to_string(), "Zarinpal is currently under maintenance.");
        assert!(f.store.list_orders(None).await?.is_empty());
        assert_eq!(f.store.load_cart(f.user).await?.line_count(), 1);
        assert!(f.events.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_orders_are_rejected() {
        let f = fixture().await;
        let result = f.checkout.place_order(f.user, cod(vec![], Some(f.address))).await;
        assert!(matches!(result, Err(StoreError::EmptyOrder)));
    }

    #[tokio::test]
    async fn bad_lines_are_rejected() -> TestResult {
        let f = fixture().await;

        let zero = cod(vec![CheckoutLine { product: f.product.id, quantity: 0 }], Some(f.address));
        assert!(matches!(f.checkout.place_order(f.user, zero).await, Err(StoreError::InvalidQuantity)));

        let ghost = cod(vec![CheckoutLine { product: Uuid::now_v7(), quantity: 1 }], Some(f.address));
        assert!(matches!(f.checkout.place_order(f.user, ghost).await, Err(StoreError::ProductNotFound)));

        let mut sold_out = f.product.clone();
        sold_out.in_stock = false;
        f.store.update_product(&sold_out).await?;
        let request = cod(vec![CheckoutLine { product: f.product.id, quantity: 1 }], Some(f.address));
        let err = f.checkout.place_order(f.user, request).await.unwrap_err();
        assert_eq!(err.to_string(), "A is out of stock");

        assert!(f.store.list_orders(None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn someone_elses_address_is_not_found() {
        let f = fixture().await;
        let line = CheckoutLine { product: f.product.id, quantity: 1 };
        let result = f.checkout.place_order(Uuid::now_v7(), cod(vec![line], Some(f.address))).await;
        assert!(matches!(result, Err(StoreError::AddressNotFound)));
    }
}
