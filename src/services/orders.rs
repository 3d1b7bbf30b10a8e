//! Order ledger: listings for customers and admins, status changes, deletion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{
        aggregates::{Address, Order, OrderError, OrderStatus, PaymentMethod, Product},
        events::OrderEvent,
        value_objects::Quantity,
    },
    error::{Result, StoreError},
    publisher::EventPublisher,
    store::{AddressStore, CatalogStore, OrderStore},
};

/// An order with its product and address references resolved. References
/// that no longer exist come back as `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderLineDetails>,
    pub amount: Decimal,
    pub address: Option<Address>,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderLineDetails {
    pub product: Option<Product>,
    pub quantity: Quantity,
}

#[derive(Clone)]
pub struct OrderLedger {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogStore>,
    addresses: Arc<dyn AddressStore>,
    events: EventPublisher,
}

impl OrderLedger {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        addresses: Arc<dyn AddressStore>,
        events: EventPublisher,
    ) -> Self {
        Self { orders, catalog, addresses, events }
    }

    pub async fn for_user(&self, user: Uuid) -> Result<Vec<OrderDetails>> {
        let orders = self.orders.list_orders(Some(user)).await?;
        self.populate(orders).await
    }

    pub async fn all(&self) -> Result<Vec<OrderDetails>> {
        let orders = self.orders.list_orders(None).await?;
        self.populate(orders).await
    }

    /// Moves an order along the status lifecycle. Payment state is untouched.
    pub async fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<Order> {
        let mut order = self.orders.get_order(id).await?.ok_or(StoreError::OrderNotFound)?;
        let previous = order.transition(next)?;
        if previous == next {
            return Ok(order);
        }
        if !self.orders.update_order_status(id, previous, next).await? {
            // someone else moved or deleted the order since it was read
            let current = self.orders.get_order(id).await?.ok_or(StoreError::OrderNotFound)?;
            if current.status == next {
                return Ok(current);
            }
            return Err(OrderError::IllegalTransition { from: current.status, to: next }.into());
        }
        info!(order_id = %id, from = %previous, to = %next, "order status updated");
        self.events.publish(OrderEvent::StatusChanged { order_id: id, from: previous, to: next }).await;
        Ok(order)
    }

    /// Hard delete, no audit trail.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.orders.delete_order(id).await? {
            return Err(StoreError::OrderNotFound);
        }
        info!(order_id = %id, "order deleted");
        self.events.publish(OrderEvent::Deleted { order_id: id }).await;
        Ok(())
    }

    async fn populate(&self, orders: Vec<Order>) -> Result<Vec<OrderDetails>> {
        if orders.is_empty() {
            return Ok(vec![]);
        }

        let mut product_ids: Vec<Uuid> =
            orders.iter().flat_map(|o| o.items.iter().map(|i| i.product)).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let mut address_ids: Vec<Uuid> = orders.iter().map(|o| o.address_id).collect();
        address_ids.sort_unstable();
        address_ids.dedup();

        let products: HashMap<Uuid, Product> = self
            .catalog
            .products_by_ids(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let addresses: HashMap<Uuid, Address> = self
            .addresses
            .addresses_by_ids(&address_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(orders
            .into_iter()
            .map(|o| OrderDetails {
                id: o.id,
                user_id: o.user_id,
                items: o
                    .items
                    .iter()
                    .map(|i| OrderLineDetails { product: products.get(&i.product).cloned(), quantity: i.quantity })
                    .collect(),
                amount: o.amount,
                address: addresses.get(&o.address_id).cloned(),
                payment_method: o.payment_method,
                is_paid: o.is_paid,
                status: o.status,
                created_at: o.created_at,
                updated_at: o.updated_at,
            })
            .collect())
    }
}
