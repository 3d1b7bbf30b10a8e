//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{OrderStatus, PaymentMethod};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid },
    Updated { product_id: Uuid },
    Deleted { product_id: Uuid },
    StockChanged { product_id: Uuid, in_stock: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, user_id: Uuid, amount: Decimal, payment_method: PaymentMethod },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
    Deleted { order_id: Uuid },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "bookstore.products.created",
            Self::Product(ProductEvent::Updated { .. }) => "bookstore.products.updated",
            Self::Product(ProductEvent::Deleted { .. }) => "bookstore.products.deleted",
            Self::Product(ProductEvent::StockChanged { .. }) => "bookstore.products.stock_changed",
            Self::Order(OrderEvent::Placed { .. }) => "bookstore.orders.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "bookstore.orders.status_changed",
            Self::Order(OrderEvent::Deleted { .. }) => "bookstore.orders.deleted",
        }
    }
}

impl From<ProductEvent> for DomainEvent {
    fn from(e: ProductEvent) -> Self {
        Self::Product(e)
    }
}

impl From<OrderEvent> for DomainEvent {
    fn from(e: OrderEvent) -> Self {
        Self::Order(e)
    }
}
