//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::Quantity;

/// Snapshot of one cart entry at checkout time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: Uuid,
    pub quantity: Quantity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub amount: Decimal,
    pub address_id: Uuid,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn create(
        user_id: Uuid,
        items: Vec<OrderItem>,
        amount: Decimal,
        address_id: Uuid,
        payment_method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            items,
            amount,
            address_id,
            payment_method,
            is_paid: false,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Orders show up in listings once they are cash on delivery or paid.
    pub fn is_listed(&self) -> bool {
        self.payment_method == PaymentMethod::Cod || self.is_paid
    }

    /// Moves to `next` if the transition table allows it. Payment state is
    /// never touched.
    pub fn transition(&mut self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        let previous = self.status;
        if !previous.can_transition_to(next) {
            return Err(OrderError::IllegalTransition { from: previous, to: next });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(previous)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step.
    pub fn successors(self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Processing, Self::Shipped, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self == next || self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "COD")]
    Cod,
    /// Hosted gateway, currently under maintenance.
    #[serde(rename = "zarinpal")]
    ZarinPal,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::ZarinPal => "zarinpal",
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Cod)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "zarinpal" | "zarin" => Ok(Self::ZarinPal),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// A stored or submitted string that names no known variant.
#[derive(Debug, Clone, Error)]
#[error("unknown value `{0}`")]
pub struct UnknownVariant(pub String);

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::create(
            Uuid::now_v7(),
            vec![OrderItem { product: Uuid::now_v7(), quantity: Quantity::ONE }],
            Decimal::new(3040, 2),
            Uuid::now_v7(),
            PaymentMethod::Cod,
        )
    }

    #[test]
    fn test_order_workflow() {
        let mut order = order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_paid);
        order.transition(OrderStatus::Processing).unwrap();
        order.transition(OrderStatus::Shipped).unwrap();
        order.transition(OrderStatus::Delivered).unwrap();
        assert!(order.status.is_terminal());
        assert!(!order.is_paid);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut order = order();
        order.transition(OrderStatus::Cancelled).unwrap();
        let err = order.transition(OrderStatus::Shipped).unwrap_err();
        assert_eq!(err.to_string(), "Cannot move order from cancelled to shipped");
        assert_eq!(order.status, OrderStatus::Cancelled);

        let mut order = self::order();
        assert!(order.transition(OrderStatus::Delivered).is_err());
    }

    #[test]
    fn test_same_status_is_noop() {
        let mut order = order();
        assert_eq!(order.transition(OrderStatus::Pending).unwrap(), OrderStatus::Pending);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("Out for delivery".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        assert_eq!("zarin".parse::<PaymentMethod>().unwrap(), PaymentMethod::ZarinPal);
        assert!(!PaymentMethod::ZarinPal.is_available());
    }
}
