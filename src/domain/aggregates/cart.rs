//! Cart Aggregate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::value_objects::Quantity;

/// A user's cart: product id to a positive quantity.
///
/// Serializes as a plain `{ "<productId>": quantity }` object. Entries whose
/// quantity is zero or negative are dropped when a cart is deserialized, so a
/// stored cart never holds them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Uuid, i64>", into = "BTreeMap<Uuid, u32>")]
pub struct Cart {
    items: BTreeMap<Uuid, Quantity>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Uuid, i64)>) -> Self {
        let items = entries
            .into_iter()
            .filter_map(|(id, qty)| Quantity::from_signed(qty).map(|q| (id, q)))
            .collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total number of copies across all products.
    pub fn item_count(&self) -> u64 {
        self.items.values().map(|q| u64::from(q.value())).sum()
    }

    pub fn quantity_of(&self, product_id: Uuid) -> Option<Quantity> {
        self.items.get(&product_id).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Uuid, Quantity)> + '_ {
        self.items.iter().map(|(id, q)| (*id, *q))
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        self.items.keys().copied().collect()
    }

    /// Adds one copy, creating the entry if needed.
    pub fn add_one(&mut self, product_id: Uuid) -> Quantity {
        let q = self
            .items
            .get(&product_id)
            .map_or(Quantity::ONE, |q| q.increment());
        self.items.insert(product_id, q);
        q
    }

    /// Sets the quantity directly; zero or below removes the entry.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i64) -> Option<Quantity> {
        match Quantity::from_signed(quantity) {
            Some(q) => {
                self.items.insert(product_id, q);
                Some(q)
            }
            None => {
                self.items.remove(&product_id);
                None
            }
        }
    }

    pub fn remove(&mut self, product_id: Uuid) -> bool {
        self.items.remove(&product_id).is_some()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl From<BTreeMap<Uuid, i64>> for Cart {
    fn from(raw: BTreeMap<Uuid, i64>) -> Self {
        Self::from_entries(raw)
    }
}

impl From<Cart> for BTreeMap<Uuid, u32> {
    fn from(cart: Cart) -> Self {
        cart.items.into_iter().map(|(id, q)| (id, q.value())).collect()
    }
}
