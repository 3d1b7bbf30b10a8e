//! In-process store used for development runs and tests.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AddressStore, CartStore, CatalogStore, FavoriteStore, OrderStore, TicketStore};
use crate::{
    domain::aggregates::{Address, Cart, Order, OrderStatus, Product, Ticket, TicketStatus},
    error::Result,
};

#[derive(Debug, Default)]
struct State {
    products: HashMap<Uuid, Product>,
    carts: HashMap<Uuid, Cart>,
    addresses: HashMap<Uuid, Address>,
    /// user -> products in the order they were favorited
    favorites: HashMap<Uuid, Vec<Uuid>>,
    orders: HashMap<Uuid, Order>,
    tickets: HashMap<Uuid, Ticket>,
}

/// All data behind one lock, so multi-record writes are atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; ids are v7 so they break timestamp ties in creation order.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.state.read().await.products.values().cloned().collect();
        newest_first(&mut products, |p| (p.created_at, p.id));
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.products.get(id).cloned()).collect())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.state.write().await.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.products.remove(&id).is_none() {
            return Ok(false);
        }
        for cart in state.carts.values_mut() {
            cart.remove(id);
        }
        for favorites in state.favorites.values_mut() {
            favorites.retain(|p| *p != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load_cart(&self, user: Uuid) -> Result<Cart> {
        Ok(self.state.read().await.carts.get(&user).cloned().unwrap_or_default())
    }

    async fn save_cart(&self, user: Uuid, cart: &Cart) -> Result<()> {
        self.state.write().await.carts.insert(user, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn insert_address(&self, address: &Address) -> Result<()> {
        self.state.write().await.addresses.insert(address.id, address.clone());
        Ok(())
    }

    async fn list_addresses(&self, user: Uuid) -> Result<Vec<Address>> {
        let state = self.state.read().await;
        let mut addresses: Vec<Address> =
            state.addresses.values().filter(|a| a.user_id == user).cloned().collect();
        newest_first(&mut addresses, |a| (a.created_at, a.id));
        Ok(addresses)
    }

    async fn get_address(&self, id: Uuid) -> Result<Option<Address>> {
        Ok(self.state.read().await.addresses.get(&id).cloned())
    }

    async fn addresses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Address>> {
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.addresses.get(id).cloned()).collect())
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn toggle_favorite(&self, user: Uuid, product: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let favorites = state.favorites.entry(user).or_default();
        if let Some(pos) = favorites.iter().position(|p| *p == product) {
            favorites.remove(pos);
            Ok(false)
        } else {
            favorites.push(product);
            Ok(true)
        }
    }

    async fn favorite_products(&self, user: Uuid) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let Some(favorites) = state.favorites.get(&user) else {
            return Ok(vec![]);
        };
        Ok(favorites
            .iter()
            .rev()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place_order(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.insert(order.id, order.clone());
        state.carts.remove(&order.user_id);
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, user: Option<Uuid>) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.is_listed() && user.map_or(true, |u| o.user_id == u))
            .cloned()
            .collect();
        newest_first(&mut orders, |o| (o.created_at, o.id));
        Ok(orders)
    }

    async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&id) {
            Some(order) if order.status == from => {
                order.status = to;
                order.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.orders.remove(&id).is_some())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.state.write().await.tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn list_tickets(&self, user: Uuid) -> Result<Vec<Ticket>> {
        let state = self.state.read().await;
        let mut tickets: Vec<Ticket> =
            state.tickets.values().filter(|t| t.user_id == user).cloned().collect();
        newest_first(&mut tickets, |t| (t.created_at, t.id));
        Ok(tickets)
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.tickets.get_mut(&id) {
            Some(ticket) => {
                ticket.status = status;
                ticket.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_ticket(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.tickets.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::domain::{
        aggregates::{product::fixtures::book, OrderItem, PaymentMethod},
        value_objects::Quantity,
    };

    #[tokio::test]
    async fn place_order_clears_only_the_owners_cart() -> TestResult {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        let product = Uuid::now_v7();
        store.save_cart(alice, &Cart::from_entries([(product, 2)])).await?;
        store.save_cart(bob, &Cart::from_entries([(product, 1)])).await?;

        let order = Order::create(
            alice,
            vec![OrderItem { product, quantity: Quantity::ONE }],
            Decimal::TEN,
            Uuid::now_v7(),
            PaymentMethod::Cod,
        );
        store.place_order(&order).await?;

        assert!(store.load_cart(alice).await?.is_empty());
        assert_eq!(store.load_cart(bob).await?.line_count(), 1);
        assert_eq!(store.list_orders(Some(alice)).await?.len(), 1);
        assert!(store.list_orders(Some(bob)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unpaid_gateway_orders_are_not_listed() -> TestResult {
        let store = MemoryStore::new();
        let mut order = Order::create(Uuid::now_v7(), vec![], Decimal::ONE, Uuid::now_v7(), PaymentMethod::ZarinPal);
        store.place_order(&order).await?;
        assert!(store.list_orders(None).await?.is_empty());

        order.is_paid = true;
        store.place_order(&order).await?;
        assert_eq!(store.list_orders(None).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn status_update_only_applies_from_the_expected_status() -> TestResult {
        let store = MemoryStore::new();
        let order = Order::create(Uuid::now_v7(), vec![], Decimal::ONE, Uuid::now_v7(), PaymentMethod::Cod);
        store.place_order(&order).await?;

        let (cancel, process) = tokio::join!(
            store.update_order_status(order.id, OrderStatus::Pending, OrderStatus::Cancelled),
            store.update_order_status(order.id, OrderStatus::Pending, OrderStatus::Processing),
        );
        assert!(cancel? ^ process?);

        let stored = store.get_order(order.id).await?.unwrap();
        assert_ne!(stored.status, OrderStatus::Pending);
        assert!(!store.update_order_status(Uuid::now_v7(), OrderStatus::Pending, OrderStatus::Shipped).await?);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_product_cascades_to_carts_and_favorites() -> TestResult {
        let store = MemoryStore::new();
        let user = Uuid::now_v7();
        let p = book("Dune", Decimal::TEN);
        store.insert_product(&p).await?;
        store.save_cart(user, &Cart::from_entries([(p.id, 1)])).await?;
        assert!(store.toggle_favorite(user, p.id).await?);

        assert!(store.delete_product(p.id).await?);

        assert!(store.load_cart(user).await?.is_empty());
        assert!(store.favorite_products(user).await?.is_empty());
        assert!(!store.delete_product(p.id).await?);
        Ok(())
    }
}
