//! Persistence ports.
//!
//! Each bounded context gets its own narrow trait so services only see the
//! slice of storage they work with. [`PgStore`] and [`MemoryStore`] implement
//! all of them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    domain::aggregates::{Address, Cart, Order, OrderStatus, Product, Ticket, TicketStatus},
    error::Result,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every product, newest first.
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    /// Products among `ids` that still exist. Order is unspecified.
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn insert_product(&self, product: &Product) -> Result<()>;
    /// Returns `false` when no product has that id.
    async fn update_product(&self, product: &Product) -> Result<bool>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// A user with no stored cart has an empty one.
    async fn load_cart(&self, user: Uuid) -> Result<Cart>;
    /// Replaces the stored cart wholesale.
    async fn save_cart(&self, user: Uuid, cart: &Cart) -> Result<()>;
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn insert_address(&self, address: &Address) -> Result<()>;
    /// Newest first.
    async fn list_addresses(&self, user: Uuid) -> Result<Vec<Address>>;
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>>;
    async fn addresses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Address>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Flips the flag and returns whether the product is now a favorite.
    async fn toggle_favorite(&self, user: Uuid, product: Uuid) -> Result<bool>;
    /// Favorite products that still exist, most recently added first.
    async fn favorite_products(&self, user: Uuid) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Records the order and empties the owner's cart as one unit: either
    /// both happen or neither does.
    async fn place_order(&self, order: &Order) -> Result<()>;
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
    /// Listed orders (cash on delivery or paid), newest first, optionally
    /// restricted to one user.
    async fn list_orders(&self, user: Option<Uuid>) -> Result<Vec<Order>>;
    /// Moves the order from `from` to `to` only if it is still in `from`.
    /// Returns `false` when the order is missing or its status has moved on.
    async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool>;
    async fn delete_order(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()>;
    /// Newest first.
    async fn list_tickets(&self, user: Uuid) -> Result<Vec<Ticket>>;
    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<bool>;
    async fn delete_ticket(&self, id: Uuid) -> Result<bool>;
}

/// Everything a full storefront backend provides.
pub trait Store:
    CatalogStore + CartStore + AddressStore + FavoriteStore + OrderStore + TicketStore
{
}

impl<T> Store for T where
    T: CatalogStore + CartStore + AddressStore + FavoriteStore + OrderStore + TicketStore
{
}
