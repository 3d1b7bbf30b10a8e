//! Client-side cart cache.
//!
//! A [`CartSession`] holds the cart a shopper sees. Changes land locally
//! first so the shopper never waits on the network, then, once signed in,
//! they are pushed to the server. The server copy is authoritative: after
//! every push the session adopts whatever the server returns, and when a push
//! fails it re-fetches the server cart instead of keeping a copy that has
//! silently diverged.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    domain::{
        aggregates::{Cart, Product},
        CartTotals, PricingPolicy,
    },
    error::Result,
    services::CartService,
};

/// Server side of the cart, as seen by a session.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartBackend: Send + Sync {
    async fn fetch_cart(&self, user: Uuid) -> Result<Cart>;

    /// Adds one copy and returns the stored cart.
    async fn push_add(&self, user: Uuid, product: Uuid) -> Result<Cart>;

    /// Sets the quantity (zero or less removes) and returns the stored cart.
    async fn push_quantity(&self, user: Uuid, product: Uuid, quantity: i64) -> Result<Cart>;
}

#[async_trait]
impl CartBackend for CartService {
    async fn fetch_cart(&self, user: Uuid) -> Result<Cart> {
        self.cart(user).await
    }

    async fn push_add(&self, user: Uuid, product: Uuid) -> Result<Cart> {
        self.add_to_cart(user, product).await
    }

    async fn push_quantity(&self, user: Uuid, product: Uuid, quantity: i64) -> Result<Cart> {
        self.update_quantity(user, product, quantity).await
    }
}

/// What happened to a local change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Anonymous session; the change stays local.
    Local,
    /// The server accepted the change.
    Synced,
    /// The push failed and the server cart replaced the local one.
    Reconciled,
    /// Both the push and the re-fetch failed; the local cart may differ
    /// from the server until the next successful sync.
    Stale,
}

pub struct CartSession<B> {
    backend: B,
    user: Option<Uuid>,
    cart: Cart,
    stale: bool,
}

impl<B: CartBackend> CartSession<B> {
    /// An anonymous session with an empty cart.
    pub fn new(backend: B) -> Self {
        Self { backend, user: None, cart: Cart::new(), stale: false }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn user(&self) -> Option<Uuid> {
        self.user
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The server cart replaces whatever was held locally. On failure the
    /// session stays anonymous and keeps its cart.
    pub async fn login(&mut self, user: Uuid) -> Result<()> {
        let cart = self.backend.fetch_cart(user).await?;
        self.user = Some(user);
        self.cart = cart;
        self.stale = false;
        debug!(%user, items = self.cart.item_count(), "cart session signed in");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.cart.clear();
        self.stale = false;
    }

    pub async fn add_to_cart(&mut self, product: Uuid) -> SyncOutcome {
        self.cart.add_one(product);
        let Some(user) = self.user else {
            return SyncOutcome::Local;
        };
        let pushed = self.backend.push_add(user, product).await;
        self.settle(user, pushed).await
    }

    pub async fn update_quantity(&mut self, product: Uuid, quantity: i64) -> SyncOutcome {
        self.cart.set_quantity(product, quantity);
        let Some(user) = self.user else {
            return SyncOutcome::Local;
        };
        let pushed = self.backend.push_quantity(user, product, quantity).await;
        self.settle(user, pushed).await
    }

    pub fn totals(&self, catalog: &[Product], policy: &PricingPolicy) -> CartTotals {
        policy.quote_cart(&self.cart, catalog)
    }

    async fn settle(&mut self, user: Uuid, pushed: Result<Cart>) -> SyncOutcome {
        let err = match pushed {
            Ok(server) => {
                self.cart = server;
                self.stale = false;
                return SyncOutcome::Synced;
            }
            Err(err) => err,
        };

        warn!(%user, error = %err, "cart push failed, reloading server cart");
        match self.backend.fetch_cart(user).await {
            Ok(server) => {
                self.cart = server;
                self.stale = false;
                SyncOutcome::Reconciled
            }
            Err(err) => {
                warn!(%user, error = %err, "cart reload failed, keeping local cart");
                self.stale = true;
                SyncOutcome::Stale
            }
        }
    }
}
