//! Bookstore Storefront
//!
//! Back end for an online bookstore.
//!
//! ## Features
//! - Product catalog with admin management
//! - Server-side carts and a client cart cache that reconciles with them
//! - Cart totals from one shared pricing policy
//! - Cash-on-delivery checkout, atomic with clearing the cart
//! - Order status ledger for admins
//! - Addresses, favorites and support tickets

use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod publisher;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;
pub use domain::{CartTotals, PricingPolicy};
pub use error::{Result, StoreError};
pub use publisher::EventPublisher;
pub use session::{CartBackend, CartSession, SyncOutcome};

use services::{
    AddressBook, CartService, CatalogService, CheckoutService, Favorites, OrderLedger, SupportDesk,
};
use store::Store;

/// Values the server is started with that are not storage.
#[derive(Clone, Debug)]
pub struct Settings {
    pub pricing: PricingPolicy,
    pub currency: String,
    pub admin_token: String,
}

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub addresses: AddressBook,
    pub checkout: CheckoutService,
    pub orders: OrderLedger,
    pub favorites: Favorites,
    pub support: SupportDesk,
    pub pricing: PricingPolicy,
    pub currency: Arc<str>,
    admin_token: Arc<str>,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, events: EventPublisher, settings: Settings) -> Self {
        let pricing = settings.pricing;
        Self {
            catalog: CatalogService::new(store.clone(), events.clone()),
            carts: CartService::new(store.clone(), store.clone(), pricing),
            addresses: AddressBook::new(store.clone()),
            checkout: CheckoutService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                pricing,
                events.clone(),
            ),
            orders: OrderLedger::new(store.clone(), store.clone(), store.clone(), events),
            favorites: Favorites::new(store.clone(), store.clone()),
            support: SupportDesk::new(store),
            pricing,
            currency: settings.currency.into(),
            admin_token: settings.admin_token.into(),
        }
    }

    /// An empty configured token never matches.
    pub fn is_admin_token(&self, token: &str) -> bool {
        !self.admin_token.is_empty() && *self.admin_token == *token
    }
}
