//! Application services, one per bounded context.

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod orders;
pub mod support;

pub use addresses::AddressBook;
pub use cart::{CartService, CartSummary};
pub use catalog::{CatalogService, ProductPage};
pub use checkout::{CheckoutLine, CheckoutService, PlaceOrder};
pub use favorites::Favorites;
pub use orders::{OrderDetails, OrderLedger};
pub use support::SupportDesk;
