//! Aggregates module
pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod ticket;

pub use address::{Address, NewAddress};
pub use cart::Cart;
pub use order::{Order, OrderError, OrderItem, OrderStatus, PaymentMethod, UnknownVariant};
pub use product::{NewProduct, Product, ProductQuery};
pub use ticket::{NewTicket, Ticket, TicketStatus};
