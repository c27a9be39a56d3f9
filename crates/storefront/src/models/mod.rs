//! Domain models for the storefront.
//!
//! Field names serialize in camelCase, matching the persisted snapshot and
//! the account payloads returned by the auth API.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::CartItem;
pub use order::{Checkout, Order, OrderUpdate};
pub use product::Product;
pub use session::Session;
pub use user::{Address, NewAddress, OrderSummary, User};
