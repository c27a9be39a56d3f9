//! Application state held by the store.
//!
//! [`AppState`] is the whole client-side state: session flags, the signed-in
//! user, the cart, placed orders and transient UI filters. Only the
//! [`PersistedState`] subset is written to durable storage.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::models::{Order, User};

/// Full in-memory state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Signed-in user, if any.
    pub user: Option<User>,
    /// Whether the session is authenticated.
    pub is_authenticated: bool,
    /// Cart contents.
    pub cart: Cart,
    /// Orders placed from this client.
    pub orders: Vec<Order>,
    /// A request is in flight.
    pub is_loading: bool,
    /// Free-text product search.
    pub search_query: String,
    /// Selected catalogue category, `None` for all.
    pub selected_category: Option<String>,
}

impl AppState {
    /// Seed a state from a persisted snapshot; transient fields get defaults.
    #[must_use]
    pub fn from_persisted(persisted: PersistedState) -> Self {
        Self {
            user: persisted.user,
            is_authenticated: persisted.is_authenticated,
            cart: persisted.cart,
            orders: persisted.orders,
            ..Self::default()
        }
    }

    /// The subset of this state that is written to storage.
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            cart: self.cart.clone(),
            orders: self.orders.clone(),
        }
    }
}

/// The durable subset of [`AppState`].
///
/// Serialized with camelCase names: `{user, isAuthenticated, cart, orders}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub cart: Cart,
    pub orders: Vec<Order>,
}
