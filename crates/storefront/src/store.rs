//! The store: single owner of the client-side state.
//!
//! A [`Store`] is created once with [`Store::load`], which rehydrates from
//! the snapshot storage, and then passed by reference to whatever needs it.
//! Every mutator:
//!
//! 1. applies the change to a copy of the current state,
//! 2. publishes the new state to subscribers (`tokio::sync::watch`),
//! 3. writes the persisted subset through to storage.
//!
//! Mutators never fail. A failed write-through is logged and the in-memory
//! state is kept; call [`Store::save`] to retry and see the error.

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use fudsiti_core::{AddressId, OrderId, OrderStatus, ProductId};

use crate::cart::Cart;
use crate::catalog;
use crate::models::{Address, CartItem, Checkout, NewAddress, Order, OrderUpdate, Product, User};
use crate::persistence::{self, DEFAULT_KEY, PersistError, SnapshotStorage};
use crate::state::AppState;

/// Errors from the seller order workflow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// No order with this ID.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The workflow does not allow this move.
    #[error("order {id} cannot move from {from} to {to}")]
    NotAllowed {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The order is delivered or cancelled.
    #[error("order {id} is already {status}")]
    Terminal { id: OrderId, status: OrderStatus },
}

/// Client-side state container with write-through persistence.
pub struct Store<S> {
    storage: S,
    key: String,
    state: watch::Sender<AppState>,
}

impl<S: SnapshotStorage> Store<S> {
    /// Rehydrate from the default snapshot key.
    ///
    /// A missing or malformed snapshot yields an empty state.
    #[must_use]
    pub fn load(storage: S) -> Self {
        Self::load_with_key(storage, DEFAULT_KEY)
    }

    /// Rehydrate from a specific snapshot key.
    #[must_use]
    pub fn load_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = persistence::load(&storage, &key)
            .map(AppState::from_persisted)
            .unwrap_or_default();

        tracing::debug!(
            key = %key,
            cart_lines = state.cart.len(),
            orders = state.orders.len(),
            authenticated = state.is_authenticated,
            "store loaded"
        );

        let (sender, _) = watch::channel(state);
        Self {
            storage,
            key,
            state: sender,
        }
    }

    /// Snapshot key this store writes to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the persisted subset now.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if encoding or the backend write fails.
    pub fn save(&mut self) -> Result<(), PersistError> {
        let persisted = self.state.borrow().persisted();
        persistence::save(&mut self.storage, &self.key, &persisted)
    }

    /// Delete the snapshot and return to an empty state.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backend cannot remove the snapshot.
    /// The in-memory state is reset either way.
    pub fn reset(&mut self) -> Result<(), PersistError> {
        self.state.send_replace(AppState::default());
        self.storage.remove(&self.key)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A clone of the full current state.
    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.borrow();
        f(&*state)
    }

    /// Receive every new state after each mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn cart(&self) -> Cart {
        self.read(|s| s.cart.clone())
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.read(|s| s.orders.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.is_authenticated)
    }

    /// Products matching the current search query and category.
    #[must_use]
    pub fn visible_products<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        self.read(|s| catalog::filter(products, &s.search_query, s.selected_category.as_deref()))
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn set_user(&mut self, user: Option<User>) {
        self.commit("set_user", |s| s.user = user);
    }

    pub fn set_authenticated(&mut self, is_authenticated: bool) {
        self.commit("set_authenticated", |s| s.is_authenticated = is_authenticated);
    }

    /// Replace the user and mark the session authenticated.
    pub fn login(&mut self, user: User) {
        tracing::info!(user_id = %user.id, role = %user.role, "user signed in");
        self.commit("login", |s| {
            s.user = Some(user);
            s.is_authenticated = true;
        });
    }

    /// Clear the user and the authenticated flag. The cart is kept.
    pub fn logout(&mut self) {
        self.commit("logout", |s| {
            s.user = None;
            s.is_authenticated = false;
        });
    }

    /// Save an address on the signed-in user's profile.
    ///
    /// Returns the stored address, or `None` when nobody is signed in.
    pub fn add_address(&mut self, address: NewAddress) -> Option<Address> {
        let address = address.with_id(AddressId::new(Uuid::new_v4().to_string()));
        self.commit("add_address", |s| {
            let user = s.user.as_mut()?;
            user.addresses.push(address.clone());
            Some(address)
        })
    }

    /// Remove an address from the signed-in user's profile.
    ///
    /// Returns whether an address was removed.
    pub fn remove_address(&mut self, id: &AddressId) -> bool {
        self.commit("remove_address", |s| {
            s.user.as_mut().is_some_and(|user| {
                let before = user.addresses.len();
                user.addresses.retain(|a| &a.id != id);
                user.addresses.len() != before
            })
        })
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add a line, merging with an existing line for the same product.
    pub fn add_to_cart(&mut self, item: CartItem) {
        self.commit("add_to_cart", |s| s.cart.add(item));
    }

    /// Replace a line's quantity. No-op if the product is absent.
    pub fn update_cart_item(&mut self, product_id: &ProductId, quantity: Decimal) {
        self.commit("update_cart_item", |s| {
            s.cart.update(product_id, quantity);
        });
    }

    /// Remove a line. No-op if the product is absent.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        self.commit("remove_from_cart", |s| {
            s.cart.remove(product_id);
        });
    }

    pub fn clear_cart(&mut self) {
        self.commit("clear_cart", |s| s.cart.clear());
    }

    // =========================================================================
    // Orders
    // =========================================================================

    pub fn add_order(&mut self, order: Order) {
        self.commit("add_order", |s| s.orders.push(order));
    }

    /// Apply a partial update to an order.
    ///
    /// Returns whether an order with `id` exists.
    pub fn update_order(&mut self, id: &OrderId, update: OrderUpdate) -> bool {
        let now = Utc::now();
        self.commit("update_order", |s| {
            s.orders
                .iter_mut()
                .find(|o| &o.id == id)
                .map(|order| update.apply_to(order, now))
                .is_some()
        })
    }

    /// Set an order's status without workflow checks.
    pub fn set_order_status(&mut self, id: &OrderId, status: OrderStatus) -> bool {
        self.update_order(id, OrderUpdate::status(status))
    }

    /// Move an order to `target` if the seller workflow allows it.
    ///
    /// Returns the previous status.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the order is unknown, terminal, or the
    /// move skips a step.
    pub fn transition_order(
        &mut self,
        id: &OrderId,
        target: OrderStatus,
    ) -> Result<OrderStatus, TransitionError> {
        let current = self
            .read(|s| s.orders.iter().find(|o| &o.id == id).map(|o| o.status))
            .ok_or_else(|| TransitionError::NotFound(id.clone()))?;

        if current.is_terminal() {
            return Err(TransitionError::Terminal {
                id: id.clone(),
                status: current,
            });
        }
        if !current.can_transition_to(target) {
            return Err(TransitionError::NotAllowed {
                id: id.clone(),
                from: current,
                to: target,
            });
        }

        self.set_order_status(id, target);
        tracing::info!(order_id = %id, from = %current, to = %target, "order status changed");
        Ok(current)
    }

    /// Move an order one step forward on the workflow.
    ///
    /// Returns the new status.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the order is unknown or terminal.
    pub fn advance_order(&mut self, id: &OrderId) -> Result<OrderStatus, TransitionError> {
        let current = self
            .read(|s| s.orders.iter().find(|o| &o.id == id).map(|o| o.status))
            .ok_or_else(|| TransitionError::NotFound(id.clone()))?;
        let next = current.next().ok_or_else(|| TransitionError::Terminal {
            id: id.clone(),
            status: current,
        })?;
        self.transition_order(id, next)?;
        Ok(next)
    }

    /// Turn the cart into a pending order and empty the cart.
    ///
    /// The total is priced from `catalog`; lines missing from it count as
    /// zero. Returns `None` and changes nothing if the cart is empty.
    pub fn place_order(&mut self, checkout: Checkout, catalog: &[Product]) -> Option<Order> {
        let cart = self.cart();
        if cart.is_empty() {
            return None;
        }

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(Uuid::new_v4().to_string()),
            status: OrderStatus::Pending,
            items: cart.items().to_vec(),
            total: cart.total(catalog).amount,
            created_at: now,
            updated_at: now,
            delivery_address: checkout.delivery_address,
            delivery_method: checkout.delivery_method,
            payment_method: checkout.payment_method,
        };

        tracing::info!(order_id = %order.id, lines = order.items.len(), total = %order.total, "order placed");
        self.commit("place_order", |s| {
            s.orders.push(order.clone());
            s.cart.clear();
        });
        Some(order)
    }

    // =========================================================================
    // UI state (not persisted)
    // =========================================================================

    pub fn set_loading(&mut self, is_loading: bool) {
        self.commit("set_loading", |s| s.is_loading = is_loading);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.commit("set_search_query", |s| s.search_query = query);
    }

    pub fn set_selected_category(&mut self, category: Option<String>) {
        self.commit("set_selected_category", |s| s.selected_category = category);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn commit<R>(&mut self, action: &'static str, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut next = self.state.borrow().clone();
        let result = f(&mut next);
        self.state.send_replace(next);
        tracing::debug!(action, "store updated");

        if let Err(e) = self.save() {
            tracing::warn!(action, key = %self.key, error = %e, "failed to persist store snapshot");
        }
        result
    }
}
