//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fudsiti_core::{DeliveryMethod, OrderId, OrderStatus, PaymentMethod};

use super::CartItem;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivery_address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
}

/// Partial update applied by `Store::update_order`.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub items: Option<Vec<CartItem>>,
    pub total: Option<Decimal>,
    pub delivery_address: Option<String>,
    pub delivery_method: Option<DeliveryMethod>,
    pub payment_method: Option<PaymentMethod>,
}

impl OrderUpdate {
    /// An update that only changes the status.
    #[must_use]
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether applying this update would change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.items.is_none()
            && self.total.is_none()
            && self.delivery_address.is_none()
            && self.delivery_method.is_none()
            && self.payment_method.is_none()
    }

    /// Merge the set fields into `order` and stamp `updated_at`.
    pub fn apply_to(self, order: &mut Order, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(items) = self.items {
            order.items = items;
        }
        if let Some(total) = self.total {
            order.total = total;
        }
        if let Some(delivery_address) = self.delivery_address {
            order.delivery_address = delivery_address;
        }
        if let Some(delivery_method) = self.delivery_method {
            order.delivery_method = delivery_method;
        }
        if let Some(payment_method) = self.payment_method {
            order.payment_method = payment_method;
        }
        order.updated_at = now;
    }
}

/// Checkout choices used by `Store::place_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub delivery_address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
}
