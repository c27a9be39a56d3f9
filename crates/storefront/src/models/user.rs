//! User domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fudsiti_core::{AddressId, Email, OrderId, OrderStatus, Phone, UserId, UserRole};

/// A signed-in account as returned by `GET /auth/me` and login.
///
/// The store owns at most one of these and replaces it wholesale on
/// login and logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub phone_verified: bool,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub orders: Vec<OrderSummary>,
}

impl User {
    /// Whether the account can use the seller console.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        matches!(self.role, UserRole::Seller | UserRole::Admin)
    }
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub city: String,
    pub street: String,
    pub house: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Address {
    /// Single-line form used as an order's delivery address.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut line = format!("{}, {}, {}", self.city, self.street, self.house);
        if let Some(apartment) = &self.apartment {
            line.push_str(", apt. ");
            line.push_str(apartment);
        }
        line
    }
}

/// An address as entered by the user, before it has an ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: Option<String>,
    pub comment: Option<String>,
}

impl NewAddress {
    /// Attach an ID, producing a stored [`Address`].
    #[must_use]
    pub fn with_id(self, id: AddressId) -> Address {
        Address {
            id,
            city: self.city,
            street: self.street,
            house: self.house,
            apartment: self.apartment,
            comment: self.comment,
        }
    }
}

/// Compact order entry embedded in the user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub date: NaiveDate,
    /// Number of line items.
    pub items: u32,
}
