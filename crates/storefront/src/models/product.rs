//! Catalogue product type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fudsiti_core::{CurrencyCode, Price, ProductId, ProductUnit, VendorId};

/// A product listed by a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price per `unit`, in roubles.
    pub price: Decimal,
    pub unit: ProductUnit,
    pub category: String,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_rating: f64,
    #[serde(default)]
    pub vendor_return_rate: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_range: Option<String>,
}

const fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Unit price as a [`Price`].
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::RUB)
    }
}
