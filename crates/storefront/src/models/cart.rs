//! Cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fudsiti_core::{ProductId, ProductUnit};

/// One cart line. The cart holds at most one line per `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    /// Expected to be positive; the cart itself does not enforce this.
    pub quantity: Decimal,
    pub unit: ProductUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CartItem {
    /// Create a line without a comment.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: Decimal, unit: ProductUnit) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit,
            comment: None,
        }
    }

    /// Attach a comment for the seller.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
