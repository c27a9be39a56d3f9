//! Shopping cart.
//!
//! The cart is an ordered list of [`CartItem`] lines keyed by product ID.
//! Adding a product that is already present merges into the existing line
//! instead of creating a second one, so there is never more than one line
//! per product.
//!
//! Totals are not stored; they are derived from a product catalogue at read
//! time, grouped by vendor the way the cart page shows them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fudsiti_core::{CurrencyCode, Price, ProductId, VendorId};

use crate::models::{CartItem, Product};

/// The cart contents.
///
/// Deserializing goes through [`Cart::from`], so a snapshot holding two lines
/// for one product loads as a single merged line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a line, merging with an existing line for the same product.
    ///
    /// On merge the quantities are summed and the existing line's unit and
    /// comment are kept; the incoming ones are dropped. The sum saturates
    /// at `Decimal::MAX` instead of overflowing.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self.get_mut(&item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Replace the quantity of a line. No-op if the product is absent.
    ///
    /// Returns whether a line was updated.
    pub fn update(&mut self, product_id: &ProductId, quantity: Decimal) -> bool {
        self.get_mut(product_id)
            .map(|item| item.quantity = quantity)
            .is_some()
    }

    /// Remove a line. No-op if the product is absent.
    ///
    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    fn get_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }

    /// Sum of quantities over all lines, regardless of unit.
    #[must_use]
    pub fn total_quantity(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Group lines by vendor with per-line and per-vendor totals.
    ///
    /// Lines whose product is missing from `catalog` are skipped. Vendors
    /// appear in the order their first line appears in the cart.
    #[must_use]
    pub fn by_vendor(&self, catalog: &[Product]) -> Vec<VendorCart> {
        let mut groups: Vec<VendorCart> = Vec::new();

        for item in &self.items {
            let Some(product) = catalog.iter().find(|p| p.id == item.product_id) else {
                tracing::debug!(product_id = %item.product_id, "cart line not in catalog, skipped");
                continue;
            };

            let line = PricedLine {
                item: item.clone(),
                unit_price: product.unit_price(),
                line_total: product.unit_price().times(item.quantity),
            };

            match groups.iter_mut().find(|g| g.vendor_id == product.vendor_id) {
                Some(group) => {
                    group.total += line.line_total;
                    group.lines.push(line);
                }
                None => groups.push(VendorCart {
                    vendor_id: product.vendor_id.clone(),
                    vendor_name: product.vendor_name.clone(),
                    total: line.line_total,
                    lines: vec![line],
                }),
            }
        }

        groups
    }

    /// Total value of the cart across all vendors.
    #[must_use]
    pub fn total(&self, catalog: &[Product]) -> Price {
        self.by_vendor(catalog)
            .into_iter()
            .fold(Price::zero(CurrencyCode::RUB), |acc, group| acc + group.total)
    }
}

impl From<Vec<CartItem>> for Cart {
    /// Build a cart by adding each line in turn, so duplicates merge.
    fn from(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item);
        }
        cart
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

/// A cart line with its catalogue price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item: CartItem,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Cart lines belonging to one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCart {
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub lines: Vec<PricedLine>,
    pub total: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fudsiti_core::ProductUnit;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(id: &str, vendor: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product {id}"),
            description: String::new(),
            price: dec(price),
            unit: ProductUnit::Kg,
            category: "vegetables".to_string(),
            vendor_id: VendorId::new(vendor),
            vendor_name: format!("vendor {vendor}"),
            vendor_rating: 4.5,
            vendor_return_rate: 1.0,
            images: Vec::new(),
            in_stock: true,
            weight_range: None,
        }
    }

    #[test]
    fn test_add_new_product_appends() {
        let mut cart = Cart::new();
        cart.add(CartItem::new("1", dec("2"), ProductUnit::Kg));
        cart.add(CartItem::new("2", dec("3"), ProductUnit::Piece));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[1].quantity, dec("3"));
    }

    #[test]
    fn test_add_existing_product_sums_quantity() {
        let mut cart = Cart::new();
        cart.add(CartItem::new("1", dec("2"), ProductUnit::Kg));
        cart.add(CartItem::new("1", dec("1.5"), ProductUnit::Kg));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, dec("3.5"));
    }

    #[test]
    fn test_merge_keeps_existing_unit_and_comment() {
        let mut cart = Cart::new();
        cart.add(CartItem::new("1", dec("1"), ProductUnit::Kg).with_comment("ripe"));
        cart.add(CartItem::new("1", dec("2"), ProductUnit::Box).with_comment("green"));

        let line = cart.get(&ProductId::new("1"));
        assert_eq!(line.map(|l| l.unit), Some(ProductUnit::Kg));
        assert_eq!(line.and_then(|l| l.comment.as_deref()), Some("ripe"));
        assert_eq!(line.map(|l| l.quantity), Some(dec("3")));
    }

    #[test]
    fn test_update_only_touches_target() {
        let mut cart = Cart::from(vec![
            CartItem::new("1", dec("1"), ProductUnit::Kg),
            CartItem::new("2", dec("1"), ProductUnit::Kg),
        ]);

        assert!(cart.update(&ProductId::new("2"), dec("5")));
        assert!(!cart.update(&ProductId::new("9"), dec("5")));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, dec("1"));
        assert_eq!(cart.items()[1].quantity, dec("5"));
    }

    #[test]
    fn test_remove_present_and_absent() {
        let mut cart = Cart::from(vec![CartItem::new("1", dec("1"), ProductUnit::Kg)]);

        assert!(!cart.remove(&ProductId::new("2")));
        assert_eq!(cart.len(), 1);
        assert!(cart.remove(&ProductId::new("1")));
        assert!(cart.is_empty());
        assert!(!cart.remove(&ProductId::new("1")));
    }

    #[test]
    fn test_from_vec_merges_duplicates() {
        let cart = Cart::from(vec![
            CartItem::new("1", dec("1"), ProductUnit::Kg),
            CartItem::new("1", dec("1"), ProductUnit::Kg),
        ]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), dec("2"));
    }

    #[test]
    fn test_deserialize_merges_duplicate_lines() {
        let json = r#"[
            {"productId": "1", "quantity": "1", "unit": "kg"},
            {"productId": "1", "quantity": "2", "unit": "kg"}
        ]"#;
        let mut cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, dec("3"));

        cart.update(&ProductId::new("1"), dec("10"));
        assert_eq!(cart.total_quantity(), dec("10"));
        assert_eq!(serde_json::to_value(&cart).unwrap().as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_add_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        cart.add(CartItem::new("1", Decimal::MAX, ProductUnit::Kg));
        cart.add(CartItem::new("1", Decimal::MAX, ProductUnit::Kg));
        cart.add(CartItem::new("2", Decimal::MAX, ProductUnit::Kg));

        assert_eq!(cart.items()[0].quantity, Decimal::MAX);
        assert_eq!(cart.total_quantity(), Decimal::MAX);
    }

    #[test]
    fn test_total_saturates_on_huge_quantities() {
        let catalog = vec![product("1", "a", "120"), product("2", "a", "80")];
        let cart = Cart::from(vec![
            CartItem::new("1", Decimal::MAX, ProductUnit::Kg),
            CartItem::new("2", Decimal::MAX, ProductUnit::Kg),
        ]);
        assert_eq!(cart.total(&catalog).amount, Decimal::MAX);
    }

    #[test]
    fn test_by_vendor_groups_and_totals() {
        let catalog = vec![
            product("1", "a", "120"),
            product("2", "b", "80"),
            product("3", "a", "10"),
        ];
        let cart = Cart::from(vec![
            CartItem::new("1", dec("1.5"), ProductUnit::Kg),
            CartItem::new("2", dec("2"), ProductUnit::Kg),
            CartItem::new("3", dec("3"), ProductUnit::Piece),
            CartItem::new("missing", dec("1"), ProductUnit::Kg),
        ]);

        let groups = cart.by_vendor(&catalog);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].vendor_id, VendorId::new("a"));
        assert_eq!(groups[0].lines.len(), 2);
        assert_eq!(groups[0].total.amount, dec("210"));
        assert_eq!(groups[1].total.amount, dec("160"));
        assert_eq!(cart.total(&catalog).amount, dec("370"));
    }

    #[test]
    fn test_total_of_empty_cart_is_zero() {
        assert_eq!(Cart::new().total(&[]).amount, Decimal::ZERO);
    }
}
