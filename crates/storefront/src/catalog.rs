//! Product catalogue filtering.
//!
//! The storefront keeps a free-text search query and an optional category in
//! the store; these helpers apply them to a product list. Products come from
//! the caller, the store never owns catalogue data.

use crate::models::Product;

/// Category value that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Filter products by search query and category.
///
/// The query matches case-insensitively against name or description; an
/// empty query matches everything. Whitespace in the query is significant,
/// so `"  "` only matches text containing two spaces. A category of `None` or
/// [`ALL_CATEGORIES`] matches everything, otherwise it must equal the
/// product's category exactly.
#[must_use]
pub fn filter<'a>(products: &'a [Product], query: &str, category: Option<&str>) -> Vec<&'a Product> {
    let query = query.to_lowercase();

    products
        .iter()
        .filter(|product| matches_query(product, &query) && matches_category(product, category))
        .collect()
}

fn matches_query(product: &Product, query: &str) -> bool {
    query.is_empty()
        || product.name.to_lowercase().contains(query)
        || product.description.to_lowercase().contains(query)
}

fn matches_category(product: &Product, category: Option<&str>) -> bool {
    match category {
        None | Some(ALL_CATEGORIES) => true,
        Some(category) => product.category == category,
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(&product.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use fudsiti_core::{ProductId, ProductUnit, VendorId};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, name: &str, description: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            price: Decimal::ONE,
            unit: ProductUnit::Kg,
            category: category.to_string(),
            vendor_id: VendorId::new("v1"),
            vendor_name: "Farm".to_string(),
            vendor_rating: 4.8,
            vendor_return_rate: 1.2,
            images: Vec::new(),
            in_stock: true,
            weight_range: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Tomatoes", "Ripe red tomatoes", "vegetables"),
            product("2", "Apples", "Sweet green apples", "fruit"),
            product("3", "Dill", "Fresh greens", "greens"),
        ]
    }

    #[test]
    fn test_empty_query_and_all_category_match_everything() {
        let products = catalog();
        assert_eq!(filter(&products, "", None).len(), 3);
        assert_eq!(filter(&products, "", Some(ALL_CATEGORIES)).len(), 3);
        assert!(filter(&products, "  ", None).is_empty());
        assert!(filter(&products, "tomato ", None).is_empty());
    }

    #[test]
    fn test_query_matches_name_or_description_case_insensitively() {
        let products = catalog();
        let hits = filter(&products, "TOMATO", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");

        let hits = filter(&products, "green", None);
        let ids: Vec<_> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_category_filter_combines_with_query() {
        let products = catalog();
        assert_eq!(filter(&products, "green", Some("greens")).len(), 1);
        assert!(filter(&products, "tomato", Some("fruit")).is_empty());
    }

    #[test]
    fn test_categories_are_distinct_in_order() {
        let mut products = catalog();
        products.push(product("4", "Pears", "", "fruit"));
        assert_eq!(categories(&products), vec!["vegetables", "fruit", "greens"]);
    }
}
