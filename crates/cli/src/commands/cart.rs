//! Cart commands.

use rust_decimal::Decimal;

use fudsiti_core::{ProductId, ProductUnit};
use fudsiti_storefront::error::AppError;
use fudsiti_storefront::models::CartItem;
use fudsiti_storefront::validation::validate_cart_item;

use crate::context::Context;
use crate::output;

/// Add a line. The unit defaults to the catalogue's unit for the product.
///
/// # Errors
///
/// Returns `AppError::Validation` for a non-positive quantity.
pub fn add(
    ctx: &mut Context,
    product_id: &str,
    quantity: Decimal,
    unit: Option<ProductUnit>,
    comment: Option<String>,
) -> Result<(), AppError> {
    let product_id = ProductId::new(product_id);
    let unit = unit
        .or_else(|| {
            ctx.catalog
                .iter()
                .find(|p| p.id == product_id)
                .map(|p| p.unit)
        })
        .unwrap_or_default();

    let mut item = CartItem::new(product_id, quantity, unit);
    if let Some(comment) = comment {
        item = item.with_comment(comment);
    }
    validate_cart_item(&item)?;

    ctx.store.add_to_cart(item);
    output::cart(&ctx.store.cart(), &ctx.catalog);
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns `AppError::Validation` for a non-positive quantity, or
/// `AppError::NotFound` if the product is not in the cart.
pub fn update(ctx: &mut Context, product_id: &str, quantity: Decimal) -> Result<(), AppError> {
    let product_id = ProductId::new(product_id);
    let Some(existing) = ctx.store.cart().get(&product_id).cloned() else {
        return Err(AppError::NotFound(format!("cart line {product_id}")));
    };
    validate_cart_item(&CartItem { quantity, ..existing })?;

    ctx.store.update_cart_item(&product_id, quantity);
    output::cart(&ctx.store.cart(), &ctx.catalog);
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the cart.
pub fn remove(ctx: &mut Context, product_id: &str) -> Result<(), AppError> {
    let product_id = ProductId::new(product_id);
    if ctx.store.cart().get(&product_id).is_none() {
        return Err(AppError::NotFound(format!("cart line {product_id}")));
    }

    ctx.store.remove_from_cart(&product_id);
    output::cart(&ctx.store.cart(), &ctx.catalog);
    Ok(())
}

pub fn clear(ctx: &mut Context) {
    ctx.store.clear_cart();
    output::line("Cart cleared");
}

pub fn show(ctx: &Context) {
    output::cart(&ctx.store.cart(), &ctx.catalog);
}
