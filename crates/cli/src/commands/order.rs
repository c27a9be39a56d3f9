//! Order commands.

use fudsiti_core::{AddressId, DeliveryMethod, OrderId, OrderStatus, PaymentMethod};
use fudsiti_storefront::error::AppError;
use fudsiti_storefront::models::Checkout;

use crate::context::Context;
use crate::output;

pub fn list(ctx: &Context) {
    output::orders(&ctx.store.orders());
}

/// Place an order from the cart.
///
/// The address is either given as text or picked from the signed-in user's
/// saved addresses. Pickup orders need no address.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the cart is empty or no address is
/// given for delivery, or `AppError::NotFound` for an unknown saved address.
pub fn place(
    ctx: &mut Context,
    address: Option<&str>,
    address_id: Option<&str>,
    delivery_method: DeliveryMethod,
    payment_method: PaymentMethod,
) -> Result<(), AppError> {
    let delivery_address = match (address, address_id) {
        (Some(text), _) => text.trim().to_string(),
        (None, Some(id)) => {
            let id = AddressId::new(id);
            ctx.store
                .user()
                .and_then(|u| u.addresses.into_iter().find(|a| a.id == id))
                .map(|a| a.one_line())
                .ok_or_else(|| AppError::NotFound(format!("saved address {id}")))?
        }
        (None, None) => String::new(),
    };

    if delivery_address.is_empty() && delivery_method == DeliveryMethod::Delivery {
        return Err(AppError::BadRequest(
            "delivery orders need --address or --address-id".to_string(),
        ));
    }
    if !ctx.has_catalog() {
        tracing::warn!("no catalog loaded, order total will be zero");
    }

    let checkout = Checkout {
        delivery_address,
        delivery_method,
        payment_method,
    };
    let order = ctx
        .store
        .place_order(checkout, &ctx.catalog)
        .ok_or_else(|| AppError::BadRequest("cart is empty".to_string()))?;

    output::line("Order placed");
    output::order(&order);
    Ok(())
}

/// Move an order to `status`, enforcing the workflow.
///
/// # Errors
///
/// Returns `AppError::Transition` if the move is not allowed.
pub fn set_status(ctx: &mut Context, order_id: &str, status: OrderStatus) -> Result<(), AppError> {
    let id = OrderId::new(order_id);
    let previous = ctx.store.transition_order(&id, status)?;
    output::line(format!("{id}: {previous} -> {status}"));
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Transition` if the order is unknown or finished.
pub fn advance(ctx: &mut Context, order_id: &str) -> Result<(), AppError> {
    let id = OrderId::new(order_id);
    let status = ctx.store.advance_order(&id)?;
    output::line(format!("{id}: {status}"));
    Ok(())
}
