//! Saved address commands.

use fudsiti_core::AddressId;
use fudsiti_storefront::error::AppError;
use fudsiti_storefront::models::NewAddress;
use fudsiti_storefront::validation::validate_address;

use crate::context::Context;
use crate::output;

fn not_signed_in() -> AppError {
    AppError::BadRequest("sign in first".to_string())
}

/// # Errors
///
/// Returns `AppError::BadRequest` when nobody is signed in.
pub fn list(ctx: &Context) -> Result<(), AppError> {
    let user = ctx.store.user().ok_or_else(not_signed_in)?;
    output::addresses(&user.addresses);
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Validation` for missing fields, or
/// `AppError::BadRequest` when nobody is signed in.
pub fn add(
    ctx: &mut Context,
    city: String,
    street: String,
    house: String,
    apartment: Option<String>,
    comment: Option<String>,
) -> Result<(), AppError> {
    let address = NewAddress {
        city,
        street,
        house,
        apartment,
        comment,
    };
    validate_address(&address)?;

    let saved = ctx.store.add_address(address).ok_or_else(not_signed_in)?;
    output::addresses(std::slice::from_ref(&saved));
    Ok(())
}

/// # Errors
///
/// Returns `AppError::NotFound` if no such address is saved.
pub fn remove(ctx: &mut Context, address_id: &str) -> Result<(), AppError> {
    let id = AddressId::new(address_id);
    if ctx.store.remove_address(&id) {
        output::line(format!("Removed {id}"));
        Ok(())
    } else {
        Err(AppError::NotFound(format!("saved address {id}")))
    }
}
