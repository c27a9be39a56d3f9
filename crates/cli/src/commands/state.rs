//! Snapshot commands.

use fudsiti_storefront::error::AppError;
use fudsiti_storefront::persistence;

use crate::context::Context;
use crate::output;

/// Print the persisted subset of the state as stored.
///
/// # Errors
///
/// Returns `AppError::Persist` if the snapshot cannot be encoded.
pub fn show(ctx: &Context) -> Result<(), AppError> {
    let persisted = ctx.store.read(fudsiti_storefront::state::AppState::persisted);
    let snapshot = persistence::encode(&persisted)?;
    output::line(snapshot);
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Persist` if the snapshot cannot be removed.
pub fn reset(ctx: &mut Context) -> Result<(), AppError> {
    ctx.store.reset()?;
    ctx.skip_flush();
    output::line(format!(
        "Reset {}",
        ctx.config.state_dir.join(format!("{}.json", ctx.store.key())).display()
    ));
    Ok(())
}
