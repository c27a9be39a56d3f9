//! Catalogue commands.

use fudsiti_storefront::catalog::{self, ALL_CATEGORIES};
use fudsiti_storefront::error::AppError;

use crate::context::Context;
use crate::output;

fn require_catalog(ctx: &Context) -> Result<(), AppError> {
    if ctx.has_catalog() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "no catalog loaded; pass --catalog <file>".to_string(),
        ))
    }
}

/// Apply a search to the store's filters and list the matches.
///
/// # Errors
///
/// Returns `AppError::BadRequest` without a catalogue.
pub fn search(ctx: &mut Context, query: &str, category: Option<String>) -> Result<(), AppError> {
    require_catalog(ctx)?;

    ctx.store.set_search_query(query);
    ctx.store
        .set_selected_category(category.filter(|c| c != ALL_CATEGORIES));

    let hits = ctx.store.visible_products(&ctx.catalog);
    output::products(&hits);
    Ok(())
}

/// # Errors
///
/// Returns `AppError::BadRequest` without a catalogue.
pub fn categories(ctx: &Context) -> Result<(), AppError> {
    require_catalog(ctx)?;
    for category in catalog::categories(&ctx.catalog) {
        output::line(category);
    }
    Ok(())
}
