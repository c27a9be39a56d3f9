//! Per-invocation state shared by all commands.

use std::path::Path;

use fudsiti_storefront::config::StorefrontConfig;
use fudsiti_storefront::error::AppError;
use fudsiti_storefront::models::Product;
use fudsiti_storefront::persistence::FileStorage;
use fudsiti_storefront::services::auth::AuthClient;
use fudsiti_storefront::store::Store;

/// Configuration, the file-backed store and the optional catalogue.
pub struct Context {
    pub config: StorefrontConfig,
    pub store: Store<FileStorage>,
    pub catalog: Vec<Product>,
    flush_on_finish: bool,
}

impl Context {
    /// Load the store from the configured state directory and read the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the catalogue cannot be read or parsed.
    pub fn open(config: StorefrontConfig, catalog: Option<&Path>) -> Result<Self, AppError> {
        let catalog = match catalog {
            Some(path) => load_catalog(path)?,
            None => Vec::new(),
        };

        let storage = FileStorage::new(&config.state_dir);
        let store = Store::load_with_key(storage, config.store_key.clone());
        tracing::debug!(
            state_dir = %config.state_dir.display(),
            products = catalog.len(),
            "context opened"
        );

        Ok(Self {
            config,
            store,
            catalog,
            flush_on_finish: true,
        })
    }

    /// Build an auth client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no API URL is configured, or
    /// `AppError::Auth` if the HTTP client cannot be built.
    pub fn auth_client(&self) -> Result<AuthClient, AppError> {
        let api_url = self.config.require_api_url()?.clone();
        Ok(AuthClient::new(api_url, self.config.http_timeout)?)
    }

    /// Whether a catalogue was supplied.
    #[must_use]
    pub fn has_catalog(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// Skip the final flush, leaving storage as the command left it.
    pub const fn skip_flush(&mut self) {
        self.flush_on_finish = false;
    }

    /// Flush the store, surfacing any write failure the write-through logged.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persist` if the snapshot cannot be written.
    pub fn finish(mut self) -> Result<(), AppError> {
        if self.flush_on_finish {
            self.store.save()?;
        }
        Ok(())
    }
}

/// Read a catalogue file: a JSON array of products.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<Vec<Product>, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::BadRequest(format!("cannot read catalog {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        AppError::BadRequest(format!("invalid catalog {}: {e}", path.display()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fudsiti_core::ProductUnit;
    use fudsiti_storefront::models::CartItem;
    use rust_decimal::Decimal;

    use super::*;

    fn offline_config() -> StorefrontConfig {
        let state_dir = std::env::temp_dir().join(format!("fudsiti-cli-{}", std::process::id()));
        StorefrontConfig::from_lookup(|key| {
            (key == "FUDSITI_STATE_DIR").then(|| state_dir.display().to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_offline_commands_need_no_api_url() {
        let mut ctx = Context::open(offline_config(), None).unwrap();
        ctx.store.add_to_cart(CartItem::new("1", Decimal::ONE, ProductUnit::Kg));
        assert_eq!(ctx.store.cart().len(), 1);

        assert!(matches!(ctx.auth_client(), Err(AppError::Config(_))));

        ctx.store.reset().unwrap();
        ctx.skip_flush();
        ctx.finish().unwrap();
    }
}
