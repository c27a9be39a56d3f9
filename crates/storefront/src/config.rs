//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for auth commands
//! - `FUDSITI_API_URL` - Root URL of the auth API (http or https). Checked
//!   when set; only [`StorefrontConfig::require_api_url`] demands it, so
//!   offline cart and order work runs without it.
//!
//! ## Optional
//! - `FUDSITI_STATE_DIR` - Directory for the persisted snapshot (default: .fudsiti)
//! - `FUDSITI_STORE_KEY` - Snapshot key (default: fudsiti-store)
//! - `FUDSITI_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::persistence::DEFAULT_KEY;

const DEFAULT_STATE_DIR: &str = ".fudsiti";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Root URL of the auth API, if configured
    pub api_url: Option<Url>,
    /// Directory holding the persisted snapshot
    pub state_dir: PathBuf,
    /// Key the snapshot is stored under
    pub store_key: String,
    /// Per-request timeout for the auth API
    pub http_timeout: Duration,
    /// Sentry DSN (contains a project key)
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_ref().map(Url::as_str))
            .field("state_dir", &self.state_dir)
            .field("store_key", &self.store_key)
            .field("http_timeout", &self.http_timeout)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env
            .optional("FUDSITI_API_URL")
            .map(|value| parse_api_url(&value))
            .transpose()?;
        let state_dir = PathBuf::from(env.or_default("FUDSITI_STATE_DIR", DEFAULT_STATE_DIR));
        let store_key = env.or_default("FUDSITI_STORE_KEY", DEFAULT_KEY);

        let timeout_secs = env
            .or_default("FUDSITI_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("FUDSITI_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FUDSITI_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            state_dir,
            store_key,
            http_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// The auth API root, for commands that talk to it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `FUDSITI_API_URL` was not set.
    pub fn require_api_url(&self) -> Result<&Url, ConfigError> {
        self.api_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FUDSITI_API_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; empty counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("FUDSITI_API_URL".to_string(), msg);

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}
