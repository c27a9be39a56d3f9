//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends. [`AppError::report`]
//! captures internal failures to Sentry; [`AppError::user_message`] is the
//! text that is safe to show a user.

use thiserror::Error;

use crate::config::ConfigError;
use crate::persistence::PersistError;
use crate::services::account::AccountError;
use crate::services::auth::{AuthError, Feedback};
use crate::store::TransitionError;
use crate::validation::ValidationErrors;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Snapshot storage failed.
    #[error("Storage error: {0}")]
    Persist(#[from] PersistError),

    /// Auth API call failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input did not pass validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Order status change rejected.
    #[error("Order error: {0}")]
    Transition(#[from] TransitionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(errors) => Self::Validation(errors),
            AccountError::Auth(err) => Self::Auth(err),
            cooldown @ AccountError::ResendCooldown { .. } => Self::BadRequest(cooldown.to_string()),
        }
    }
}

impl AppError {
    /// Whether this error is a fault on our side rather than the user's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Persist(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Decode(_) | AuthError::Url(_) | AuthError::Http(_))
                | Self::Auth(AuthError::Api { .. })
        )
    }

    /// Capture internal errors to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        }
    }

    /// Message safe to show a user.
    ///
    /// Internal details are not exposed; auth errors use their form feedback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Persist(_) | Self::Internal(_) => "Internal error".to_string(),
            Self::Auth(err) => match err.feedback() {
                Feedback::Toast(notice) => notice.to_string(),
                Feedback::Fields(fields) => fields
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            },
            Self::Validation(errors) => errors.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
