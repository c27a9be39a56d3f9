//! Account flows.
//!
//! Each flow validates its form, calls the auth API and records the result
//! in the [`Store`]. Validation failures never reach the network.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use fudsiti_core::OtpRequestId;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::User;
use crate::persistence::SnapshotStorage;
use crate::services::auth::{AuthClient, AuthError, Feedback};
use crate::store::Store;
use crate::validation::{
    EmailLoginForm, FieldError, LoginForm, OtpForm, PhoneForm, SignupForm, ValidationErrors,
};

/// Seconds before a new code may be requested for the same phone.
pub const OTP_RESEND_COOLDOWN_SECS: i64 = 60;

/// Errors from an account flow.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The form did not pass local validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The auth API rejected the request.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A code was requested again before the cooldown ran out.
    #[error("wait {remaining_secs}s before requesting a new code")]
    ResendCooldown { remaining_secs: i64 },
}

impl AccountError {
    /// How a form should present this error.
    #[must_use]
    pub fn feedback(&self) -> Feedback {
        match self {
            Self::Validation(errors) => Feedback::Fields(errors.errors().to_vec()),
            Self::Auth(err) => err.feedback(),
            Self::ResendCooldown { remaining_secs } => {
                Feedback::Fields(vec![FieldError::new(
                    crate::validation::FormField::Code,
                    format!("a new code can be requested in {remaining_secs}s"),
                )])
            }
        }
    }
}

/// Result of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub user: User,
    pub email_verification_required: bool,
    pub phone_verification_required: bool,
}

impl SignupOutcome {
    /// Whether any contact still needs confirming before the account is usable.
    #[must_use]
    pub const fn needs_verification(&self) -> bool {
        self.email_verification_required || self.phone_verification_required
    }
}

/// A pending one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub request_id: OtpRequestId,
    /// Phone the code was sent to, as entered.
    pub phone: String,
    /// Masked phone as reported by the API.
    pub mask: String,
    pub requested_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Whether a new code may be requested at `now`.
    #[must_use]
    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        self.resend_in(now).is_zero()
    }

    /// Time left until a new code may be requested, zero once allowed.
    #[must_use]
    pub fn resend_in(&self, now: DateTime<Utc>) -> TimeDelta {
        let ready_at = self.requested_at + TimeDelta::seconds(OTP_RESEND_COOLDOWN_SECS);
        (ready_at - now).max(TimeDelta::zero())
    }
}

/// Account flows over an auth client and a store.
pub struct AccountService<'a, S: SnapshotStorage> {
    client: &'a AuthClient,
    store: &'a mut Store<S>,
}

impl<'a, S: SnapshotStorage> AccountService<'a, S> {
    #[must_use]
    pub const fn new(client: &'a AuthClient, store: &'a mut Store<S>) -> Self {
        Self { client, store }
    }

    /// Sign in with phone, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for an invalid form, or the API error.
    pub async fn login(&mut self, form: &LoginForm) -> Result<User, AccountError> {
        form.validate()?;
        let client = self.client;
        let response = self.with_loading(client.login(form)).await?;
        self.sign_in(&response.user);
        Ok(response.user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for an invalid form, or the API error.
    pub async fn email_login(&mut self, form: &EmailLoginForm) -> Result<User, AccountError> {
        form.validate()?;
        let client = self.client;
        let response = self.with_loading(client.email_login(form)).await?;
        self.sign_in(&response.user);
        Ok(response.user)
    }

    /// Register a new account. The store is not signed in.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for an invalid form, or the API error.
    pub async fn signup(&mut self, form: &SignupForm) -> Result<SignupOutcome, AccountError> {
        form.validate()?;
        let client = self.client;
        let response = self.with_loading(client.signup(form)).await?;
        tracing::info!(
            user_id = %response.user.id,
            email_verification_required = response.email_verification_required,
            phone_verification_required = response.phone_verification_required,
            "account registered"
        );
        Ok(SignupOutcome {
            user: response.user,
            email_verification_required: response.email_verification_required,
            phone_verification_required: response.phone_verification_required,
        })
    }

    /// Send a login code to a phone.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for an invalid phone, or the API error.
    pub async fn request_otp(&mut self, form: &PhoneForm) -> Result<OtpChallenge, AccountError> {
        form.validate()?;
        let client = self.client;
        let sent = self.with_loading(client.request_otp(&form.phone)).await?;
        Ok(OtpChallenge {
            request_id: sent.request_id,
            phone: form.phone.clone(),
            mask: sent.mask,
            requested_at: Utc::now(),
        })
    }

    /// Request a fresh code for an existing challenge.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::ResendCooldown` before the cooldown has passed,
    /// or the API error.
    pub async fn resend_otp(
        &mut self,
        challenge: &OtpChallenge,
    ) -> Result<OtpChallenge, AccountError> {
        let wait = challenge.resend_in(Utc::now());
        if !wait.is_zero() {
            return Err(AccountError::ResendCooldown {
                remaining_secs: wait.num_seconds().max(1),
            });
        }
        self.request_otp(&PhoneForm {
            phone: challenge.phone.clone(),
        })
        .await
    }

    /// Exchange a code for a session, then load and store the user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for an invalid form, or the API error.
    pub async fn verify_otp(
        &mut self,
        challenge: &OtpChallenge,
        form: &OtpForm,
    ) -> Result<User, AccountError> {
        form.validate()?;
        let client = self.client;
        let user = self
            .with_loading(async {
                client.verify_otp(&challenge.request_id, form).await?;
                client.me().await
            })
            .await?;
        self.sign_in(&user);
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns the API error.
    pub async fn send_email_verification(&mut self) -> Result<(), AccountError> {
        let client = self.client;
        Ok(self.with_loading(client.send_email_verification()).await?)
    }

    /// # Errors
    ///
    /// Returns the API error.
    pub async fn send_phone_verification(&mut self) -> Result<(), AccountError> {
        let client = self.client;
        Ok(self.with_loading(client.send_phone_verification()).await?)
    }

    /// Confirm the phone with a texted code and refresh the stored user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for a malformed code, or the API error.
    pub async fn verify_phone(&mut self, code: &str) -> Result<User, AccountError> {
        let form = OtpForm {
            code: code.to_string(),
            remember_me: false,
            accept_terms: true,
        };
        form.validate()?;
        let client = self.client;
        self.with_loading(client.verify_phone(code)).await?;
        self.refresh_profile().await
    }

    /// Replace the stored user with the API's current view.
    ///
    /// An `Unauthorized` answer signs the store out.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn refresh_profile(&mut self) -> Result<User, AccountError> {
        let client = self.client;
        match self.with_loading(client.me()).await {
            Ok(user) => {
                self.sign_in(&user);
                Ok(user)
            }
            Err(AuthError::Unauthorized) => {
                self.store.logout();
                clear_sentry_user();
                Err(AuthError::Unauthorized.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// End the session.
    ///
    /// The local session is cleared whether or not the API call succeeds; the
    /// API error, if any, is returned afterwards. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn logout(&mut self) -> Result<(), AccountError> {
        let client = self.client;
        let result = self.with_loading(client.logout()).await;
        self.store.logout();
        clear_sentry_user();
        if let Err(e) = &result {
            tracing::warn!(error = %e, "logout request failed, local session cleared");
        }
        Ok(result?)
    }

    fn sign_in(&mut self, user: &User) {
        self.store.login(user.clone());
        set_sentry_user(&user.id, Some(user.email.as_str()));
    }

    async fn with_loading<T>(
        &mut self,
        call: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        self.store.set_loading(true);
        let result = call.await;
        self.store.set_loading(false);
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn challenge_at(requested_at: DateTime<Utc>) -> OtpChallenge {
        OtpChallenge {
            request_id: OtpRequestId::new("r1"),
            phone: "+79998887766".to_string(),
            mask: "+7 *** ***-77-66".to_string(),
            requested_at,
        }
    }

    #[test]
    fn test_resend_cooldown() {
        let t0 = Utc::now();
        let challenge = challenge_at(t0);

        assert!(!challenge.can_resend(t0));
        assert_eq!(challenge.resend_in(t0), TimeDelta::seconds(60));
        assert_eq!(
            challenge.resend_in(t0 + TimeDelta::seconds(45)),
            TimeDelta::seconds(15)
        );
        assert!(challenge.can_resend(t0 + TimeDelta::seconds(60)));
        assert_eq!(
            challenge.resend_in(t0 + TimeDelta::seconds(90)),
            TimeDelta::zero()
        );
    }

    #[test]
    fn test_validation_feedback_lists_fields() {
        let form = PhoneForm {
            phone: "123".to_string(),
        };
        let err = AccountError::from(form.validate().unwrap_err());
        let Feedback::Fields(fields) = err.feedback() else {
            panic!("expected field feedback");
        };
        assert_eq!(fields[0].field, crate::validation::FormField::Phone);
    }

    #[test]
    fn test_signup_outcome_needs_verification() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","name":"Maria","email":"m@example.com","phone":"+79998887766"}"#,
        )
        .unwrap();
        let outcome = SignupOutcome {
            user,
            email_verification_required: false,
            phone_verification_required: true,
        };
        assert!(outcome.needs_verification());
    }
}
