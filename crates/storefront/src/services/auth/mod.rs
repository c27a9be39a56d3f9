//! Auth API client.
//!
//! Thin async wrapper over the account endpoints:
//!
//! - `POST /auth/email/login`, `POST /auth/email/signup`
//! - `POST /auth/phone/request-otp`, `POST /auth/phone/verify-otp`
//! - `POST /auth/email/send-verify`, `POST /auth/phone/send-verify`,
//!   `POST /auth/phone/verify`
//! - `GET /auth/me`, `POST /auth/logout`, `POST /auth/refresh`
//!
//! The session is a cookie; the client keeps it in its own cookie store, so
//! one [`AuthClient`] (or its clones) must be used for a whole session.
//! Requests are issued once: no retries and no deduplication.

mod error;
mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Response;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use fudsiti_core::OtpRequestId;

pub use error::{AuthError, ErrorCode, Feedback, Notice, UnknownErrorCode};
pub use types::{LoginResponse, OtpChannel, OtpPurpose, OtpRequested, SignupResponse};

use crate::models::User;
use crate::validation::{EmailLoginForm, LoginForm, OtpForm, SignupForm};

use types::{
    EmailLoginRequest, LoginRequest, OtpRequest, SignupRequest, VerifyOtpRequest,
    VerifyPhoneRequest,
};

/// Client for the auth API.
///
/// Cheap to clone; clones share the connection pool and cookie store.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the HTTP client fails to build.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, AuthError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AuthClientInner { client, base_url }),
        })
    }

    /// The normalized API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Sign-in and registration
    // =========================================================================

    /// Sign in with phone, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a wrong password, or any
    /// other API or transport error.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<LoginResponse, AuthError> {
        let body = LoginRequest {
            phone: &form.phone,
            email: &form.email,
            password: form.password.expose_secret(),
        };
        self.post("auth/email/login", &body).await
    }

    /// Sign in with email and password only.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a wrong password, or any
    /// other API or transport error.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn email_login(&self, form: &EmailLoginForm) -> Result<LoginResponse, AuthError> {
        let body = EmailLoginRequest {
            email: &form.email,
            password: form.password.expose_secret(),
        };
        self.post("auth/email/login", &body).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailInUse`, `AuthError::PhoneInUse` or
    /// `AuthError::WeakPassword` on conflicts, or any other API error.
    #[instrument(skip(self, form), fields(email = %form.email, role = %form.role))]
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResponse, AuthError> {
        let body = SignupRequest {
            name: form.name.trim(),
            phone: &form.phone,
            email: &form.email,
            password: form.password.expose_secret(),
            accept_terms: form.accept_terms,
            role: form.role,
        };
        self.post("auth/email/signup", &body).await
    }

    // =========================================================================
    // One-time codes
    // =========================================================================

    /// Send a login code by SMS.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RateLimited` or `AuthError::PhoneBlocked` when the
    /// code cannot be sent, or any other API error.
    #[instrument(skip(self))]
    pub async fn request_otp(&self, phone: &str) -> Result<OtpRequested, AuthError> {
        let body = OtpRequest {
            phone,
            purpose: OtpPurpose::Login,
            channel: OtpChannel::Sms,
        };
        self.post("auth/phone/request-otp", &body).await
    }

    /// Exchange a login code for a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OtpInvalid` or `AuthError::OtpExpired` on a bad
    /// code, or any other API error.
    #[instrument(skip(self, form), fields(request_id = %request_id))]
    pub async fn verify_otp(
        &self,
        request_id: &OtpRequestId,
        form: &OtpForm,
    ) -> Result<(), AuthError> {
        let body = VerifyOtpRequest {
            request_id,
            code: &form.code,
            remember_me: form.remember_me,
            accept_terms: form.accept_terms,
        };
        self.post_no_content("auth/phone/verify-otp", &body).await
    }

    // =========================================================================
    // Contact verification
    // =========================================================================

    /// Ask the API to email a verification link to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` without a session, or any other API error.
    #[instrument(skip(self))]
    pub async fn send_email_verification(&self) -> Result<(), AuthError> {
        self.post_no_content("auth/email/send-verify", &EmptyBody {})
            .await
    }

    /// Ask the API to text a verification code to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` without a session, or any other API error.
    #[instrument(skip(self))]
    pub async fn send_phone_verification(&self) -> Result<(), AuthError> {
        self.post_no_content("auth/phone/send-verify", &EmptyBody {})
            .await
    }

    /// Confirm the signed-in user's phone with a texted code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OtpInvalid` on a wrong code, or any other API error.
    #[instrument(skip(self, code))]
    pub async fn verify_phone(&self, code: &str) -> Result<(), AuthError> {
        self.post_no_content("auth/phone/verify", &VerifyPhoneRequest { code })
            .await
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Fetch the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` without a session, or any other API error.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, AuthError> {
        let url = self.endpoint("auth/me")?;
        let response = self.inner.client.get(url).send().await?;
        read_json(response).await
    }

    /// End the server-side session.
    ///
    /// # Errors
    ///
    /// Returns any API or transport error.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.post_no_content("auth/logout", &EmptyBody {}).await
    }

    /// Extend the server-side session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` if the session is gone, or any other
    /// API error.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.post_no_content("auth/refresh", &EmptyBody {}).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn send_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, AuthError> {
        let url = self.endpoint(path)?;
        Ok(self.inner.client.post(url).json(body).send().await?)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_post(path, body).await?;
        read_json(response).await
    }

    async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), AuthError> {
        let response = self.send_post(path, body).await?;
        check_status(response).await.map(drop)
    }
}

#[derive(Serialize)]
struct EmptyBody {}

/// Turn a non-success response into an [`AuthError`].
async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = AuthError::from_response(status.as_u16(), &body);
    tracing::debug!(status = status.as_u16(), error = %error, "auth API error");
    Err(error)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| AuthError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = AuthClient::new(
            Url::parse("http://localhost:8080/api").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/");
        assert_eq!(
            client.endpoint("auth/me").unwrap().as_str(),
            "http://localhost:8080/api/auth/me"
        );
    }

    #[test]
    fn test_root_base_url() {
        let client = AuthClient::new(
            Url::parse("http://localhost:8080").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("auth/phone/request-otp").unwrap().as_str(),
            "http://localhost:8080/auth/phone/request-otp"
        );
    }
}
