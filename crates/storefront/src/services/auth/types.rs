//! Request and response payloads for the auth API.

use serde::{Deserialize, Serialize};

use fudsiti_core::{OtpRequestId, UserRole};

use crate::models::{Session, User};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequest<'a> {
    pub phone: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailLoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignupRequest<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub accept_terms: bool,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub(super) struct OtpRequest<'a> {
    pub phone: &'a str,
    pub purpose: OtpPurpose,
    pub channel: OtpChannel,
}

#[derive(Debug, Serialize)]
pub(super) struct VerifyOtpRequest<'a> {
    pub request_id: &'a OtpRequestId,
    pub code: &'a str,
    pub remember_me: bool,
    pub accept_terms: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct VerifyPhoneRequest<'a> {
    pub code: &'a str,
}

/// What a one-time code is requested for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    #[default]
    Login,
}

/// How a one-time code is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpChannel {
    #[default]
    Sms,
}

/// Successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub session: Session,
}

/// Successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupResponse {
    pub user: User,
    #[serde(default)]
    pub email_verification_required: bool,
    #[serde(default)]
    pub phone_verification_required: bool,
}

/// A one-time code was sent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpRequested {
    pub request_id: OtpRequestId,
    /// Masked phone number the code went to, e.g. `+7 *** ***-77-66`.
    pub mask: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_request_wire_format() {
        let body = OtpRequest {
            phone: "+79998887766",
            purpose: OtpPurpose::default(),
            channel: OtpChannel::default(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"phone": "+79998887766", "purpose": "login", "channel": "sms"})
        );
    }

    #[test]
    fn test_signup_response_flags_default_false() {
        let json = r#"{"user":{"id":"u1","name":"Maria","email":"m@example.com","phone":"+79998887766"}}"#;
        let response: SignupResponse = serde_json::from_str(json).unwrap();
        assert!(!response.email_verification_required);
        assert!(!response.phone_verification_required);
        assert_eq!(response.user.name, "Maria");
    }
}
