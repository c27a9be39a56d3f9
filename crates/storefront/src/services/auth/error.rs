//! Authentication error types.
//!
//! The auth API reports failures as `{"error": {"code"?, "message"}}`. The
//! code is parsed into an [`ErrorCode`] once, in [`AuthError::from_response`],
//! so callers match on [`AuthError`] variants instead of inspecting strings.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::validation::{FieldError, FormField};

/// Machine-readable error codes the auth API sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmailInUse,
    PhoneInUse,
    WeakPassword,
    InvalidEmail,
    InvalidPhone,
    InvalidCredentials,
    EmailNotVerified,
    PhoneBlocked,
    RateLimited,
    OtpInvalid,
    OtpExpired,
    Unauthorized,
}

impl ErrorCode {
    pub const ALL: [Self; 12] = [
        Self::EmailInUse,
        Self::PhoneInUse,
        Self::WeakPassword,
        Self::InvalidEmail,
        Self::InvalidPhone,
        Self::InvalidCredentials,
        Self::EmailNotVerified,
        Self::PhoneBlocked,
        Self::RateLimited,
        Self::OtpInvalid,
        Self::OtpExpired,
        Self::Unauthorized,
    ];

    /// Wire token, e.g. `EMAIL_IN_USE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::PhoneInUse => "PHONE_IN_USE",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::PhoneBlocked => "PHONE_BLOCKED",
            Self::RateLimited => "RATE_LIMITED",
            Self::OtpInvalid => "OTP_INVALID",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }

    /// The known token that occurs earliest in `message`.
    #[must_use]
    pub fn find_in(message: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .filter_map(|code| message.find(code.as_str()).map(|pos| (pos, *code)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, code)| code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

/// A code string that is not an [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown auth error code: {0}")]
pub struct UnknownErrorCode(pub String);

/// Errors from the auth API client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email is already registered")]
    EmailInUse,

    #[error("phone is already registered")]
    PhoneInUse,

    #[error("password is too weak")]
    WeakPassword,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhone,

    /// Wrong email, phone or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email is not verified")]
    EmailNotVerified,

    #[error("phone number is blocked")]
    PhoneBlocked,

    #[error("too many requests")]
    RateLimited,

    #[error("invalid one-time code")]
    OtpInvalid,

    #[error("one-time code expired")]
    OtpExpired,

    /// No valid session.
    #[error("not signed in")]
    Unauthorized,

    /// API returned an error response without a known code.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<ErrorCode> for AuthError {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::EmailInUse => Self::EmailInUse,
            ErrorCode::PhoneInUse => Self::PhoneInUse,
            ErrorCode::WeakPassword => Self::WeakPassword,
            ErrorCode::InvalidEmail => Self::InvalidEmail,
            ErrorCode::InvalidPhone => Self::InvalidPhone,
            ErrorCode::InvalidCredentials => Self::InvalidCredentials,
            ErrorCode::EmailNotVerified => Self::EmailNotVerified,
            ErrorCode::PhoneBlocked => Self::PhoneBlocked,
            ErrorCode::RateLimited => Self::RateLimited,
            ErrorCode::OtpInvalid => Self::OtpInvalid,
            ErrorCode::OtpExpired => Self::OtpExpired,
            ErrorCode::Unauthorized => Self::Unauthorized,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthError {
    /// Build an error from a non-success response.
    ///
    /// The code comes from `error.code` when it is a known token, otherwise
    /// from the first known token inside `error.message`. A body that is not
    /// the error envelope is kept verbatim as the message. Without a code a
    /// 401 becomes [`AuthError::Unauthorized`] and anything else
    /// [`AuthError::Api`].
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| ErrorDetail {
                code: None,
                message: Some(body.to_string()),
            });

        let message = detail.message.unwrap_or_default();
        let code = detail
            .code
            .as_deref()
            .and_then(|c| c.parse::<ErrorCode>().ok())
            .or_else(|| ErrorCode::find_in(&message));

        match code {
            Some(code) => code.into(),
            None if status == 401 => Self::Unauthorized,
            None => Self::Api { status, message },
        }
    }

    /// The parsed API code, if this error carries one.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        Some(match self {
            Self::EmailInUse => ErrorCode::EmailInUse,
            Self::PhoneInUse => ErrorCode::PhoneInUse,
            Self::WeakPassword => ErrorCode::WeakPassword,
            Self::InvalidEmail => ErrorCode::InvalidEmail,
            Self::InvalidPhone => ErrorCode::InvalidPhone,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::EmailNotVerified => ErrorCode::EmailNotVerified,
            Self::PhoneBlocked => ErrorCode::PhoneBlocked,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::OtpInvalid => ErrorCode::OtpInvalid,
            Self::OtpExpired => ErrorCode::OtpExpired,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Api { .. } | Self::Http(_) | Self::Decode(_) | Self::Url(_) => return None,
        })
    }

    /// How a form should present this error.
    #[must_use]
    pub fn feedback(&self) -> Feedback {
        match self {
            Self::EmailInUse => {
                Feedback::field(FormField::Email, "an account with this email already exists")
            }
            Self::PhoneInUse => {
                Feedback::field(FormField::Phone, "an account with this phone already exists")
            }
            Self::WeakPassword => Feedback::field(FormField::Password, "password is too weak"),
            Self::InvalidEmail => Feedback::field(FormField::Email, "invalid email"),
            Self::InvalidPhone => Feedback::field(FormField::Phone, "invalid phone number"),
            Self::InvalidCredentials => Feedback::Fields(vec![
                FieldError::new(FormField::Email, "wrong email or password"),
                FieldError::new(FormField::Password, "wrong email or password"),
            ]),
            Self::OtpInvalid => Feedback::field(FormField::Code, "wrong code"),
            Self::EmailNotVerified => Feedback::toast(
                "Email not verified",
                "Confirm your email using the link we sent you.",
            ),
            Self::OtpExpired => {
                Feedback::toast("Code expired", "Request a new code and try again.")
            }
            Self::RateLimited => {
                Feedback::toast("Too many attempts", "Wait a minute and try again.")
            }
            Self::PhoneBlocked => Feedback::toast(
                "Phone blocked",
                "This number is blocked. Contact support.",
            ),
            Self::Unauthorized => Feedback::toast("Signed out", "Please sign in again."),
            Self::Http(_) => Feedback::toast("Network error", "Check your connection and try again."),
            Self::Api { message, .. } if !message.trim().is_empty() => {
                Feedback::toast(GENERIC_TITLE, message.clone())
            }
            Self::Api { .. } | Self::Decode(_) | Self::Url(_) => {
                Feedback::toast(GENERIC_TITLE, GENERIC_MESSAGE)
            }
        }
    }
}

const GENERIC_TITLE: &str = "Something went wrong";
const GENERIC_MESSAGE: &str = "Please try again later.";

/// Presentation of an error: messages under form fields, or a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Fields(Vec<FieldError>),
    Toast(Notice),
}

impl Feedback {
    fn field(field: FormField, message: &str) -> Self {
        Self::Fields(vec![FieldError::new(field, message)])
    }

    fn toast(title: &str, message: impl Into<String>) -> Self {
        Self::Toast(Notice {
            title: title.to_string(),
            message: message.into(),
        })
    }
}

/// A transient notice shown outside any form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_field_wins() {
        let body = r#"{"error":{"code":"EMAIL_IN_USE","message":"PHONE_IN_USE"}}"#;
        assert!(matches!(AuthError::from_response(409, body), AuthError::EmailInUse));
    }

    #[test]
    fn test_code_from_message_token() {
        let body = r#"{"error":{"message":"signup failed: PHONE_IN_USE"}}"#;
        assert!(matches!(AuthError::from_response(409, body), AuthError::PhoneInUse));
    }

    #[test]
    fn test_first_token_in_message_wins() {
        let body = r#"{"error":{"message":"OTP_EXPIRED then OTP_INVALID"}}"#;
        assert!(matches!(AuthError::from_response(400, body), AuthError::OtpExpired));
    }

    #[test]
    fn test_unknown_code_falls_back_to_message() {
        let body = r#"{"error":{"code":"SOMETHING_NEW","message":"RATE_LIMITED"}}"#;
        assert!(matches!(AuthError::from_response(429, body), AuthError::RateLimited));
    }

    #[test]
    fn test_no_code_is_api_error() {
        let body = r#"{"error":{"message":"boom"}}"#;
        match AuthError::from_response(500, body) {
            AuthError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_kept_as_message() {
        match AuthError::from_response(502, "Bad Gateway") {
            AuthError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bare_401_is_unauthorized() {
        assert!(matches!(AuthError::from_response(401, ""), AuthError::Unauthorized));
    }

    #[test]
    fn test_code_roundtrip_and_case() {
        for code in ErrorCode::ALL {
            assert_eq!(code.as_str().parse::<ErrorCode>().unwrap(), code);
            assert_eq!(AuthError::from(code).code(), Some(code));
        }
        assert_eq!("otp_invalid".parse::<ErrorCode>().unwrap(), ErrorCode::OtpInvalid);
        assert!("nope".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn test_field_feedback() {
        let Feedback::Fields(fields) = AuthError::InvalidCredentials.feedback() else {
            panic!("expected field feedback");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec![FormField::Email, FormField::Password]);

        assert!(matches!(
            AuthError::OtpInvalid.feedback(),
            Feedback::Fields(f) if f[0].field == FormField::Code
        ));
    }

    #[test]
    fn test_toast_feedback() {
        for err in [
            AuthError::EmailNotVerified,
            AuthError::OtpExpired,
            AuthError::RateLimited,
            AuthError::PhoneBlocked,
        ] {
            assert!(matches!(err.feedback(), Feedback::Toast(_)), "{err:?}");
        }
    }

    #[test]
    fn test_generic_feedback() {
        let err = AuthError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(
            err.feedback(),
            Feedback::Toast(Notice {
                title: GENERIC_TITLE.to_string(),
                message: GENERIC_MESSAGE.to_string(),
            })
        );
    }
}
