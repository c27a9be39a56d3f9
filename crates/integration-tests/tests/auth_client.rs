//! Integration tests for the auth API client against the in-process mock.

use std::time::Duration;

use secrecy::SecretString;

use fudsiti_core::{OtpRequestId, UserRole};
use fudsiti_integration_tests::{
    BLOCKED_PHONE, MockAuthApi, OTP_CODE, SEED_EMAIL, SEED_PASSWORD, SEED_PHONE,
};
use fudsiti_storefront::services::auth::{AuthClient, AuthError, ErrorCode};
use fudsiti_storefront::validation::{EmailLoginForm, LoginForm, OtpForm, SignupForm};

async fn setup() -> (MockAuthApi, AuthClient) {
    let api = MockAuthApi::spawn().await;
    let client = AuthClient::new(api.base_url(), Duration::from_secs(5)).expect("client builds");
    (api, client)
}

fn email_login(password: &str) -> EmailLoginForm {
    EmailLoginForm {
        email: SEED_EMAIL.to_string(),
        password: SecretString::from(password.to_string()),
    }
}

fn signup_form(email: &str, phone: &str) -> SignupForm {
    SignupForm {
        name: "Ivan".to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        password: SecretString::from("An0ther!pass".to_string()),
        accept_terms: true,
        role: UserRole::Seller,
    }
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_email_login_returns_user_and_session() {
    let (_api, client) = setup().await;

    let response = client
        .email_login(&email_login(SEED_PASSWORD))
        .await
        .expect("login succeeds");

    assert_eq!(response.user.email.as_str(), SEED_EMAIL);
    assert_eq!(response.user.role, UserRole::Buyer);
    assert!(response.user.email_verified);
    assert!(!response.session.id.as_str().is_empty());
}

#[tokio::test]
async fn test_three_factor_login_checks_phone() {
    let (_api, client) = setup().await;

    let form = LoginForm {
        phone: "+79990000000".to_string(),
        email: SEED_EMAIL.to_string(),
        password: SecretString::from(SEED_PASSWORD.to_string()),
    };
    assert!(matches!(
        client.login(&form).await,
        Err(AuthError::InvalidCredentials)
    ));

    let form = LoginForm {
        phone: SEED_PHONE.to_string(),
        ..form
    };
    assert!(client.login(&form).await.is_ok());
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let (_api, client) = setup().await;

    let err = client
        .email_login(&email_login("Wr0ng!pass"))
        .await
        .expect_err("login fails");
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(err.code(), Some(ErrorCode::InvalidCredentials));
}

// ============================================================================
// Session cookie
// ============================================================================

#[tokio::test]
async fn test_me_requires_session_cookie() {
    let (_api, client) = setup().await;

    assert!(matches!(client.me().await, Err(AuthError::Unauthorized)));

    client
        .email_login(&email_login(SEED_PASSWORD))
        .await
        .expect("login succeeds");
    let user = client.me().await.expect("session cookie sent");
    assert_eq!(user.email.as_str(), SEED_EMAIL);
}

#[tokio::test]
async fn test_clones_share_cookie_store() {
    let (_api, client) = setup().await;
    let other = client.clone();

    client
        .email_login(&email_login(SEED_PASSWORD))
        .await
        .expect("login succeeds");
    assert!(other.me().await.is_ok());
}

#[tokio::test]
async fn test_logout_ends_server_session() {
    let (api, client) = setup().await;

    client
        .email_login(&email_login(SEED_PASSWORD))
        .await
        .expect("login succeeds");
    assert_eq!(api.session_count(), 1);

    client.refresh().await.expect("refresh with live session");
    client.logout().await.expect("logout succeeds");
    assert_eq!(api.session_count(), 0);

    assert!(matches!(client.me().await, Err(AuthError::Unauthorized)));
    assert!(matches!(client.refresh().await, Err(AuthError::Unauthorized)));
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_signup_reports_verification_flags() {
    let (_api, client) = setup().await;

    let response = client
        .signup(&signup_form("ivan@example.com", "+79991112233"))
        .await
        .expect("signup succeeds");

    assert_eq!(response.user.name, "Ivan");
    assert_eq!(response.user.role, UserRole::Seller);
    assert!(response.email_verification_required);
    assert!(!response.phone_verification_required);
}

#[tokio::test]
async fn test_signup_conflicts_map_from_code_and_message() {
    let (_api, client) = setup().await;

    // `code` field
    assert!(matches!(
        client.signup(&signup_form(SEED_EMAIL, "+79991112233")).await,
        Err(AuthError::EmailInUse)
    ));

    // Token inside `message`
    assert!(matches!(
        client.signup(&signup_form("new@example.com", SEED_PHONE)).await,
        Err(AuthError::PhoneInUse)
    ));
}

// ============================================================================
// One-time codes
// ============================================================================

#[tokio::test]
async fn test_otp_round_trip() {
    let (api, client) = setup().await;

    let sent = client.request_otp(SEED_PHONE).await.expect("code sent");
    assert_eq!(sent.mask, "*** 7766");

    let form = OtpForm {
        code: OTP_CODE.to_string(),
        remember_me: true,
        accept_terms: true,
    };
    client
        .verify_otp(&sent.request_id, &form)
        .await
        .expect("code accepted");

    let user = client.me().await.expect("session opened by verify-otp");
    assert_eq!(user.phone.as_str(), SEED_PHONE);
    assert_eq!(
        api.requests(),
        vec!["/auth/phone/request-otp", "/auth/phone/verify-otp", "/auth/me"]
    );
}

#[tokio::test]
async fn test_otp_errors() {
    let (_api, client) = setup().await;

    assert!(matches!(
        client.request_otp(BLOCKED_PHONE).await,
        Err(AuthError::PhoneBlocked)
    ));

    let sent = client.request_otp(SEED_PHONE).await.expect("code sent");
    let wrong = OtpForm {
        code: "000000".to_string(),
        remember_me: false,
        accept_terms: true,
    };
    assert!(matches!(
        client.verify_otp(&sent.request_id, &wrong).await,
        Err(AuthError::OtpInvalid)
    ));

    let unknown = OtpRequestId::new("otp-missing");
    assert!(matches!(
        client.verify_otp(&unknown, &wrong).await,
        Err(AuthError::OtpExpired)
    ));
}

// ============================================================================
// Verification
// ============================================================================

#[tokio::test]
async fn test_verification_requires_session() {
    let (api, client) = setup().await;

    assert!(matches!(
        client.send_email_verification().await,
        Err(AuthError::Unauthorized)
    ));

    client
        .email_login(&email_login(SEED_PASSWORD))
        .await
        .expect("login succeeds");
    client
        .send_email_verification()
        .await
        .expect("email verification sent");
    client
        .send_phone_verification()
        .await
        .expect("phone verification sent");
    assert_eq!(api.verifications_sent(), vec!["email", "phone"]);

    assert!(matches!(
        client.verify_phone("000000").await,
        Err(AuthError::OtpInvalid)
    ));
    client.verify_phone(OTP_CODE).await.expect("phone verified");
    assert!(client.me().await.expect("me").phone_verified);
}

#[tokio::test]
async fn test_server_error_without_code_is_api_error() {
    let (api, client) = setup().await;
    api.fail_logout();

    match client.logout().await {
        Err(AuthError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    let api = MockAuthApi::spawn().await;
    let mut url = api.base_url();
    // Port 9 (discard) is not served.
    url.set_port(Some(9)).expect("http url takes a port");
    let client = AuthClient::new(url, Duration::from_secs(2)).expect("client builds");

    assert!(matches!(client.me().await, Err(AuthError::Http(_))));
}
