//! Integration test support for Fudsiti.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fudsiti-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `store_persistence` - File-backed snapshots through the store
//! - `auth_client` - HTTP client against the in-process mock API
//! - `account_flows` - Form flows combining the client and the store
//!
//! [`MockAuthApi`] serves the auth endpoints from memory on an ephemeral
//! port, with one seeded account ([`SEED_EMAIL`] / [`SEED_PASSWORD`]).

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

pub const SEED_EMAIL: &str = "maria@example.com";
pub const SEED_PHONE: &str = "+79998887766";
pub const SEED_PASSWORD: &str = "Str0ng!pass";
/// The only code the mock accepts.
pub const OTP_CODE: &str = "123456";
/// Requesting a code for this phone is refused.
pub const BLOCKED_PHONE: &str = "+70000000000";

const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone)]
struct Account {
    id: String,
    name: String,
    email: String,
    phone: String,
    password: String,
    role: String,
    email_verified: bool,
    phone_verified: bool,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
            "emailVerified": self.email_verified,
            "phoneVerified": self.phone_verified,
            "addresses": [],
            "orders": [],
        })
    }
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<Account>,
    /// Session token to account ID.
    sessions: HashMap<String, String>,
    /// OTP request ID to phone.
    otp_requests: HashMap<String, String>,
    verifications_sent: Vec<String>,
    fail_logout: bool,
    requests: Vec<String>,
    next_id: u32,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn open_session(&mut self, account_id: &str) -> String {
        let token = self.next_id("session");
        self.sessions.insert(token.clone(), account_id.to_string());
        token
    }

    fn session_account(&self, headers: &HeaderMap) -> Option<&Account> {
        let token = session_token(headers)?;
        let account_id = self.sessions.get(&token)?;
        self.accounts.iter().find(|a| &a.id == account_id)
    }
}

type Shared = Arc<Mutex<MockState>>;

/// In-process auth API.
#[derive(Clone)]
pub struct MockAuthApi {
    base_url: Url,
    state: Shared,
}

impl MockAuthApi {
    /// Bind to an ephemeral port and serve in the background.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        {
            let mut s = state.lock().unwrap();
            s.accounts.push(Account {
                id: "u-seed".to_string(),
                name: "Maria".to_string(),
                email: SEED_EMAIL.to_string(),
                phone: SEED_PHONE.to_string(),
                password: SEED_PASSWORD.to_string(),
                role: "buyer".to_string(),
                email_verified: true,
                phone_verified: false,
            });
        }

        let app = Router::new()
            .route("/auth/email/login", post(login))
            .route("/auth/email/signup", post(signup))
            .route("/auth/phone/request-otp", post(request_otp))
            .route("/auth/phone/verify-otp", post(verify_otp))
            .route("/auth/email/send-verify", post(send_email_verify))
            .route("/auth/phone/send-verify", post(send_phone_verify))
            .route("/auth/phone/verify", post(verify_phone))
            .route("/auth/me", get(me))
            .route("/auth/logout", post(logout))
            .route("/auth/refresh", post(refresh))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Paths requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Number of open server-side sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Verification channels requested so far (`email`, `phone`).
    #[must_use]
    pub fn verifications_sent(&self) -> Vec<String> {
        self.lock().verifications_sent.clone()
    }

    /// Make `POST /auth/logout` answer 500.
    pub fn fail_logout(&self) {
        self.lock().fail_logout = true;
    }

    /// Drop every server-side session.
    pub fn expire_sessions(&self) {
        self.lock().sessions.clear();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn error(status: StatusCode, code: Option<&str>, message: &str) -> Response {
    let body = match code {
        Some(code) => json!({"error": {"code": code, "message": message}}),
        None => json!({"error": {"message": message}}),
    };
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, None, "no session")
}

fn with_session(token: &str, body: Value) -> Response {
    (
        [(SET_COOKIE, format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly"))],
        Json(body),
    )
        .into_response()
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/email/login".to_string());

    let email = field(&body, "email");
    let password = field(&body, "password");
    let phone = body.get("phone").and_then(Value::as_str);

    let Some(account) = s
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password && phone.is_none_or(|p| p == a.phone))
        .cloned()
    else {
        return error(
            StatusCode::UNAUTHORIZED,
            Some("INVALID_CREDENTIALS"),
            "wrong email or password",
        );
    };

    let token = s.open_session(&account.id);
    with_session(
        &token,
        json!({
            "user": account.to_json(),
            "session": {"id": token, "expiresAt": "2030-01-01T00:00:00Z"},
        }),
    )
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/email/signup".to_string());

    let email = field(&body, "email").to_string();
    let phone = field(&body, "phone").to_string();

    if s.accounts.iter().any(|a| a.email == email) {
        return error(StatusCode::CONFLICT, Some("EMAIL_IN_USE"), "email taken");
    }
    // Code only inside the message, as older API versions send it.
    if s.accounts.iter().any(|a| a.phone == phone) {
        return error(StatusCode::CONFLICT, None, "PHONE_IN_USE: phone taken");
    }

    let account = Account {
        id: s.next_id("u"),
        name: field(&body, "name").to_string(),
        email,
        phone,
        password: field(&body, "password").to_string(),
        role: field(&body, "role").to_string(),
        email_verified: false,
        phone_verified: false,
    };
    let user = account.to_json();
    s.accounts.push(account);

    Json(json!({
        "user": user,
        "email_verification_required": true,
        "phone_verification_required": false,
    }))
    .into_response()
}

async fn request_otp(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/phone/request-otp".to_string());

    if field(&body, "purpose") != "login" || field(&body, "channel") != "sms" {
        return error(StatusCode::BAD_REQUEST, None, "unsupported purpose or channel");
    }
    let phone = field(&body, "phone").to_string();
    if phone == BLOCKED_PHONE {
        return error(StatusCode::FORBIDDEN, Some("PHONE_BLOCKED"), "blocked");
    }

    let request_id = s.next_id("otp");
    s.otp_requests.insert(request_id.clone(), phone.clone());
    let tail = phone.get(phone.len().saturating_sub(4)..).unwrap_or_default();
    Json(json!({"request_id": request_id, "mask": format!("*** {tail}")})).into_response()
}

async fn verify_otp(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/phone/verify-otp".to_string());

    let Some(phone) = s.otp_requests.get(field(&body, "request_id")).cloned() else {
        return error(StatusCode::BAD_REQUEST, Some("OTP_EXPIRED"), "unknown request");
    };
    if field(&body, "code") != OTP_CODE {
        return error(StatusCode::BAD_REQUEST, None, "OTP_INVALID");
    }
    if body.get("accept_terms").and_then(Value::as_bool) != Some(true) {
        return error(StatusCode::BAD_REQUEST, None, "terms not accepted");
    }

    let Some(account_id) = s
        .accounts
        .iter()
        .find(|a| a.phone == phone)
        .map(|a| a.id.clone())
    else {
        return error(StatusCode::NOT_FOUND, None, "no account for phone");
    };
    let token = s.open_session(&account_id);
    with_session(&token, json!({"ok": true}))
}

async fn send_email_verify(State(state): State<Shared>, headers: HeaderMap) -> Response {
    send_verify(&state, &headers, "email")
}

async fn send_phone_verify(State(state): State<Shared>, headers: HeaderMap) -> Response {
    send_verify(&state, &headers, "phone")
}

fn send_verify(state: &Shared, headers: &HeaderMap, channel: &str) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push(format!("/auth/{channel}/send-verify"));
    if s.session_account(headers).is_none() {
        return unauthorized();
    }
    s.verifications_sent.push(channel.to_string());
    StatusCode::NO_CONTENT.into_response()
}

async fn verify_phone(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/phone/verify".to_string());

    let Some(account_id) = s.session_account(&headers).map(|a| a.id.clone()) else {
        return unauthorized();
    };
    if field(&body, "code") != OTP_CODE {
        return error(StatusCode::BAD_REQUEST, Some("OTP_INVALID"), "wrong code");
    }
    if let Some(account) = s.accounts.iter_mut().find(|a| a.id == account_id) {
        account.phone_verified = true;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/me".to_string());
    match s.session_account(&headers) {
        Some(account) => Json(account.to_json()).into_response(),
        None => unauthorized(),
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/logout".to_string());
    if s.fail_logout {
        return error(StatusCode::INTERNAL_SERVER_ERROR, None, "boom");
    }
    if let Some(token) = session_token(&headers) {
        s.sessions.remove(&token);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("/auth/refresh".to_string());
    if s.session_account(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, Some("UNAUTHORIZED"), "session expired");
    }
    Json(json!({})).into_response()
}
