//! Account commands.
//!
//! The auth client keeps the session cookie for one invocation only; the
//! signed-in user survives between invocations in the persisted snapshot.

use chrono::Utc;
use clap::ValueEnum;
use secrecy::SecretString;

use fudsiti_core::{OtpRequestId, UserRole};
use fudsiti_storefront::error::AppError;
use fudsiti_storefront::services::account::{AccountService, OtpChallenge};
use fudsiti_storefront::validation::{EmailLoginForm, LoginForm, OtpForm, PhoneForm, SignupForm};

use crate::context::Context;
use crate::output;

/// Verification message channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Channel {
    Email,
    Phone,
}

/// Registration arguments.
pub struct SignupArgs {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub accept_terms: bool,
}

/// Sign in. With a phone the three-factor form is used, otherwise email only.
///
/// # Errors
///
/// Returns `AppError::Validation` or `AppError::Auth`.
pub async fn login(
    ctx: &mut Context,
    email: String,
    phone: Option<String>,
    password: String,
) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);
    let password = SecretString::from(password);

    let user = match phone {
        Some(phone) => {
            account
                .login(&LoginForm {
                    phone,
                    email,
                    password,
                })
                .await?
        }
        None => account.email_login(&EmailLoginForm { email, password }).await?,
    };

    output::line("Signed in");
    output::user(&user);
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Validation` or `AppError::Auth`.
pub async fn signup(ctx: &mut Context, args: SignupArgs) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    let form = SignupForm {
        name: args.name,
        phone: args.phone,
        email: args.email,
        password: SecretString::from(args.password),
        accept_terms: args.accept_terms,
        role: args.role,
    };
    let outcome = account.signup(&form).await?;

    output::line("Registered");
    output::user(&outcome.user);
    if outcome.email_verification_required {
        output::line("Confirm your email: fudsiti auth send-verification email");
    }
    if outcome.phone_verification_required {
        output::line("Confirm your phone: fudsiti auth send-verification phone");
    }
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Validation` or `AppError::Auth`.
pub async fn request_otp(ctx: &mut Context, phone: String) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    let challenge = account.request_otp(&PhoneForm { phone }).await?;
    output::line(format!("Code sent to {}", challenge.mask));
    output::line(format!("request id: {}", challenge.request_id));
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Validation` or `AppError::Auth`.
pub async fn verify_otp(
    ctx: &mut Context,
    phone: String,
    request_id: String,
    code: String,
    remember_me: bool,
    accept_terms: bool,
) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    let challenge = OtpChallenge {
        request_id: OtpRequestId::new(request_id),
        mask: phone.clone(),
        phone,
        requested_at: Utc::now(),
    };
    let form = OtpForm {
        code,
        remember_me,
        accept_terms,
    };
    let user = account.verify_otp(&challenge, &form).await?;

    output::line("Signed in");
    output::user(&user);
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Auth`.
pub async fn send_verification(ctx: &mut Context, channel: Channel) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    match channel {
        Channel::Email => account.send_email_verification().await?,
        Channel::Phone => account.send_phone_verification().await?,
    }
    output::line("Verification sent");
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Validation` or `AppError::Auth`.
pub async fn verify_phone(ctx: &mut Context, code: &str) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    let user = account.verify_phone(code).await?;
    output::line("Phone verified");
    output::user(&user);
    Ok(())
}

/// # Errors
///
/// Returns `AppError::Auth`.
pub async fn me(ctx: &mut Context) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    let user = account.refresh_profile().await?;
    output::user(&user);
    Ok(())
}

/// Sign out. The local session is cleared even when the API call fails.
///
/// # Errors
///
/// Returns `AppError::Auth` if the API call failed.
pub async fn logout(ctx: &mut Context) -> Result<(), AppError> {
    let client = ctx.auth_client()?;
    let mut account = AccountService::new(&client, &mut ctx.store);

    let result = account.logout().await;
    output::line("Signed out");
    Ok(result?)
}
