//! Form validation.
//!
//! Each form collects every failing field rather than stopping at the first,
//! so a caller can mark all invalid inputs at once. Server-side errors are
//! mapped onto the same [`FormField`]s by `AuthError::feedback`.

use std::fmt;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use fudsiti_core::{Email, Phone, UserRole};

use crate::models::{CartItem, NewAddress};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Special characters a password must draw from.
pub const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// Name length bounds, in characters.
pub const NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=50;

/// Length of a one-time code.
pub const OTP_LENGTH: usize = 6;

/// An input field a message can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Phone,
    Email,
    Password,
    AcceptTerms,
    Role,
    Code,
    City,
    Street,
    House,
    Quantity,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Password => "password",
            Self::AcceptTerms => "accept_terms",
            Self::Role => "role",
            Self::Code => "code",
            Self::City => "city",
            Self::Street => "street",
            Self::House => "house",
            Self::Quantity => "quantity",
        };
        f.write_str(name)
    }
}

/// A message attached to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One or more invalid fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", format_field_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// All field errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The first message for `field`, if any.
    #[must_use]
    pub fn message_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn has(&self, field: FormField) -> bool {
        self.message_for(field).is_some()
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if let Err(e) = Email::parse(email) {
        errors.push(FormField::Email, format!("enter a valid email address ({e})"));
    }
}

fn check_phone(errors: &mut ValidationErrors, phone: &str) {
    if Phone::parse(phone).is_err() {
        errors.push(FormField::Phone, "invalid phone number format (E.164)");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &SecretString) {
    if let Err(message) = password_rule(password.expose_secret()) {
        errors.push(FormField::Password, message);
    }
}

/// Check a password against the strength rules.
///
/// The password needs a lowercase letter, an uppercase letter, a digit and
/// one of `@$!%*?&`. Only the first character is restricted to that
/// alphabet; later characters may be anything.
///
/// # Errors
///
/// Returns a message describing the first unmet rule.
pub fn password_rule(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("password must be at least 8 characters");
    }

    let allowed = password
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(&c));
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(&c));

    if allowed && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err("password must contain upper and lower case letters, digits and one of @$!%*?&")
    }
}

fn check_accept_terms(errors: &mut ValidationErrors, accept_terms: bool) {
    if !accept_terms {
        errors.push(FormField::AcceptTerms, "you must accept the terms of use");
    }
}

fn check_required(errors: &mut ValidationErrors, field: FormField, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, format!("{field} is required"));
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Phone + email + password sign-in.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub phone: String,
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_phone(&mut errors, &self.phone);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

/// Email + password sign-in.
#[derive(Debug, Clone)]
pub struct EmailLoginForm {
    pub email: String,
    pub password: SecretString,
}

impl EmailLoginForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

/// Account registration.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: SecretString,
    pub accept_terms: bool,
    pub role: UserRole,
}

impl SignupForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name_len = self.name.trim().chars().count();
        if name_len < *NAME_LENGTH.start() {
            errors.push(FormField::Name, "name must be at least 2 characters");
        } else if name_len > *NAME_LENGTH.end() {
            errors.push(FormField::Name, "name must be at most 50 characters");
        }

        check_phone(&mut errors, &self.phone);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        check_accept_terms(&mut errors, self.accept_terms);

        if self.role == UserRole::Admin {
            errors.push(FormField::Role, "choose buyer or seller");
        }

        errors.into_result()
    }
}

/// Phone entry before requesting a one-time code.
#[derive(Debug, Clone)]
pub struct PhoneForm {
    pub phone: String,
}

impl PhoneForm {
    /// # Errors
    ///
    /// Returns the phone error, if any.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_phone(&mut errors, &self.phone);
        errors.into_result()
    }
}

/// One-time code entry.
#[derive(Debug, Clone)]
pub struct OtpForm {
    pub code: String,
    pub remember_me: bool,
    pub accept_terms: bool,
}

impl OtpForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.code.chars().count() != OTP_LENGTH {
            errors.push(FormField::Code, "code must be 6 digits");
        }
        check_accept_terms(&mut errors, self.accept_terms);
        errors.into_result()
    }
}

/// Validate a new delivery address.
///
/// # Errors
///
/// Returns every missing required field.
pub fn validate_address(address: &NewAddress) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_required(&mut errors, FormField::City, &address.city);
    check_required(&mut errors, FormField::Street, &address.street);
    check_required(&mut errors, FormField::House, &address.house);
    errors.into_result()
}

/// Validate a cart line before it is added.
///
/// The store accepts any quantity; callers use this to reject non-positive ones.
///
/// # Errors
///
/// Returns a quantity error if the quantity is zero or negative.
pub fn validate_cart_item(item: &CartItem) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if item.quantity <= Decimal::ZERO {
        errors.push(FormField::Quantity, "quantity must be positive");
    }
    errors.into_result()
}
