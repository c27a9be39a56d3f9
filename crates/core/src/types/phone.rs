//! Phone number type (E.164).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The number does not start with `+`.
    #[error("phone number must start with +")]
    MissingPlus,
    /// The country code starts with zero or a non-digit follows the `+`.
    #[error("phone number must start with a non-zero country code")]
    InvalidCountryCode,
    /// Something other than a digit appears after the `+`.
    #[error("phone number may only contain digits after +")]
    NonDigit,
    /// Wrong number of digits.
    #[error("phone number must have between {min} and {max} digits")]
    Length {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A phone number in E.164 form: `+`, a non-zero digit, then 7 to 14 digits.
///
/// ```
/// use fudsiti_core::Phone;
///
/// assert!(Phone::parse("+79991234567").is_ok());
/// assert!(Phone::parse("89991234567").is_err());
/// assert!(Phone::parse("+0123456789").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits after the `+`.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits after the `+`.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input is not an E.164 number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = s.strip_prefix('+').ok_or(PhoneError::MissingPlus)?;

        match digits.chars().next() {
            Some('1'..='9') => {}
            _ => return Err(PhoneError::InvalidCountryCode),
        }

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice, including the leading `+`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(Phone::parse("+79991234567").is_ok());
        assert!(Phone::parse("+12345678").is_ok());
        assert!(Phone::parse("+123456789012345").is_ok());
    }

    #[test]
    fn test_parse_rejects_missing_plus() {
        assert_eq!(Phone::parse("79991234567"), Err(PhoneError::MissingPlus));
    }

    #[test]
    fn test_parse_rejects_zero_country_code() {
        assert_eq!(
            Phone::parse("+09991234567"),
            Err(PhoneError::InvalidCountryCode)
        );
        assert_eq!(Phone::parse("+"), Err(PhoneError::InvalidCountryCode));
    }

    #[test]
    fn test_parse_rejects_separators() {
        assert_eq!(Phone::parse("+7 999 123 45 67"), Err(PhoneError::NonDigit));
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            Phone::parse("+1234567"),
            Err(PhoneError::Length { .. })
        ));
        assert!(matches!(
            Phone::parse("+1234567890123456"),
            Err(PhoneError::Length { .. })
        ));
    }
}
