//! Type-safe price representation using decimal arithmetic.
//!
//! Arithmetic saturates at `Decimal::MAX` rather than panicking on overflow.

use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts and quantities are exact decimals, so weighed goods
/// (1.5 kg at 120 per kg) total without floating point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., roubles, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: Decimal) -> Self {
        Self::new(self.amount.saturating_mul(quantity), self.currency_code)
    }

    /// Format for display, e.g. `2500 ₽` or `12.5 $`.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{} {}",
            self.amount.round_dp(2).normalize(),
            self.currency_code.symbol()
        )
    }
}

impl Add for Price {
    type Output = Self;

    /// Adds amounts; the left-hand currency is kept.
    fn add(self, rhs: Self) -> Self {
        Self::new(self.amount.saturating_add(rhs.amount), self.currency_code)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.amount = self.amount.saturating_add(rhs.amount);
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::RUB => "₽",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_is_exact() {
        let per_kg = Price::new(Decimal::new(120, 0), CurrencyCode::RUB);
        let total = per_kg.times(Decimal::new(15, 1));
        assert_eq!(total.amount, Decimal::new(180, 0));
    }

    #[test]
    fn test_add_keeps_currency() {
        let mut total = Price::zero(CurrencyCode::RUB);
        total += Price::new(Decimal::new(250, 1), CurrencyCode::RUB);
        total = total + Price::new(Decimal::new(5, 1), CurrencyCode::RUB);
        assert_eq!(total.amount, Decimal::new(26, 0));
        assert_eq!(total.currency_code, CurrencyCode::RUB);
    }

    #[test]
    fn test_overflow_saturates() {
        let max = Price::new(Decimal::MAX, CurrencyCode::RUB);
        assert_eq!(max.times(Decimal::TEN).amount, Decimal::MAX);
        assert_eq!((max + max).amount, Decimal::MAX);

        let mut total = max;
        total += max;
        assert_eq!(total.amount, Decimal::MAX);
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(250_000, 2), CurrencyCode::RUB);
        assert_eq!(price.display(), "2500 ₽");

        let price = Price::new(Decimal::new(1250, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "12.5 $");
    }
}
