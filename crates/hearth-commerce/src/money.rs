//! Money type for representing monetary values.
//!
//! Uses minor-unit integer representation (paise, cents) to avoid
//! floating-point precision issues in monetary calculations. Every
//! percentage is applied in basis points and rounded half-up.

use crate::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Minor units per major unit (100 for INR).
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., paise for INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a Money value from a major-unit amount, rounding half away from zero.
    ///
    /// ```
    /// use hearth_commerce::money::{Money, Currency};
    /// let price = Money::from_major(249.99, Currency::INR);
    /// assert_eq!(price.amount_minor, 24999);
    /// ```
    pub fn from_major(amount: f64, currency: Currency) -> Self {
        let amount_minor = (amount * currency.minor_per_major() as f64).round() as i64;
        Self::new(amount_minor, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Convert to a major-unit value.
    pub fn to_major(&self) -> f64 {
        self.amount_minor as f64 / self.currency.minor_per_major() as f64
    }

    /// Format as a display string (e.g., "₹249.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "249.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$}", self.to_major())
    }

    /// Add another Money value of the same currency.
    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.same_currency(other)?;
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Subtract another Money value of the same currency.
    pub fn try_subtract(&self, other: &Money) -> Result<Money, CommerceError> {
        self.same_currency(other)?;
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Multiply by a scalar quantity.
    pub fn try_multiply(&self, factor: i64) -> Result<Money, CommerceError> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Take `basis_points / 10_000` of this amount, rounding half-up.
    ///
    /// 1_000 basis points is 10%.
    pub fn basis_points(&self, basis_points: i64) -> Money {
        let product = self.amount_minor as i128 * basis_points as i128;
        let rounded = if product >= 0 {
            (product + 5_000) / 10_000
        } else {
            (product - 5_000) / 10_000
        };
        Money::new(rounded as i64, self.currency)
    }

    /// Calculate a percentage of this amount, rounding half-up.
    pub fn percentage(&self, percent: f64) -> Money {
        self.basis_points((percent * 100.0).round() as i64)
    }

    /// The smaller of two amounts in the same currency.
    pub fn min(self, other: Money) -> Money {
        if other.amount_minor < self.amount_minor {
            other
        } else {
            self
        }
    }

    fn same_currency(&self, other: &Money) -> Result<(), CommerceError> {
        if self.currency != other.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
