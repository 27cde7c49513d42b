//! Money
//!
//! Amount parsing and minor-unit helpers shared by the cart, configuration and
//! persistence layers. All amounts are held as [`Money`] values backed by ISO
//! currencies with two decimal places.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

/// Smallest accepted unit amount for a cart line, in minor units (0.50).
pub const MIN_UNIT_AMOUNT_MINOR: i64 = 50;

/// Largest accepted unit amount for a cart line, in minor units (50,000.00).
pub const MAX_UNIT_AMOUNT_MINOR: i64 = 5_000_000;

/// Errors raised while parsing amounts, currencies or percentages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    /// The amount string was not in the `AMOUNT CURRENCY` format or not numeric.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Unknown or unsupported currency code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The percentage string could not be parsed.
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),
}

/// Look up a supported ISO currency by its alpha code.
///
/// # Errors
///
/// Returns [`MoneyParseError::UnknownCurrency`] for anything other than `GBP`, `USD` or `EUR`.
pub fn parse_currency(code: &str) -> Result<&'static Currency, MoneyParseError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(MoneyParseError::UnknownCurrency(other.to_string())),
    }
}

/// Parse an amount string (e.g. `"10.50 GBP"`) into money.
///
/// Amounts are rounded to the nearest minor unit.
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`, if the
/// amount is not a decimal number, or if the currency code is not recognised.
pub fn parse_amount(s: &str) -> Result<Money<'static, Currency>, MoneyParseError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(MoneyParseError::InvalidAmount(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(code)?;
    let minor = decimal_to_minor(
        amount
            .parse::<Decimal>()
            .map_err(|_err| MoneyParseError::InvalidAmount(s.to_string()))?,
    )
    .ok_or_else(|| MoneyParseError::InvalidAmount(s.to_string()))?;

    Ok(Money::from_minor(minor, currency))
}

/// Format money as the `AMOUNT CURRENCY` string accepted by [`parse_amount`].
pub fn format_amount(money: &Money<'_, Currency>) -> String {
    format!(
        "{} {}",
        Decimal::new(money.to_minor_units(), 2),
        money.currency().iso_alpha_code
    )
}

/// Convert a major-unit decimal into minor units, rounding half away from zero.
pub fn decimal_to_minor(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Calculate `percent` of a minor unit amount, rounded to the nearest minor unit.
///
/// Returns `None` if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Option<i64> {
    let minor = Decimal::from_i64(minor)?;

    ((*percent) * Decimal::ONE) // Percentage doesn't expose its inner Decimal
        .checked_mul(minor)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Parse a percentage string (e.g. `"25%"` or `"0.25"`) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`MoneyParseError::InvalidPercentage`] if the value is not numeric or is negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, MoneyParseError> {
    let trimmed = s.trim();

    let value = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map(|value| value / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    }
    .map_err(|_err| MoneyParseError::InvalidPercentage(s.to_string()))?;

    if value.is_sign_negative() {
        return Err(MoneyParseError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(value))
}
