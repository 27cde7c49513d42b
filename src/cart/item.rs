//! Cart Items

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::money::{MAX_UNIT_AMOUNT_MINOR, MIN_UNIT_AMOUNT_MINOR};

/// Maximum length of a line message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Reasons a new line item is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidItem {
    /// The category label was empty or whitespace.
    #[error("category is required")]
    MissingCategory,

    /// No unit amount was supplied.
    #[error("unit amount is required")]
    MissingAmount,

    /// The unit amount was zero or negative.
    #[error("unit amount must be positive")]
    NonPositiveAmount,

    /// The unit amount was outside the accepted range (all values in minor units).
    #[error("unit amount {amount} is outside the range {min}..={max}")]
    AmountOutOfRange {
        /// Supplied amount
        amount: i64,
        /// Minimum accepted amount
        min: i64,
        /// Maximum accepted amount
        max: i64,
    },

    /// The item currency differs from the cart currency (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// An item with the same id is already in the cart.
    #[error("an item with id {0} is already in the cart")]
    DuplicateId(CartItemId),

    /// Multiplying the unit amount by the quantity overflowed.
    #[error("line total overflowed")]
    TotalOverflow,
}

/// Cart line identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CartItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CartItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unvalidated line item data passed to [`Cart::add_item`](crate::cart::Cart::add_item).
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    /// Caller-supplied id; generated when absent.
    pub id: Option<CartItemId>,

    /// Donation purpose or event identifier.
    pub category: String,

    /// Price of a single unit.
    pub unit_amount: Option<Money<'static, Currency>>,

    /// Requested quantity; absent or non-positive values become 1.
    pub quantity: Option<i64>,

    /// Optional date the line refers to (event day, dedication day, ...).
    pub date: Option<Date>,

    /// Optional free-text message, sanitized on add.
    pub message: Option<String>,
}

impl NewCartItem {
    /// Create line data for a single unit of `category` at `unit_amount`.
    pub fn new(category: impl Into<String>, unit_amount: Money<'static, Currency>) -> Self {
        Self {
            id: None,
            category: category.into(),
            unit_amount: Some(unit_amount),
            quantity: None,
            date: None,
            message: None,
        }
    }

    /// Set the line id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<CartItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the date.
    #[must_use]
    pub fn with_date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A validated cart line.
///
/// `total` is always `unit_amount * quantity`; there is no way to set it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    id: CartItemId,
    category: String,
    unit_amount: Money<'static, Currency>,
    quantity: u32,
    total: Money<'static, Currency>,
    date: Option<Date>,
    message: Option<String>,
}

impl CartItem {
    /// Validate new line data against the cart currency.
    ///
    /// Duplicate ids and capacity are checked by the cart, not here.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidItem`] describing the first failed check.
    pub fn validate(item: NewCartItem, currency: &'static Currency) -> Result<Self, InvalidItem> {
        let category = item.category.trim();

        if category.is_empty() {
            return Err(InvalidItem::MissingCategory);
        }

        let unit_amount = item.unit_amount.ok_or(InvalidItem::MissingAmount)?;
        let amount = unit_amount.to_minor_units();

        if amount <= 0 {
            return Err(InvalidItem::NonPositiveAmount);
        }

        if !(MIN_UNIT_AMOUNT_MINOR..=MAX_UNIT_AMOUNT_MINOR).contains(&amount) {
            return Err(InvalidItem::AmountOutOfRange {
                amount,
                min: MIN_UNIT_AMOUNT_MINOR,
                max: MAX_UNIT_AMOUNT_MINOR,
            });
        }

        if unit_amount.currency() != currency {
            return Err(InvalidItem::CurrencyMismatch(
                unit_amount.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let quantity = item
            .quantity
            .and_then(|quantity| u32::try_from(quantity).ok())
            .filter(|quantity| *quantity > 0)
            .unwrap_or(1);

        let total = line_total(&unit_amount, quantity).ok_or(InvalidItem::TotalOverflow)?;

        Ok(Self {
            id: item.id.unwrap_or_else(CartItemId::generate),
            category: category.to_string(),
            unit_amount,
            quantity,
            total,
            date: item.date,
            message: item.message.as_deref().and_then(sanitize_message),
        })
    }

    /// Line id.
    pub fn id(&self) -> &CartItemId {
        &self.id
    }

    /// Donation purpose or event identifier.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Price of a single unit.
    pub fn unit_amount(&self) -> &Money<'static, Currency> {
        &self.unit_amount
    }

    /// Number of units.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line total (`unit_amount * quantity`).
    pub fn total(&self) -> &Money<'static, Currency> {
        &self.total
    }

    /// Date the line refers to.
    pub fn date(&self) -> Option<Date> {
        self.date
    }

    /// Sanitized message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Change the quantity, recomputing the total.
    ///
    /// Leaves the line untouched if the new total would overflow.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> Result<(), InvalidItem> {
        self.total = line_total(&self.unit_amount, quantity).ok_or(InvalidItem::TotalOverflow)?;
        self.quantity = quantity;

        Ok(())
    }
}

fn line_total(
    unit_amount: &Money<'static, Currency>,
    quantity: u32,
) -> Option<Money<'static, Currency>> {
    unit_amount
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, unit_amount.currency()))
}

/// Clean a free-text message for display and storage.
///
/// Drops control characters (except newlines) and angle brackets, trims
/// surrounding whitespace and truncates to [`MAX_MESSAGE_CHARS`]. Returns `None`
/// when nothing is left.
pub fn sanitize_message(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| *ch == '\n' || !ch.is_control())
        .filter(|ch| !matches!(ch, '<' | '>'))
        .collect();

    let message: String = cleaned.trim().chars().take(MAX_MESSAGE_CHARS).collect();
    let message = message.trim_end();

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
