//! Cart
//!
//! An ordered list of donation or event-registration lines with derived
//! totals. A [`Cart`] is owned by a single coordinator; every mutation goes
//! through `&mut self`, so callers sharing one across tasks must serialize
//! access themselves.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    slice::Iter,
};

use decimal_percentage::Percentage;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{CartConfig, ConfigError};

pub mod checkout;
pub mod item;
pub mod summary;
pub mod totals;

pub use checkout::{CheckoutHandler, CheckoutRequest, PaymentFailed};
pub use item::{CartItem, CartItemId, InvalidItem, NewCartItem};
pub use summary::CartSummary;
pub use totals::{CartTotals, RELIEF_RATE, TotalsError};

/// Default line limit for donation carts.
pub const DONATION_MAX_ITEMS: usize = 20;

/// Default line limit for event-registration carts.
pub const EVENT_MAX_ITEMS: usize = 10;

/// Errors returned by cart operations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The new line failed validation.
    #[error("invalid item: {0}")]
    InvalidItem(#[from] InvalidItem),

    /// The cart already holds the maximum number of lines.
    #[error("cart already holds the maximum of {max} items")]
    CapacityExceeded {
        /// Line limit of the cart
        max: usize,
    },

    /// Checkout was attempted with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The amount to charge could not be calculated.
    #[error("failed to calculate cart totals: {0}")]
    Totals(#[from] TotalsError),

    /// The payment collaborator rejected the checkout.
    #[error(transparent)]
    Checkout(#[from] PaymentFailed),
}

/// What a cart is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartKind {
    /// Donations to temple funds.
    Donation,

    /// Registrations for temple events.
    EventRegistration,
}

impl CartKind {
    /// Line limit used when no configuration overrides it.
    pub const fn default_max_items(self) -> usize {
        match self {
            Self::Donation => DONATION_MAX_ITEMS,
            Self::EventRegistration => EVENT_MAX_ITEMS,
        }
    }

    /// Stable name used in logs and persisted state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::EventRegistration => "event_registration",
        }
    }
}

impl Display for CartKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`Cart::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has the requested quantity.
    Updated,

    /// The quantity was zero or negative and the line was removed.
    Removed,

    /// No line has the given id; nothing changed.
    NotFound,

    /// The new total could not be represented; nothing changed.
    Rejected,
}

/// Donation or event-registration cart.
#[derive(Debug, Clone)]
pub struct Cart {
    kind: CartKind,
    currency: &'static Currency,
    max_items: usize,
    relief_rate: Percentage,
    relief_enabled: bool,
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart with the default limit for `kind` and the standard relief rate.
    pub fn new(kind: CartKind, currency: &'static Currency) -> Self {
        Self {
            kind,
            currency,
            max_items: kind.default_max_items(),
            relief_rate: Percentage::from(RELIEF_RATE),
            relief_enabled: false,
            items: Vec::new(),
        }
    }

    /// Create an empty cart using the currency, limits and relief rate from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the currency or relief rate cannot be parsed.
    pub fn from_config(kind: CartKind, config: &CartConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(kind, config.currency()?)
            .with_max_items(config.max_items(kind))
            .with_relief_rate(config.relief_rate()?))
    }

    /// Override the line limit.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Override the relief rate.
    #[must_use]
    pub fn with_relief_rate(mut self, relief_rate: Percentage) -> Self {
        self.relief_rate = relief_rate;
        self
    }

    /// Validate and append a line.
    ///
    /// Returns the id of the new line, which is generated when `item.id` is absent.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidItem`]: the line failed validation or reuses an existing id.
    /// - [`CartError::CapacityExceeded`]: the cart is full.
    ///
    /// The cart is unchanged on error.
    #[tracing::instrument(
        name = "cart.add_item",
        skip(self, item),
        fields(kind = %self.kind, category = %item.category)
    )]
    pub fn add_item(&mut self, item: NewCartItem) -> Result<CartItemId, CartError> {
        let item = CartItem::validate(item, self.currency).inspect_err(|error| {
            warn!(%error, "rejected cart item");
        })?;

        if self.items.len() >= self.max_items {
            warn!(max = self.max_items, "cart is full");

            return Err(CartError::CapacityExceeded {
                max: self.max_items,
            });
        }

        if self.position(item.id()).is_some() {
            warn!(item_id = %item.id(), "duplicate cart item id");

            return Err(InvalidItem::DuplicateId(item.id().clone()).into());
        }

        let id = item.id().clone();

        debug!(item_id = %id, total = %item.total(), "added cart item");

        self.items.push(item);

        Ok(id)
    }

    /// Remove the first line with the given id.
    ///
    /// Returns the removed line, or `None` if no line matched.
    #[tracing::instrument(name = "cart.remove_item", skip(self), fields(kind = %self.kind))]
    pub fn remove_item(&mut self, id: &CartItemId) -> Option<CartItem> {
        let Some(idx) = self.position(id) else {
            debug!("no cart item to remove");
            return None;
        };

        debug!("removed cart item");

        Some(self.items.remove(idx))
    }

    /// Change the quantity of a line, keeping its position.
    ///
    /// Zero or negative quantities remove the line.
    #[tracing::instrument(name = "cart.update_quantity", skip(self), fields(kind = %self.kind))]
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: i64) -> QuantityChange {
        if quantity <= 0 {
            return match self.remove_item(id) {
                Some(_) => QuantityChange::Removed,
                None => QuantityChange::NotFound,
            };
        }

        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            debug!("no cart item to update");
            return QuantityChange::NotFound;
        };

        let result = u32::try_from(quantity)
            .map_err(|_err| InvalidItem::TotalOverflow)
            .and_then(|quantity| item.set_quantity(quantity));

        match result {
            Ok(()) => {
                debug!(total = %item.total(), "updated cart item quantity");
                QuantityChange::Updated
            }
            Err(error) => {
                warn!(%error, "ignored cart quantity update");
                QuantityChange::Rejected
            }
        }
    }

    /// Remove every line and disable relief.
    pub fn clear(&mut self) {
        self.items.clear();
        self.relief_enabled = false;

        debug!(kind = %self.kind, "cleared cart");
    }

    /// Enable or disable tax relief. Lines are not touched.
    pub fn set_relief_enabled(&mut self, enabled: bool) {
        self.relief_enabled = enabled;
    }

    /// Compute the current totals.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if the arithmetic fails.
    pub fn try_totals(&self) -> Result<CartTotals, TotalsError> {
        CartTotals::compute(
            &self.items,
            self.currency,
            self.relief_enabled.then_some(&self.relief_rate),
        )
    }

    /// Compute the current totals, falling back to zero totals if the arithmetic fails.
    ///
    /// For display only; anything that charges the payer goes through [`Cart::try_totals`].
    pub fn totals(&self) -> CartTotals {
        self.try_totals().unwrap_or_else(|error| {
            warn!(%error, kind = %self.kind, "cart totals failed, reporting zero");
            CartTotals::zero(self.currency)
        })
    }

    /// Build the request handed to the payment collaborator.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`]: there is nothing to pay for.
    /// - [`CartError::Totals`]: the grand total could not be calculated.
    pub fn checkout_request(&self) -> Result<CheckoutRequest, CartError> {
        if self.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let totals = self.try_totals()?;

        Ok(CheckoutRequest {
            kind: self.kind,
            grand_total: totals.grand_total,
            relief_enabled: self.relief_enabled,
            items: self.items.clone(),
        })
    }

    /// Submit the cart to `handler`, clearing it once payment succeeds.
    ///
    /// Returns the request that was paid for.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`]: there is nothing to pay for.
    /// - [`CartError::Totals`]: the grand total could not be calculated; the handler is not called.
    /// - [`CartError::Checkout`]: the handler reported a failure; the cart is left as it was.
    #[tracing::instrument(
        name = "cart.checkout",
        skip(self, handler),
        fields(kind = %self.kind, items = self.items.len())
    )]
    pub fn checkout(
        &mut self,
        handler: &impl CheckoutHandler,
    ) -> Result<CheckoutRequest, CartError> {
        let request = self.checkout_request()?;

        handler.submit(&request).inspect_err(|error| {
            warn!(%error, "checkout failed");
        })?;

        info!(grand_total = %request.grand_total, "checkout completed");

        self.clear();

        Ok(request)
    }

    /// Kind of cart.
    pub fn kind(&self) -> CartKind {
        self.kind
    }

    /// Currency of every line.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Line limit.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Whether tax relief is enabled.
    pub fn relief_enabled(&self) -> bool {
        self.relief_enabled
    }

    /// Look up a line by id.
    pub fn get(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another line would exceed the limit.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items
    }

    fn position(&self, id: &CartItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
