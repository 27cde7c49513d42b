//! Configuration
//!
//! Cart limits, relief rate, currency and content freshness windows, loaded
//! from YAML. Every field has a default, so an empty document is valid.
//!
//! ```yaml
//! cart:
//!   currency: GBP
//!   relief_rate: 25%
//!   donation_max_items: 20
//!   event_max_items: 10
//! content:
//!   freshness_window_ms: 3600000
//!   domains:
//!     events: 900000
//! ```

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use jiff::SignedDuration;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{CartKind, DONATION_MAX_ITEMS, EVENT_MAX_ITEMS},
    content::ContentDomain,
    money::{MoneyParseError, parse_currency, parse_percentage},
};

/// Default freshness window for cached content (one hour).
pub const DEFAULT_FRESHNESS_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid currency or relief rate
    #[error(transparent)]
    Money(#[from] MoneyParseError),

    /// A value is outside its accepted range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Cart settings
    pub cart: CartConfig,

    /// Content cache settings
    pub content: ContentConfig,
}

impl Config {
    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a value is out of range.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(yaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Config::from_yaml_str`] fails.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        debug!(path = %path.display(), "loading config");

        Self::from_yaml_str(&contents)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cart.currency()?;

        if self.cart.relief_rate()? * Decimal::ONE > Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "cart.relief_rate",
                reason: "must not exceed 100%",
            });
        }

        if self.cart.donation_max_items == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cart.donation_max_items",
                reason: "must be at least 1",
            });
        }

        if self.cart.event_max_items == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cart.event_max_items",
                reason: "must be at least 1",
            });
        }

        let negative_window = self.content.freshness_window_ms < 0
            || self.content.domains.values().any(|window| *window < 0);

        if negative_window {
            return Err(ConfigError::InvalidValue {
                field: "content.freshness_window_ms",
                reason: "must not be negative",
            });
        }

        Ok(())
    }
}

/// Cart settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartConfig {
    /// ISO currency code
    pub currency: String,

    /// Relief rate, as `"25%"` or `"0.25"`
    pub relief_rate: String,

    /// Line limit for donation carts
    pub donation_max_items: usize,

    /// Line limit for event-registration carts
    pub event_max_items: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            currency: "GBP".to_string(),
            relief_rate: "25%".to_string(),
            donation_max_items: DONATION_MAX_ITEMS,
            event_max_items: EVENT_MAX_ITEMS,
        }
    }
}

impl CartConfig {
    /// Configured currency.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported currency codes.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(parse_currency(&self.currency)?)
    }

    /// Configured relief rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not a non-negative number.
    pub fn relief_rate(&self) -> Result<Percentage, ConfigError> {
        Ok(parse_percentage(&self.relief_rate)?)
    }

    /// Line limit for carts of `kind`.
    pub fn max_items(&self, kind: CartKind) -> usize {
        match kind {
            CartKind::Donation => self.donation_max_items,
            CartKind::EventRegistration => self.event_max_items,
        }
    }
}

/// Content cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Freshness window used for domains without an override, in milliseconds
    pub freshness_window_ms: i64,

    /// Per-domain freshness windows, in milliseconds
    pub domains: FxHashMap<ContentDomain, i64>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW_MS,
            domains: FxHashMap::default(),
        }
    }
}

impl ContentConfig {
    /// Freshness window for `domain`.
    pub fn freshness_window(&self, domain: ContentDomain) -> SignedDuration {
        let millis = self
            .domains
            .get(&domain)
            .copied()
            .unwrap_or(self.freshness_window_ms);

        SignedDuration::from_millis(millis)
    }
}
