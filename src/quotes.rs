//! Daily Quotes
//!
//! One quote per calendar day. Quote books are laid out on a leap-year
//! calendar: index 0 is 1 January, 59 is 29 February, 60 is 1 March and 365
//! is 31 December. Dates resolve by month and day, so 1 March shows the same
//! quote in every year and 29 February only appears in leap years.

use std::{fs, path::Path};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Number of days in the leap-year calendar a full quote book covers.
pub const LEAP_CALENDAR_DAYS: usize = 366;

/// Month lengths of a leap year.
const LEAP_MONTH_LENGTHS: [u16; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Errors raised while loading or reading a quote book.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The book has no quotes.
    #[error("quote book is empty")]
    Empty,

    /// IO error reading the quote file
    #[error("Failed to read quote file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// A single quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Quote text
    pub text: String,

    /// Attribution, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Position of `date` in the leap-year calendar (0-based).
///
/// ```
/// use jiff::civil::date;
/// use mandir::quotes::quote_index;
///
/// assert_eq!(quote_index(date(2024, 2, 29)), 59);
/// assert_eq!(quote_index(date(2023, 3, 1)), 60);
/// assert_eq!(quote_index(date(2024, 3, 1)), 60);
/// ```
pub fn quote_index(date: Date) -> usize {
    let month = usize::from(date.month().unsigned_abs());
    let day = usize::from(date.day().unsigned_abs());

    let days_before_month: usize = LEAP_MONTH_LENGTHS
        .iter()
        .take(month.saturating_sub(1))
        .map(|days| usize::from(*days))
        .sum();

    days_before_month + day.saturating_sub(1)
}

/// Ordered quotes, one per day of the leap-year calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl QuoteBook {
    /// Create a book from quotes in calendar order.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Empty`] if `quotes` is empty.
    pub fn new(quotes: Vec<Quote>) -> Result<Self, QuoteError> {
        if quotes.is_empty() {
            return Err(QuoteError::Empty);
        }

        if quotes.len() != LEAP_CALENDAR_DAYS {
            debug!(
                quotes = quotes.len(),
                "quote book does not cover every day, indexes will wrap"
            );
        }

        Ok(Self { quotes })
    }

    /// Parse a YAML document of the form `quotes: [{ text: ..., source: ... }, ...]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or contains no quotes.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, QuoteError> {
        let book: Self = serde_norway::from_str(yaml)?;

        Self::new(book.quotes)
    }

    /// Read and parse a YAML quote file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`QuoteBook::from_yaml_str`] fails.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuoteError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// The quote for `date`.
    ///
    /// Books shorter than [`LEAP_CALENDAR_DAYS`] wrap around.
    pub fn quote_for(&self, date: Date) -> Option<&Quote> {
        let len = self.quotes.len();

        if len == 0 {
            return None;
        }

        self.quotes.get(quote_index(date) % len)
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the book has no quotes. Always `false` for books built through [`QuoteBook::new`].
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
