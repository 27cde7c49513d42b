//! Mandir prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartItem, CartItemId, CartKind, CartSummary, CartTotals,
        CheckoutHandler, CheckoutRequest, InvalidItem, NewCartItem, PaymentFailed,
        QuantityChange, RELIEF_RATE, TotalsError,
    },
    config::{CartConfig, Config, ConfigError, ContentConfig},
    content::{
        ContentCache, ContentDiff, ContentDomain, ContentItem, ContentRecord, ContentSnapshot,
        RefreshOutcome, is_stale,
    },
    money::{MoneyParseError, parse_amount},
    persistence::{KeyValueStore, MemoryStore, PersistenceError, load_cart, save_cart},
    quotes::{Quote, QuoteBook, QuoteError, quote_index},
};
