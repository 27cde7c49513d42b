//! Persistence
//!
//! Serializable shapes for cart and content state, plus a small key-value
//! store seam. The embedding application decides when (and whether) to save;
//! nothing in the cart or content modules persists on its own.

use jiff::{Timestamp, civil::Date};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError, CartItem, CartKind, NewCartItem},
    config::{CartConfig, ConfigError},
    content::{ContentItem, ContentSnapshot},
    money::{MoneyParseError, format_amount, parse_amount, parse_currency},
};

/// Errors raised while saving or restoring state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// YAML encoding or decoding failed
    #[error("Failed to encode or decode state: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A stored amount could not be parsed
    #[error(transparent)]
    Money(#[from] MoneyParseError),

    /// Cart configuration was invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A stored line was rejected when re-adding it to the cart
    #[error("Failed to restore cart: {0}")]
    Cart(#[from] CartError),
}

/// String key-value storage provided by the host platform.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Remove and return the value stored under `key`.
    fn remove(&mut self, key: &str) -> Option<String>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

/// Stored form of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCart {
    /// Kind of cart
    pub kind: CartKind,

    /// ISO currency code of every line
    pub currency: String,

    /// Whether relief was enabled
    pub relief_enabled: bool,

    /// Lines in cart order
    pub items: Vec<PersistedCartItem>,
}

/// Stored form of a cart line. Totals are not stored; they are recomputed on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCartItem {
    /// Line id
    pub id: String,

    /// Donation purpose or event identifier
    pub category: String,

    /// Unit amount as `AMOUNT CURRENCY`
    pub unit_amount: String,

    /// Quantity
    pub quantity: u32,

    /// Optional date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,

    /// Optional message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&CartItem> for PersistedCartItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id().to_string(),
            category: item.category().to_string(),
            unit_amount: format_amount(item.unit_amount()),
            quantity: item.quantity(),
            date: item.date(),
            message: item.message().map(str::to_string),
        }
    }
}

impl From<&Cart> for PersistedCart {
    fn from(cart: &Cart) -> Self {
        Self {
            kind: cart.kind(),
            currency: cart.currency().iso_alpha_code.to_string(),
            relief_enabled: cart.relief_enabled(),
            items: cart.iter().map(PersistedCartItem::from).collect(),
        }
    }
}

impl PersistedCart {
    /// Rebuild a cart in its stored currency, taking the line limit and relief
    /// rate from `config` and re-validating every line.
    ///
    /// # Errors
    ///
    /// Returns an error if the relief rate or stored currency is invalid, an
    /// amount cannot be parsed, or a line no longer passes validation.
    pub fn restore(self, config: &CartConfig) -> Result<Cart, PersistenceError> {
        let mut cart = Cart::new(self.kind, parse_currency(&self.currency)?)
            .with_max_items(config.max_items(self.kind))
            .with_relief_rate(config.relief_rate()?);

        for item in self.items {
            let mut new = NewCartItem::new(item.category, parse_amount(&item.unit_amount)?)
                .with_id(item.id)
                .with_quantity(i64::from(item.quantity));

            new.date = item.date;
            new.message = item.message;

            cart.add_item(new)?;
        }

        cart.set_relief_enabled(self.relief_enabled);

        Ok(cart)
    }
}

/// Stored form of a content snapshot. The modification map is rebuilt from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot<T> {
    /// When the snapshot was fetched
    pub fetched_at: Timestamp,

    /// Items in display order
    pub items: Vec<T>,
}

impl<T: ContentItem + Clone> From<&ContentSnapshot<T>> for PersistedSnapshot<T> {
    fn from(snapshot: &ContentSnapshot<T>) -> Self {
        Self {
            fetched_at: snapshot.fetched_at(),
            items: snapshot.items().to_vec(),
        }
    }
}

impl<T: ContentItem + Clone> From<PersistedSnapshot<T>> for ContentSnapshot<T> {
    fn from(persisted: PersistedSnapshot<T>) -> Self {
        ContentSnapshot::new(persisted.items, persisted.fetched_at)
    }
}

/// Save `cart` under `key`.
///
/// # Errors
///
/// Returns an error if the cart cannot be encoded.
pub fn save_cart(
    store: &mut impl KeyValueStore,
    key: &str,
    cart: &Cart,
) -> Result<(), PersistenceError> {
    let encoded = serde_norway::to_string(&PersistedCart::from(cart))?;

    store.set(key, encoded);

    debug!(key, items = cart.len(), "saved cart");

    Ok(())
}

/// Load the cart stored under `key`, if any.
///
/// # Errors
///
/// Returns an error if the stored value cannot be decoded or restored.
pub fn load_cart(
    store: &impl KeyValueStore,
    key: &str,
    config: &CartConfig,
) -> Result<Option<Cart>, PersistenceError> {
    let Some(encoded) = store.get(key) else {
        return Ok(None);
    };

    let persisted: PersistedCart = serde_norway::from_str(&encoded)?;

    persisted.restore(config).map(Some)
}

/// Save `snapshot` under `key`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be encoded.
pub fn save_snapshot<T: ContentItem + Clone + Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    snapshot: &ContentSnapshot<T>,
) -> Result<(), PersistenceError> {
    let encoded = serde_norway::to_string(&PersistedSnapshot::from(snapshot))?;

    store.set(key, encoded);

    debug!(key, items = snapshot.len(), "saved content snapshot");

    Ok(())
}

/// Load the snapshot stored under `key`, if any.
///
/// # Errors
///
/// Returns an error if the stored value cannot be decoded.
pub fn load_snapshot<T: ContentItem + Clone + DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<ContentSnapshot<T>>, PersistenceError> {
    let Some(encoded) = store.get(key) else {
        return Ok(None);
    };

    let persisted: PersistedSnapshot<T> = serde_norway::from_str(&encoded)?;

    Ok(Some(persisted.into()))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use crate::{
        cart::{CartItemId, InvalidItem},
        content::ContentRecord,
    };

    use super::*;

    #[test]
    fn memory_store_roundtrips_values() {
        let mut store = MemoryStore::new();

        store.set("a", "1".to_string());

        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.remove("a").as_deref(), Some("1"));
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn cart_restores_lines_and_relief() -> TestResult {
        let mut cart = Cart::new(CartKind::EventRegistration, GBP);
        cart.add_item(
            NewCartItem::new("navratri-garba", Money::from_minor(750, GBP))
                .with_id("reg-1")
                .with_quantity(3)
                .with_date(date(2025, 10, 2))
                .with_message("Family of three"),
        )?;
        cart.set_relief_enabled(true);

        let mut store = MemoryStore::new();
        save_cart(&mut store, "cart", &cart)?;

        let restored = load_cart(&store, "cart", &CartConfig::default())?.ok_or("no cart")?;

        assert_eq!(restored.kind(), CartKind::EventRegistration);
        assert!(restored.relief_enabled());
        assert_eq!(restored.items(), cart.items());
        assert_eq!(restored.totals(), cart.totals());

        Ok(())
    }

    #[test]
    fn cart_keeps_its_own_currency() -> TestResult {
        let mut cart = Cart::new(CartKind::Donation, USD);
        cart.add_item(NewCartItem::new("annadanam", Money::from_minor(2000, USD)))?;

        let mut store = MemoryStore::new();
        save_cart(&mut store, "cart", &cart)?;

        let encoded = store.get("cart").ok_or("nothing saved")?;
        assert!(encoded.contains("currency: USD"));

        let restored = load_cart(&store, "cart", &CartConfig::default())?.ok_or("no cart")?;

        assert_eq!(restored.currency(), USD);
        assert_eq!(restored.items(), cart.items());
        assert_eq!(restored.totals().grand_total, Money::from_minor(2000, USD));

        Ok(())
    }

    #[test]
    fn unknown_stored_currency_is_rejected() {
        let persisted = PersistedCart {
            kind: CartKind::Donation,
            currency: "XYZ".to_string(),
            relief_enabled: false,
            items: Vec::new(),
        };

        assert!(matches!(
            persisted.restore(&CartConfig::default()),
            Err(PersistenceError::Money(MoneyParseError::UnknownCurrency(_)))
        ));
    }

    #[test]
    fn missing_key_loads_nothing() -> TestResult {
        let store = MemoryStore::new();

        assert!(load_cart(&store, "cart", &CartConfig::default())?.is_none());
        assert!(load_snapshot::<ContentRecord>(&store, "events")?.is_none());

        Ok(())
    }

    #[test]
    fn restore_revalidates_lines() {
        let persisted = PersistedCart {
            kind: CartKind::Donation,
            currency: "GBP".to_string(),
            relief_enabled: false,
            items: vec![PersistedCartItem {
                id: CartItemId::generate().to_string(),
                category: "general".to_string(),
                unit_amount: "0.10 GBP".to_string(),
                quantity: 1,
                date: None,
                message: None,
            }],
        };

        let result = persisted.restore(&CartConfig::default());

        assert!(matches!(
            result,
            Err(PersistenceError::Cart(CartError::InvalidItem(
                InvalidItem::AmountOutOfRange { .. }
            )))
        ));
    }

    #[test]
    fn snapshot_restores_items_and_modification_map() -> TestResult {
        let snapshot = ContentSnapshot::new(
            vec![
                ContentRecord::new("a", Timestamp::from_second(10)?).with_field("title", "Aarti"),
                ContentRecord::new("b", Timestamp::from_second(20)?),
            ],
            Timestamp::from_second(30)?,
        );

        let mut store = MemoryStore::new();
        save_snapshot(&mut store, "events", &snapshot)?;

        let restored: ContentSnapshot<ContentRecord> =
            load_snapshot(&store, "events")?.ok_or("no snapshot")?;

        assert_eq!(restored, snapshot);

        Ok(())
    }
}
