//! Content
//!
//! Freshness and change tracking for content fetched from the backend
//! (events, announcements, services, gallery). Nothing here performs I/O:
//! callers fetch, then hand the result to a [`ContentCache`] or work with
//! [`ContentSnapshot`]s directly.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod snapshot;

pub use cache::{ContentCache, RefreshOutcome};
pub use snapshot::{ContentDiff, ContentSnapshot, is_stale};

/// A content record that can be tracked for changes.
pub trait ContentItem {
    /// Stable identifier of the record.
    fn id(&self) -> &str;

    /// When the record was last modified on the server.
    fn modified_at(&self) -> Timestamp;
}

/// Content areas cached independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDomain {
    /// Festivals, pujas and other events
    Events,

    /// News and notices
    Announcements,

    /// Services offered by the temple
    Services,

    /// Photo gallery albums
    Gallery,
}

impl ContentDomain {
    /// Stable name used in configuration, logs and storage keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Announcements => "announcements",
            Self::Services => "services",
            Self::Gallery => "gallery",
        }
    }
}

impl Display for ContentDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Generic content record: id, modification time and arbitrary string fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Record id
    pub id: String,

    /// Server-side modification time
    pub modified_at: Timestamp,

    /// Remaining fields, as returned by the backend
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub fields: FxHashMap<String, String>,
}

impl ContentRecord {
    /// Create a record with no extra fields.
    pub fn new(id: impl Into<String>, modified_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            modified_at,
            fields: FxHashMap::default(),
        }
    }

    /// Add a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl ContentItem for ContentRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn modified_at(&self) -> Timestamp {
        self.modified_at
    }
}
