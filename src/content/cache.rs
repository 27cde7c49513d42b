//! Content Cache

use jiff::{SignedDuration, Timestamp};
use tracing::{debug, info, warn};

use crate::{
    config::ContentConfig,
    content::{
        ContentDomain, ContentItem,
        snapshot::{ContentSnapshot, is_stale},
    },
};

/// What [`ContentCache::refresh`] did with a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// There was no snapshot; the fetch became the first one.
    Initialized {
        /// Number of items cached
        items: usize,
    },

    /// The snapshot was replaced with one reflecting the fetch.
    Updated {
        /// New or modified items
        changed: usize,
        /// Items no longer returned by the backend
        removed: usize,
    },

    /// The fetch matched the snapshot; only the fetch time moved.
    Unchanged,

    /// The fetch was empty and was treated as a failure; the snapshot was kept.
    FetchFailed,
}

/// The snapshot for a single content domain and its freshness window.
#[derive(Debug, Clone)]
pub struct ContentCache<T> {
    domain: ContentDomain,
    freshness_window: SignedDuration,
    snapshot: Option<ContentSnapshot<T>>,
}

impl<T: ContentItem + Clone> ContentCache<T> {
    /// Create an empty cache.
    pub fn new(domain: ContentDomain, freshness_window: SignedDuration) -> Self {
        Self {
            domain,
            freshness_window,
            snapshot: None,
        }
    }

    /// Create an empty cache using the window configured for `domain`.
    pub fn from_config(domain: ContentDomain, config: &ContentConfig) -> Self {
        Self::new(domain, config.freshness_window(domain))
    }

    /// Whether the caller should fetch before showing content.
    pub fn needs_refresh(&self, now: Timestamp) -> bool {
        is_stale(self.snapshot.as_ref(), now, self.freshness_window)
    }

    /// Fold a fresh fetch into the cache.
    ///
    /// An empty fetch never wipes an existing snapshot.
    pub fn refresh(&mut self, fresh: Vec<T>, now: Timestamp) -> RefreshOutcome {
        if fresh.is_empty() {
            warn!(domain = %self.domain, "empty content fetch, keeping cached snapshot");
            return RefreshOutcome::FetchFailed;
        }

        let Some(current) = self.snapshot.take() else {
            let items = fresh.len();
            self.snapshot = Some(ContentSnapshot::new(fresh, now));

            info!(domain = %self.domain, items, "initialized content cache");

            return RefreshOutcome::Initialized { items };
        };

        let diff = current.diff_modified(&fresh);

        let outcome = if diff.is_empty() {
            RefreshOutcome::Unchanged
        } else {
            RefreshOutcome::Updated {
                changed: diff.changed.len(),
                removed: diff.removed.len(),
            }
        };

        self.snapshot = Some(current.apply(diff, now));

        debug!(domain = %self.domain, ?outcome, "refreshed content cache");

        outcome
    }

    /// Replace the snapshot wholesale, e.g. with one restored from storage.
    pub fn replace(&mut self, snapshot: ContentSnapshot<T>) {
        self.snapshot = Some(snapshot);
    }

    /// Drop the snapshot so the next check asks for a full fetch.
    pub fn clear(&mut self) {
        self.snapshot = None;

        debug!(domain = %self.domain, "cleared content cache");
    }

    /// Current snapshot, if any.
    pub fn snapshot(&self) -> Option<&ContentSnapshot<T>> {
        self.snapshot.as_ref()
    }

    /// Cached items, empty when nothing has been fetched.
    pub fn items(&self) -> &[T] {
        self.snapshot
            .as_ref()
            .map(ContentSnapshot::items)
            .unwrap_or_default()
    }

    /// Content domain of the cache.
    pub fn domain(&self) -> ContentDomain {
        self.domain
    }

    /// Freshness window of the cache.
    pub fn freshness_window(&self) -> SignedDuration {
        self.freshness_window
    }
}
