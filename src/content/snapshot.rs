//! Content Snapshots

use jiff::{SignedDuration, Timestamp};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::content::ContentItem;

/// Returns `true` if `snapshot` is absent or older than `window` at `now`.
///
/// A snapshot exactly `window` old is still fresh.
pub fn is_stale<T>(
    snapshot: Option<&ContentSnapshot<T>>,
    now: Timestamp,
    window: SignedDuration,
) -> bool {
    snapshot.is_none_or(|snapshot| snapshot.is_stale_at(now, window))
}

/// Items that changed between a snapshot and a fresh fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDiff<T> {
    /// Fresh items that are new or whose modification time differs, in fetch order.
    pub changed: Vec<T>,

    /// Ids present in the snapshot but missing from the fetch.
    pub removed: Vec<String>,
}

impl<T> ContentDiff<T> {
    /// Whether the fetch matched the snapshot exactly.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Cached content for one domain at a point in time.
///
/// Snapshots are never mutated in place; [`merge`](Self::merge) and
/// [`apply`](Self::apply) return a new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSnapshot<T> {
    items: Vec<T>,
    fetched_at: Timestamp,
    modification_map: FxHashMap<String, Timestamp>,
}

impl<T> ContentSnapshot<T> {
    /// How long ago the snapshot was fetched.
    pub fn age(&self, now: Timestamp) -> SignedDuration {
        now.duration_since(self.fetched_at)
    }

    /// Whether the snapshot is older than `window` at `now`.
    pub fn is_stale_at(&self, now: Timestamp, window: SignedDuration) -> bool {
        self.age(now) > window
    }
}

impl<T: ContentItem + Clone> ContentSnapshot<T> {
    /// Create a snapshot of `items` fetched at `fetched_at`.
    ///
    /// Ids are unique within a snapshot: a repeated id keeps the position of
    /// its first occurrence and the value of its last.
    pub fn new(items: Vec<T>, fetched_at: Timestamp) -> Self {
        let empty = Self {
            items: Vec::new(),
            fetched_at,
            modification_map: FxHashMap::default(),
        };

        empty.merge(items, fetched_at)
    }

    /// Compare a fresh fetch against this snapshot.
    ///
    /// An empty `fresh` list reports every cached item as removed; callers that
    /// treat an empty fetch as a failure should check for that first.
    pub fn diff_modified(&self, fresh: &[T]) -> ContentDiff<T> {
        let fresh_ids: FxHashSet<&str> = fresh.iter().map(ContentItem::id).collect();

        let changed = fresh
            .iter()
            .filter(|item| self.modification_map.get(item.id()) != Some(&item.modified_at()))
            .cloned()
            .collect();

        let removed = self
            .items
            .iter()
            .map(ContentItem::id)
            .filter(|id| !fresh_ids.contains(id))
            .map(str::to_owned)
            .collect();

        ContentDiff { changed, removed }
    }

    /// Replace or insert `changed` items, returning a snapshot fetched at `now`.
    ///
    /// Existing items keep their position; unknown ids are appended in the
    /// order given.
    #[must_use]
    pub fn merge(&self, changed: Vec<T>, now: Timestamp) -> Self {
        let mut items = self.items.clone();
        let mut modification_map = self.modification_map.clone();

        let mut positions: FxHashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id().to_owned(), idx))
            .collect();

        for item in changed {
            modification_map.insert(item.id().to_owned(), item.modified_at());

            if let Some(slot) = positions.get(item.id()).and_then(|idx| items.get_mut(*idx)) {
                *slot = item;
            } else {
                positions.insert(item.id().to_owned(), items.len());
                items.push(item);
            }
        }

        Self {
            items,
            fetched_at: now,
            modification_map,
        }
    }

    /// Drop removed items and merge changed ones, returning a snapshot fetched at `now`.
    #[must_use]
    pub fn apply(&self, diff: ContentDiff<T>, now: Timestamp) -> Self {
        let removed: FxHashSet<&str> = diff.removed.iter().map(String::as_str).collect();

        let retained = Self {
            items: self
                .items
                .iter()
                .filter(|item| !removed.contains(item.id()))
                .cloned()
                .collect(),
            fetched_at: self.fetched_at,
            modification_map: self
                .modification_map
                .iter()
                .filter(|(id, _)| !removed.contains(id.as_str()))
                .map(|(id, modified_at)| (id.clone(), *modified_at))
                .collect(),
        };

        retained.merge(diff.changed, now)
    }

    /// Items in display order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// When the snapshot was fetched.
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Last known modification time per item id.
    pub fn modification_map(&self) -> &FxHashMap<String, Timestamp> {
        &self.modification_map
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::content::ContentRecord;

    use super::*;

    fn ts(seconds: i64) -> Result<Timestamp, jiff::Error> {
        Timestamp::from_second(seconds)
    }

    fn record(id: &str, modified: i64) -> Result<ContentRecord, jiff::Error> {
        Ok(ContentRecord::new(id, ts(modified)?))
    }

    fn ids(snapshot: &ContentSnapshot<ContentRecord>) -> Vec<&str> {
        snapshot.items().iter().map(ContentItem::id).collect()
    }

    #[test]
    fn absent_snapshot_is_stale() -> TestResult {
        assert!(is_stale::<ContentRecord>(
            None,
            ts(0)?,
            SignedDuration::from_mins(5)
        ));

        Ok(())
    }

    #[test]
    fn staleness_boundary_is_exclusive() -> TestResult {
        let window = SignedDuration::from_millis(60_000);
        let snapshot = ContentSnapshot::<ContentRecord>::new(Vec::new(), ts(1_000)?);

        assert!(!is_stale(Some(&snapshot), ts(1_000)?, window));
        assert!(!is_stale(Some(&snapshot), ts(1_060)?, window));
        assert!(is_stale(
            Some(&snapshot),
            ts(1_060)?.checked_add(SignedDuration::from_millis(1))?,
            window
        ));

        Ok(())
    }

    #[test]
    fn new_builds_modification_map() -> TestResult {
        let snapshot = ContentSnapshot::new(vec![record("a", 10)?, record("b", 20)?], ts(30)?);

        assert_eq!(snapshot.modification_map().get("a"), Some(&ts(10)?));
        assert_eq!(snapshot.modification_map().get("b"), Some(&ts(20)?));
        assert_eq!(snapshot.len(), 2);

        Ok(())
    }

    #[test]
    fn staleness_needs_no_item_bounds() -> TestResult {
        let snapshot = ContentSnapshot::<u8> {
            items: vec![1, 2],
            fetched_at: ts(0)?,
            modification_map: FxHashMap::default(),
        };

        assert!(is_stale(Some(&snapshot), ts(61)?, SignedDuration::from_mins(1)));
        assert_eq!(snapshot.age(ts(61)?), SignedDuration::from_secs(61));

        Ok(())
    }

    #[test]
    fn new_collapses_duplicate_ids() -> TestResult {
        let snapshot = ContentSnapshot::new(
            vec![record("a", 1)?, record("b", 1)?, record("a", 3)?],
            ts(5)?,
        );

        assert_eq!(ids(&snapshot), ["a", "b"]);
        assert_eq!(snapshot.get("a").map(ContentItem::modified_at), Some(ts(3)?));
        assert_eq!(snapshot.modification_map().get("a"), Some(&ts(3)?));

        let merged = snapshot.merge(vec![record("a", 4)?], ts(10)?);

        assert_eq!(ids(&merged), ["a", "b"]);
        assert_eq!(merged.get("a").map(ContentItem::modified_at), Some(ts(4)?));

        Ok(())
    }

    #[test]
    fn diff_reports_changed_and_new_items() -> TestResult {
        let snapshot = ContentSnapshot::new(vec![record("1", 1)?], ts(5)?);
        let fresh = [record("1", 2)?, record("2", 1)?];

        let diff = snapshot.diff_modified(&fresh);

        assert_eq!(diff.changed, fresh.to_vec());
        assert!(diff.removed.is_empty());

        Ok(())
    }

    #[test]
    fn diff_ignores_unchanged_and_reports_removed() -> TestResult {
        let snapshot =
            ContentSnapshot::new(vec![record("a", 1)?, record("b", 1)?, record("c", 1)?], ts(5)?);
        let fresh = [record("a", 1)?, record("c", 3)?];

        let diff = snapshot.diff_modified(&fresh);

        assert_eq!(diff.changed, vec![record("c", 3)?]);
        assert_eq!(diff.removed, vec!["b".to_string()]);

        Ok(())
    }

    #[test]
    fn diff_of_identical_fetch_is_empty() -> TestResult {
        let items = vec![record("a", 1)?, record("b", 2)?];
        let snapshot = ContentSnapshot::new(items.clone(), ts(5)?);

        assert!(snapshot.diff_modified(&items).is_empty());

        Ok(())
    }

    #[test]
    fn merge_replaces_in_place_and_appends_new() -> TestResult {
        let snapshot =
            ContentSnapshot::new(vec![record("a", 1)?, record("b", 1)?, record("c", 1)?], ts(5)?);

        let merged = snapshot.merge(vec![record("d", 2)?, record("b", 2)?], ts(10)?);

        assert_eq!(ids(&merged), ["a", "b", "c", "d"]);
        assert_eq!(merged.get("b").map(ContentItem::modified_at), Some(ts(2)?));
        assert_eq!(merged.modification_map().get("d"), Some(&ts(2)?));
        assert_eq!(merged.fetched_at(), ts(10)?);

        // merging leaves the receiver untouched
        assert_eq!(snapshot.fetched_at(), ts(5)?);
        assert_eq!(snapshot.get("b").map(ContentItem::modified_at), Some(ts(1)?));

        Ok(())
    }

    #[test]
    fn apply_drops_removed_items() -> TestResult {
        let snapshot =
            ContentSnapshot::new(vec![record("a", 1)?, record("b", 1)?, record("c", 1)?], ts(5)?);
        let fresh = [record("c", 1)?, record("a", 4)?, record("e", 1)?];

        let updated = snapshot.apply(snapshot.diff_modified(&fresh), ts(20)?);

        assert_eq!(ids(&updated), ["a", "c", "e"]);
        assert!(updated.modification_map().get("b").is_none());
        assert_eq!(updated.modification_map().len(), 3);
        assert_eq!(updated.fetched_at(), ts(20)?);

        Ok(())
    }
}
