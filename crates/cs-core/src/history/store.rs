use std::collections::HashSet;

use tracing::debug;

use crate::clipboard::{Content, HistoryItem, SourceApplicationInfo};
use crate::history::HistoryStats;
use crate::ids::HistoryItemId;

pub const DEFAULT_CAPACITY: usize = 100;

/// What one capture did to the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Nothing to store; only the live pointer was cleared.
    Empty,
    /// A new item went to the front. `evicted` holds what fell off the tail.
    Inserted {
        id: HistoryItemId,
        evicted: Vec<HistoryItemId>,
    },
    /// An equal item already existed and moved to the front.
    Promoted {
        id: HistoryItemId,
        from_index: usize,
        active_at_ms: i64,
    },
}

/// Handed out by [`HistoryStore::begin_load`] and redeemed by
/// [`HistoryStore::merge_loaded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Result of folding durable items into a running store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub appended: usize,
    /// Loaded items dropped because the store was cleared, or the item
    /// removed or evicted, after the load began.
    pub discarded: usize,
    /// Loaded items equal to one already resident; their records are stale.
    pub superseded: Vec<HistoryItemId>,
    pub evicted: Vec<HistoryItemId>,
}

/// Ordered, bounded, deduplicated clipboard history.
///
/// Index 0 is the most recent state. `selected` is the item the user is
/// looking at; it moves to the front on every stored capture and otherwise
/// only through [`HistoryStore::select`]. `current` tracks what the system
/// clipboard holds right now, `None` after an empty capture.
#[derive(Debug)]
pub struct HistoryStore {
    items: Vec<HistoryItem>,
    capacity: usize,
    selected: Option<HistoryItemId>,
    current: Option<HistoryItemId>,
    /// Bumped by every [`HistoryStore::clear`].
    generation: u64,
    /// Ids removed or evicted while a load is pending.
    dropped_during_load: Option<HashSet<HistoryItemId>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    /// New empty store; a capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
            selected: None,
            current: None,
            generation: 0,
            dropped_during_load: None,
        }
    }

    /// Record one capture: discard, promote or insert, then truncate.
    pub fn capture(
        &mut self,
        contents: Vec<Content>,
        timestamp_ms: i64,
        source_application: Option<SourceApplicationInfo>,
    ) -> CaptureOutcome {
        if contents.is_empty() {
            self.current = None;
            return CaptureOutcome::Empty;
        }

        let candidate = HistoryItem::new(contents, timestamp_ms, source_application);

        if let Some(index) = self.items.iter().position(|item| *item == candidate) {
            let mut item = self.items.remove(index);
            item.active_at_ms = item.active_at_ms.max(timestamp_ms);
            let id = item.id.clone();
            let active_at_ms = item.active_at_ms;
            self.items.insert(0, item);
            self.selected = Some(id.clone());
            self.current = Some(id.clone());
            debug!(item_id = %id, from_index = index, "promoted duplicate capture");
            return CaptureOutcome::Promoted {
                id,
                from_index: index,
                active_at_ms,
            };
        }

        let id = candidate.id.clone();
        self.items.insert(0, candidate);
        self.selected = Some(id.clone());
        self.current = Some(id.clone());
        let evicted = self.truncate();
        debug!(item_id = %id, evicted = evicted.len(), "inserted capture");
        CaptureOutcome::Inserted { id, evicted }
    }

    /// Start tracking removals for a durable load that is about to run.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.dropped_during_load = Some(HashSet::new());
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Stop tracking after a load that will not be merged.
    pub fn abandon_load(&mut self) {
        self.dropped_during_load = None;
    }

    /// Fold items loaded from durable storage in behind the resident ones.
    ///
    /// `loaded` is expected newest first. Selection is not touched. If the
    /// store was cleared since `ticket` was issued the whole batch is
    /// dropped; items removed or evicted since then are skipped.
    pub fn merge_loaded(&mut self, ticket: LoadTicket, loaded: Vec<HistoryItem>) -> MergeOutcome {
        let dropped = self.dropped_during_load.take().unwrap_or_default();
        let mut outcome = MergeOutcome::default();

        if ticket.generation != self.generation {
            outcome.discarded = loaded.len();
            debug!(discarded = outcome.discarded, "history cleared during load");
            return outcome;
        }

        for item in loaded {
            if dropped.contains(&item.id) {
                outcome.discarded += 1;
                continue;
            }
            if self.items.iter().any(|resident| resident.id == item.id) {
                continue;
            }
            if self.items.iter().any(|resident| *resident == item) {
                outcome.superseded.push(item.id);
                continue;
            }
            self.items.push(item);
            outcome.appended += 1;
        }

        outcome.evicted = self.truncate();
        outcome
    }

    /// Explicit user selection. Returns `false` for an unknown id.
    pub fn select(&mut self, id: &HistoryItemId) -> bool {
        if self.items.iter().any(|item| &item.id == id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, id: &HistoryItemId) -> Option<HistoryItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        let removed = self.items.remove(index);
        self.forget(&removed.id);
        self.note_dropped(&removed.id);
        Some(removed)
    }

    /// Drop everything. Returns how many items were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        self.selected = None;
        self.current = None;
        self.generation += 1;
        count
    }

    /// Apply a new capacity and return the ids evicted by it.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<HistoryItemId> {
        self.capacity = capacity.max(1);
        self.truncate()
    }

    fn truncate(&mut self) -> Vec<HistoryItemId> {
        if self.items.len() <= self.capacity {
            return Vec::new();
        }
        let evicted: Vec<HistoryItemId> = self
            .items
            .drain(self.capacity..)
            .map(|item| item.id)
            .collect();
        for id in &evicted {
            self.forget(id);
            self.note_dropped(id);
        }
        evicted
    }

    fn note_dropped(&mut self, id: &HistoryItemId) {
        if let Some(dropped) = &mut self.dropped_during_load {
            dropped.insert(id.clone());
        }
    }

    fn forget(&mut self, id: &HistoryItemId) {
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn front(&self) -> Option<&HistoryItem> {
        self.items.first()
    }

    pub fn get(&self, id: &HistoryItemId) -> Option<&HistoryItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn selected(&self) -> Option<&HistoryItem> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn current(&self) -> Option<&HistoryItem> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            item_count: self.items.len(),
            total_bytes: self.items.iter().map(HistoryItem::total_size_bytes).sum(),
            oldest_timestamp_ms: self.items.iter().map(|i| i.timestamp_ms).min(),
            newest_timestamp_ms: self.items.iter().map(|i| i.timestamp_ms).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{tags, Format};
    use bytes::Bytes;

    fn text(s: &str) -> Vec<Content> {
        vec![Content::new(
            Bytes::from(s.to_string()),
            vec![Format::new(tags::PLAIN_TEXT)],
        )]
    }

    fn titles(store: &HistoryStore) -> Vec<&str> {
        store.items().iter().map(HistoryItem::title).collect()
    }

    #[test]
    fn test_insert_goes_to_front_and_selects() {
        let mut store = HistoryStore::new(10);
        store.capture(text("A"), 1, None);
        let outcome = store.capture(text("B"), 2, None);
        assert!(matches!(outcome, CaptureOutcome::Inserted { ref evicted, .. } if evicted.is_empty()));
        assert_eq!(titles(&store), vec!["B", "A"]);
        assert_eq!(store.selected().map(HistoryItem::title), Some("B"));
        assert_eq!(store.current().map(HistoryItem::title), Some("B"));
    }

    #[test]
    fn test_duplicate_is_promoted_not_appended() {
        let mut store = HistoryStore::new(10);
        store.capture(text("hello"), 1_000, None);
        store.capture(text("world"), 2_000, None);
        let first_id = store.items()[1].id.clone();

        let outcome = store.capture(text("hello"), 3_000, None);

        assert_eq!(
            outcome,
            CaptureOutcome::Promoted {
                id: first_id.clone(),
                from_index: 1,
                active_at_ms: 3_000
            }
        );
        assert_eq!(titles(&store), vec!["hello", "world"]);
        let promoted = store.front().unwrap();
        assert_eq!(promoted.id, first_id);
        assert_eq!(promoted.timestamp_ms, 1_000);
        assert_eq!(promoted.active_at_ms, 3_000);
        assert_eq!(store.selected().map(|i| &i.id), Some(&first_id));
    }

    #[test]
    fn test_different_format_set_is_a_new_item() {
        let mut store = HistoryStore::new(10);
        let both = vec![Content::new(
            Bytes::from_static(b"hello"),
            vec![Format::new(tags::PLAIN_TEXT), Format::new(tags::HTML)],
        )];
        store.capture(both, 1, None);
        let outcome = store.capture(text("hello"), 2, None);
        assert!(matches!(outcome, CaptureOutcome::Inserted { .. }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_source_application_distinguishes_items() {
        let mut store = HistoryStore::new(10);
        store.capture(text("x"), 1, Some(SourceApplicationInfo::named("a.b", "A")));
        store.capture(text("x"), 2, Some(SourceApplicationInfo::named("c.d", "C")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_capacity_truncates_tail() {
        let mut store = HistoryStore::new(2);
        store.capture(text("A"), 1, None);
        store.capture(text("B"), 2, None);
        let a_id = store.items()[1].id.clone();
        let outcome = store.capture(text("C"), 3, None);
        match outcome {
            CaptureOutcome::Inserted { evicted, .. } => assert_eq!(evicted, vec![a_id]),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(titles(&store), vec!["C", "B"]);
    }

    #[test]
    fn test_capacity_holds_for_long_sequences() {
        let mut store = HistoryStore::new(5);
        for i in 0..200 {
            store.capture(text(&format!("item {}", i % 13)), i, None);
            assert!(store.len() <= 5);
        }
        assert_eq!(store.front().map(HistoryItem::title), Some("item 4"));
    }

    #[test]
    fn test_empty_capture_only_clears_current() {
        let mut store = HistoryStore::new(10);
        store.capture(text("A"), 1, None);
        assert_eq!(store.capture(Vec::new(), 2, None), CaptureOutcome::Empty);
        assert_eq!(store.len(), 1);
        assert!(store.current().is_none());
        assert_eq!(store.selected().map(HistoryItem::title), Some("A"));
    }

    #[test]
    fn test_explicit_selection_survives_until_next_capture() {
        let mut store = HistoryStore::new(10);
        store.capture(text("A"), 1, None);
        store.capture(text("B"), 2, None);
        let a_id = store.items()[1].id.clone();
        assert!(store.select(&a_id));
        assert_eq!(store.capture(Vec::new(), 3, None), CaptureOutcome::Empty);
        assert_eq!(store.selected().map(|i| &i.id), Some(&a_id));
        store.capture(text("C"), 4, None);
        assert_eq!(store.selected().map(HistoryItem::title), Some("C"));
        assert!(!store.select(&HistoryItemId::from("missing")));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = HistoryStore::new(10);
        store.capture(text("A"), 1, None);
        assert_eq!(store.clear(), 1);
        assert_eq!(store.clear(), 0);
        assert!(store.is_empty());
        assert!(store.selected().is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_remove_forgets_selection() {
        let mut store = HistoryStore::new(10);
        store.capture(text("A"), 1, None);
        let id = store.front().unwrap().id.clone();
        assert!(store.remove(&id).is_some());
        assert!(store.selected().is_none());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn test_merge_loaded_appends_and_skips_duplicates() {
        let mut store = HistoryStore::new(3);
        store.capture(text("fresh"), 10, None);
        let resident = store.front().unwrap().clone();

        let stale_copy = HistoryItem::new(text("fresh"), 1, None);
        let stale_id = stale_copy.id.clone();
        let loaded = vec![
            resident.clone(),
            stale_copy,
            HistoryItem::new(text("old 1"), 2, None),
            HistoryItem::new(text("old 2"), 1, None),
            HistoryItem::new(text("old 3"), 0, None),
        ];

        let ticket = store.begin_load();
        let outcome = store.merge_loaded(ticket, loaded);

        assert_eq!(outcome.appended, 3);
        assert_eq!(outcome.superseded, vec![stale_id]);
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(titles(&store), vec!["fresh", "old 1", "old 2"]);
        assert_eq!(store.selected().map(|i| &i.id), Some(&resident.id));
    }

    #[test]
    fn test_clear_during_load_drops_the_batch() {
        let mut store = HistoryStore::new(10);
        let ticket = store.begin_load();
        store.capture(text("A"), 1, None);
        store.clear();

        let outcome = store.merge_loaded(ticket, vec![HistoryItem::new(text("old"), 0, None)]);

        assert_eq!(outcome.appended, 0);
        assert_eq!(outcome.discarded, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_items_removed_during_load_stay_removed() {
        let mut store = HistoryStore::new(2);
        store.capture(text("A"), 1, None);
        let a = store.front().unwrap().clone();
        let ticket = store.begin_load();

        store.remove(&a.id);
        store.capture(text("B"), 2, None);
        let b = store.front().unwrap().clone();
        store.capture(text("C"), 3, None);
        store.capture(text("D"), 4, None);
        assert_eq!(titles(&store), vec!["D", "C"]);

        // The snapshot was taken before A was removed and B was evicted.
        let outcome = store.merge_loaded(ticket, vec![b, a]);

        assert_eq!(outcome.discarded, 2);
        assert_eq!(outcome.appended, 0);
        assert_eq!(titles(&store), vec!["D", "C"]);
    }

    #[test]
    fn test_removal_tracking_stops_after_merge() {
        let mut store = HistoryStore::new(10);
        let ticket = store.begin_load();
        store.merge_loaded(ticket, Vec::new());

        store.capture(text("A"), 1, None);
        let a = store.front().unwrap().clone();
        store.remove(&a.id);

        let ticket = store.begin_load();
        let outcome = store.merge_loaded(ticket, vec![a]);
        assert_eq!(outcome.appended, 1);
    }

    #[test]
    fn test_set_capacity_evicts() {
        let mut store = HistoryStore::new(10);
        for i in 0..4 {
            store.capture(text(&i.to_string()), i, None);
        }
        assert_eq!(store.set_capacity(0).len(), 3);
        assert_eq!(store.capacity(), 1);
        assert_eq!(titles(&store), vec!["3"]);
    }

    #[test]
    fn test_stats() {
        let mut store = HistoryStore::new(10);
        store.capture(text("aa"), 5, None);
        store.capture(text("bbb"), 9, None);
        store.capture(text("aa"), 12, None);
        let stats = store.stats();
        assert_eq!(stats.item_count, 2);
        assert_eq!(stats.total_bytes, 5);
        assert_eq!(stats.oldest_timestamp_ms, Some(5));
        assert_eq!(stats.newest_timestamp_ms, Some(9));
    }
}
