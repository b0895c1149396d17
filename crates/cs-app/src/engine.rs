use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use cs_core::clipboard::{
    group_representations, ClipboardSnapshot, Content, HistoryItem, ObservedRepresentation,
};
use cs_core::history::{CaptureOutcome, HistoryStore, MergeOutcome};
use cs_core::ids::HistoryItemId;
use cs_core::ports::{ClockPort, SourceApplicationPort, SystemClipboardPort};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::deps::EngineDeps;
use crate::persistence::PersistenceGateway;
use crate::poller::{ClipboardPoller, PollOutcome};
use crate::usecases::{GetHistoryStatistics, HistoryStatistics};

/// Coordinates capture, the in-memory history and its durable mirror.
///
/// Every store mutation and the persistence command it implies happen under
/// one write guard, so the durable queue sees changes in the same order as
/// the store. Cloning is cheap and shares all state.
#[derive(Clone)]
pub struct HistoryEngine {
    clipboard: Arc<dyn SystemClipboardPort>,
    poller: Arc<Mutex<ClipboardPoller>>,
    store: Arc<RwLock<HistoryStore>>,
    persistence: PersistenceGateway,
    clock: Arc<dyn ClockPort>,
    source_app: Arc<dyn SourceApplicationPort>,
}

impl HistoryEngine {
    pub fn new(deps: EngineDeps) -> Self {
        let EngineDeps {
            clipboard,
            source_app,
            persistence,
            clock,
            capacity,
        } = deps;

        Self {
            poller: Arc::new(Mutex::new(ClipboardPoller::new(Arc::clone(&clipboard)))),
            clipboard,
            store: Arc::new(RwLock::new(HistoryStore::new(capacity))),
            persistence,
            clock,
            source_app,
        }
    }

    /// Poll once and capture whatever changed.
    ///
    /// Returns `None` when the clipboard did not change.
    pub async fn tick(&self) -> Result<Option<CaptureOutcome>> {
        let poller = Arc::clone(&self.poller);
        let polled = tokio::task::spawn_blocking(move || {
            poller
                .lock()
                .map(|mut poller| poller.poll())
                .map_err(|_| anyhow!("clipboard poller lock poisoned"))
        })
        .await
        .map_err(|e| anyhow!("clipboard poll task failed: {}", e))??;

        match polled {
            PollOutcome::Unchanged => Ok(None),
            PollOutcome::Changed(snapshot) => Ok(Some(self.capture(snapshot).await)),
        }
    }

    /// Group a snapshot and record it in the history.
    pub async fn capture(&self, snapshot: ClipboardSnapshot) -> CaptureOutcome {
        let contents = group_representations(snapshot.representations);
        let now_ms = self.clock.now_ms();
        let source = if contents.is_empty() {
            None
        } else {
            self.source_app.frontmost()
        };

        let mut store = self.store.write().await;
        let outcome = store.capture(contents, now_ms, source);

        match &outcome {
            CaptureOutcome::Empty => debug!("clipboard cleared, nothing stored"),
            CaptureOutcome::Inserted { id, evicted } => {
                if let Some(item) = store.get(id) {
                    self.persistence.save(item.clone());
                }
                if !evicted.is_empty() {
                    self.persistence.enforce_capacity(store.capacity());
                }
                info!(item_id = %id, evicted = evicted.len(), "captured clipboard item");
            }
            CaptureOutcome::Promoted {
                id, active_at_ms, ..
            } => {
                self.persistence.touch(id.clone(), *active_at_ms);
                info!(item_id = %id, "promoted existing clipboard item");
            }
        }
        outcome
    }

    /// Drive [`HistoryEngine::tick`] on a fixed interval until cancelled,
    /// then wait for queued persistence work.
    pub async fn run(&self, poll_interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_ms = poll_interval.as_millis() as u64, "capture loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.tick().await {
                        warn!(error = %err, "clipboard poll failed");
                    }
                }
            }
        }

        self.persistence.flush().await;
        info!("capture loop stopped");
    }

    /// Merge the durable history into the store.
    ///
    /// Stale records for items that were re-captured meanwhile are deleted.
    /// Removals and clears issued while the read is in flight win over the
    /// loaded snapshot.
    pub async fn load_history(&self) -> Result<MergeOutcome> {
        let ticket = self.store.write().await.begin_load();
        let loaded = match self.persistence.load_all().await {
            Ok(loaded) => loaded,
            Err(err) => {
                self.store.write().await.abandon_load();
                return Err(err);
            }
        };
        let loaded_count = loaded.len();

        let mut store = self.store.write().await;
        let outcome = store.merge_loaded(ticket, loaded);
        for id in &outcome.superseded {
            self.persistence.delete(id.clone());
        }
        if !outcome.evicted.is_empty() {
            self.persistence.enforce_capacity(store.capacity());
        }

        info!(
            loaded = loaded_count,
            appended = outcome.appended,
            superseded = outcome.superseded.len(),
            discarded = outcome.discarded,
            evicted = outcome.evicted.len(),
            "history loaded"
        );
        Ok(outcome)
    }

    /// Load the durable history in the background while capture runs.
    pub fn spawn_initial_load(&self) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            if let Err(err) = engine.load_history().await {
                error!(error = %err, "failed to load history");
            }
        })
    }

    pub async fn select(&self, id: &HistoryItemId) -> bool {
        self.store.write().await.select(id)
    }

    pub async fn remove(&self, id: &HistoryItemId) -> Option<HistoryItem> {
        let mut store = self.store.write().await;
        let removed = store.remove(id)?;
        self.persistence.delete(removed.id.clone());
        Some(removed)
    }

    /// Empty the history and its durable mirror. Returns the resident count.
    pub async fn clear_all(&self) -> usize {
        let mut store = self.store.write().await;
        let cleared = store.clear();
        self.persistence.clear_all();
        info!(cleared, "history cleared");
        cleared
    }

    /// Apply a new capacity. Returns the ids that no longer fit.
    pub async fn set_capacity(&self, capacity: usize) -> Vec<HistoryItemId> {
        let mut store = self.store.write().await;
        let evicted = store.set_capacity(capacity);
        if !evicted.is_empty() {
            self.persistence.enforce_capacity(store.capacity());
        }
        evicted
    }

    /// Put every representation of an item back on the system clipboard and
    /// select it. Returns `false` for an unknown id.
    pub async fn copy_to_clipboard(&self, id: &HistoryItemId) -> Result<bool> {
        let Some(item) = self.get(id).await else {
            return Ok(false);
        };

        let representations: Vec<ObservedRepresentation> = item
            .contents
            .iter()
            .flat_map(|content| {
                content.formats.iter().map(|format| {
                    ObservedRepresentation::new(format.type_tag.clone(), content.bytes.clone())
                })
            })
            .collect();

        let clipboard = Arc::clone(&self.clipboard);
        tokio::task::spawn_blocking(move || clipboard.write_all(representations))
            .await
            .map_err(|e| anyhow!("clipboard write task failed: {}", e))??;

        debug!(item_id = %id, "copied history item to clipboard");
        Ok(self.select(id).await)
    }

    /// Resident items, most recent first.
    pub async fn items(&self) -> Vec<HistoryItem> {
        self.store.read().await.items().to_vec()
    }

    pub async fn get(&self, id: &HistoryItemId) -> Option<HistoryItem> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn selected(&self) -> Option<HistoryItem> {
        self.store.read().await.selected().cloned()
    }

    /// The first content of an item that can be shown as text.
    pub async fn text_content(&self, id: &HistoryItemId) -> Option<Content> {
        let store = self.store.read().await;
        store
            .get(id)?
            .contents
            .iter()
            .find(|content| content.is_text())
            .cloned()
    }

    pub async fn statistics(&self) -> HistoryStatistics {
        GetHistoryStatistics::new(Arc::clone(&self.store), self.persistence.clone())
            .execute()
            .await
    }

    /// Wait for every queued persistence command.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }
}
