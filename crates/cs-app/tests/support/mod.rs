//! Hand-written fakes shared by the engine tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use cs_app::{EngineDeps, HistoryEngine, PersistenceGateway};
use cs_core::clipboard::{ChangeToken, HistoryItem, ObservedRepresentation, SourceApplicationInfo};
use cs_core::history::DurableStats;
use cs_core::ids::HistoryItemId;
use cs_core::ports::{ClockPort, HistoryRepositoryPort, SourceApplicationPort, SystemClipboardPort};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeClipboard {
    representations: Mutex<Vec<ObservedRepresentation>>,
    changes: AtomicU64,
}

impl FakeClipboard {
    /// Replace the contents as another application would.
    pub fn set(&self, representations: &[(&str, &str)]) {
        let mut current = self.representations.lock().unwrap();
        *current = representations
            .iter()
            .map(|(tag, text)| ObservedRepresentation::new(*tag, Bytes::from(text.to_string())))
            .collect();
        self.changes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Vec<ObservedRepresentation> {
        self.representations.lock().unwrap().clone()
    }
}

impl SystemClipboardPort for FakeClipboard {
    fn change_token(&self) -> Result<ChangeToken> {
        Ok(ChangeToken::new(self.changes.load(Ordering::SeqCst)))
    }

    fn available_format_tags(&self) -> Result<Vec<String>> {
        Ok(self
            .representations
            .lock()
            .unwrap()
            .iter()
            .map(|rep| rep.type_tag.clone())
            .collect())
    }

    fn read_bytes(&self, type_tag: &str) -> Result<Option<Bytes>> {
        Ok(self
            .representations
            .lock()
            .unwrap()
            .iter()
            .find(|rep| rep.type_tag == type_tag)
            .map(|rep| rep.bytes.clone()))
    }

    fn clear(&self) -> Result<()> {
        self.representations.lock().unwrap().clear();
        self.changes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write_bytes(&self, type_tag: &str, bytes: Bytes) -> Result<()> {
        self.representations
            .lock()
            .unwrap()
            .push(ObservedRepresentation::new(type_tag, bytes));
        self.changes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Clock that advances one millisecond per reading.
#[derive(Default)]
pub struct StepClock {
    now: AtomicI64,
}

impl ClockPort for StepClock {
    fn now_ms(&self) -> i64 {
        self.now.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Default)]
pub struct FixedSourceApp {
    pub app: Mutex<Option<SourceApplicationInfo>>,
}

impl SourceApplicationPort for FixedSourceApp {
    fn frontmost(&self) -> Option<SourceApplicationInfo> {
        self.app.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Save(HistoryItemId),
    Touch(HistoryItemId, i64),
    Delete(HistoryItemId),
    EnforceCapacity(usize),
    ClearAll,
}

/// Holds `load_all` open until the test releases it.
#[derive(Default)]
pub struct LoadGate {
    pub entered: Notify,
    pub release: Notify,
}

/// Repository that records every call and serves a preset load result.
#[derive(Default)]
pub struct RecordingRepository {
    pub calls: Mutex<Vec<RepoCall>>,
    pub stored: Mutex<Vec<HistoryItem>>,
    pub fail_stats: bool,
    pub load_gate: Option<LoadGate>,
}

impl RecordingRepository {
    pub fn with_stored(items: Vec<HistoryItem>) -> Self {
        Self {
            stored: Mutex::new(items),
            ..Default::default()
        }
    }

    pub fn gated(items: Vec<HistoryItem>) -> Self {
        Self {
            load_gate: Some(LoadGate::default()),
            ..Self::with_stored(items)
        }
    }

    pub fn gate(&self) -> &LoadGate {
        self.load_gate.as_ref().expect("repository is not gated")
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RepoCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HistoryRepositoryPort for RecordingRepository {
    async fn save(&self, item: &HistoryItem) -> Result<()> {
        self.record(RepoCall::Save(item.id.clone()));
        Ok(())
    }

    async fn touch(&self, id: &HistoryItemId, active_at_ms: i64) -> Result<()> {
        self.record(RepoCall::Touch(id.clone(), active_at_ms));
        Ok(())
    }

    async fn delete(&self, id: &HistoryItemId) -> Result<()> {
        self.record(RepoCall::Delete(id.clone()));
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryItem>> {
        let snapshot = self.stored.lock().unwrap().clone();
        if let Some(gate) = &self.load_gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(snapshot)
    }

    async fn clear_all(&self) -> Result<()> {
        self.record(RepoCall::ClearAll);
        Ok(())
    }

    async fn enforce_capacity(&self, max_items: usize) -> Result<usize> {
        self.record(RepoCall::EnforceCapacity(max_items));
        Ok(0)
    }

    async fn stats(&self) -> Result<DurableStats> {
        if self.fail_stats {
            return Err(anyhow!("database is locked"));
        }
        Ok(DurableStats {
            item_count: self.stored.lock().unwrap().len(),
            ..Default::default()
        })
    }
}

pub struct Harness {
    pub engine: HistoryEngine,
    pub clipboard: Arc<FakeClipboard>,
    pub source_app: Arc<FixedSourceApp>,
}

pub fn harness(repo: Arc<dyn HistoryRepositoryPort>, capacity: usize) -> Harness {
    let clipboard = Arc::new(FakeClipboard::default());
    let source_app = Arc::new(FixedSourceApp::default());
    let (persistence, _worker) = PersistenceGateway::spawn(repo);

    let engine = HistoryEngine::new(EngineDeps {
        clipboard: clipboard.clone(),
        source_app: source_app.clone(),
        persistence,
        clock: Arc::new(StepClock::default()),
        capacity,
    });

    Harness {
        engine,
        clipboard,
        source_app,
    }
}
