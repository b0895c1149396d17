use std::sync::Arc;

use anyhow::Result;
use cs_core::clipboard::HistoryItem;
use cs_core::history::DurableStats;
use cs_core::ids::HistoryItemId;
use cs_core::ports::HistoryRepositoryPort;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info_span, warn, Instrument};

enum PersistenceCommand {
    Save(Box<HistoryItem>),
    Touch {
        id: HistoryItemId,
        active_at_ms: i64,
    },
    Delete(HistoryItemId),
    EnforceCapacity(usize),
    ClearAll,
    Flush(oneshot::Sender<()>),
}

impl PersistenceCommand {
    fn name(&self) -> &'static str {
        match self {
            PersistenceCommand::Save(_) => "save",
            PersistenceCommand::Touch { .. } => "touch",
            PersistenceCommand::Delete(_) => "delete",
            PersistenceCommand::EnforceCapacity(_) => "enforce_capacity",
            PersistenceCommand::ClearAll => "clear_all",
            PersistenceCommand::Flush(_) => "flush",
        }
    }
}

/// Fire-and-forget front of the history repository.
///
/// Writes are queued and applied by one background worker in the order they
/// were sent, so callers never wait on storage. Failures are logged and leave
/// earlier durable state as it was. Cloning shares the same queue; the worker
/// exits after the last clone is dropped.
#[derive(Clone)]
pub struct PersistenceGateway {
    tx: mpsc::UnboundedSender<PersistenceCommand>,
    repo: Arc<dyn HistoryRepositoryPort>,
}

impl PersistenceGateway {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn(repo: Arc<dyn HistoryRepositoryPort>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = PersistenceWorker {
            rx,
            repo: Arc::clone(&repo),
        };
        let handle = tokio::spawn(worker.run());
        (Self { tx, repo }, handle)
    }

    fn send(&self, command: PersistenceCommand) {
        let name = command.name();
        if self.tx.send(command).is_err() {
            warn!(command = name, "persistence worker stopped, command dropped");
        }
    }

    pub fn save(&self, item: HistoryItem) {
        self.send(PersistenceCommand::Save(Box::new(item)));
    }

    pub fn touch(&self, id: HistoryItemId, active_at_ms: i64) {
        self.send(PersistenceCommand::Touch { id, active_at_ms });
    }

    pub fn delete(&self, id: HistoryItemId) {
        self.send(PersistenceCommand::Delete(id));
    }

    pub fn enforce_capacity(&self, max_items: usize) {
        self.send(PersistenceCommand::EnforceCapacity(max_items));
    }

    pub fn clear_all(&self) {
        self.send(PersistenceCommand::ClearAll);
    }

    /// Wait until every command sent before this call has been applied.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(PersistenceCommand::Flush(done_tx));
        if done_rx.await.is_err() {
            warn!("persistence worker stopped before flush completed");
        }
    }

    /// Everything stored, most recently active first. Not queued.
    pub async fn load_all(&self) -> Result<Vec<HistoryItem>> {
        self.repo.load_all().await
    }

    /// Durable statistics once queued writes have landed.
    pub async fn stats(&self) -> Result<DurableStats> {
        self.flush().await;
        self.repo.stats().await
    }
}

struct PersistenceWorker {
    rx: mpsc::UnboundedReceiver<PersistenceCommand>,
    repo: Arc<dyn HistoryRepositoryPort>,
}

impl PersistenceWorker {
    /// Run the worker loop until the channel is closed.
    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            let name = command.name();
            let span = info_span!("app.persistence", command = name);
            if let Err(err) = self.apply(command).instrument(span).await {
                error!(command = name, error = %err, "persistence command failed");
            }
        }
        debug!("persistence worker exiting");
    }

    async fn apply(&self, command: PersistenceCommand) -> Result<()> {
        match command {
            PersistenceCommand::Save(item) => self.repo.save(&item).await,
            PersistenceCommand::Touch { id, active_at_ms } => {
                self.repo.touch(&id, active_at_ms).await
            }
            PersistenceCommand::Delete(id) => self.repo.delete(&id).await,
            PersistenceCommand::EnforceCapacity(max_items) => {
                let removed = self.repo.enforce_capacity(max_items).await?;
                debug!(removed, max_items, "durable capacity enforced");
                Ok(())
            }
            PersistenceCommand::ClearAll => self.repo.clear_all().await,
            PersistenceCommand::Flush(done) => {
                let _ = done.send(());
                Ok(())
            }
        }
    }
}
