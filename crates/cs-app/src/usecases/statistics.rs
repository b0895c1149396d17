use std::sync::Arc;

use cs_core::history::{DurableStats, HistoryStats, HistoryStore};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::persistence::PersistenceGateway;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStatistics {
    pub memory: HistoryStats,
    /// `None` when the durable store could not be queried.
    pub durable: Option<DurableStats>,
}

pub struct GetHistoryStatistics {
    store: Arc<RwLock<HistoryStore>>,
    persistence: PersistenceGateway,
}

impl GetHistoryStatistics {
    pub fn new(store: Arc<RwLock<HistoryStore>>, persistence: PersistenceGateway) -> Self {
        Self { store, persistence }
    }

    #[tracing::instrument(name = "usecase.history_statistics.execute", skip(self))]
    pub async fn execute(&self) -> HistoryStatistics {
        let memory = self.store.read().await.stats();
        let durable = match self.persistence.stats().await {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!(error = %err, "durable statistics unavailable");
                None
            }
        };
        HistoryStatistics { memory, durable }
    }
}
