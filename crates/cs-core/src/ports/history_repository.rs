use anyhow::Result;
use async_trait::async_trait;

use crate::clipboard::HistoryItem;
use crate::history::DurableStats;
use crate::ids::HistoryItemId;

/// Durable storage for history items.
///
/// Ordering is by `active_at_ms`, newest first. Every method is safe to call
/// repeatedly; failures must leave previously stored state intact.
#[async_trait]
pub trait HistoryRepositoryPort: Send + Sync {
    /// Store an item. An id that is already stored only refreshes `active_at_ms`.
    async fn save(&self, item: &HistoryItem) -> Result<()>;

    async fn touch(&self, id: &HistoryItemId, active_at_ms: i64) -> Result<()>;

    async fn delete(&self, id: &HistoryItemId) -> Result<()>;

    async fn load_all(&self) -> Result<Vec<HistoryItem>>;

    async fn clear_all(&self) -> Result<()>;

    /// Keep the `max_items` most recent records; returns how many were deleted.
    async fn enforce_capacity(&self, max_items: usize) -> Result<usize>;

    async fn stats(&self) -> Result<DurableStats>;
}
