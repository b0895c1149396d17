use cs_core::ids::{BlobId, HistoryItemId};
use thiserror::Error;

/// Failures a caller may want to tell apart when reading stored history.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored item {item_id} has no contents")]
    EmptyItem { item_id: HistoryItemId },

    #[error("content {content_id} has neither inline data nor a blob")]
    MissingPayload { content_id: String },

    #[error("blob {blob_id} failed its integrity check")]
    CorruptBlob { blob_id: BlobId },

    #[error("database task failed: {0}")]
    Task(String),
}
