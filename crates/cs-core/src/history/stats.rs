use serde::Serialize;

/// In-memory view of the history, for statistics surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub item_count: usize,
    /// Sum of raw payload bytes over every content.
    pub total_bytes: usize,
    pub oldest_timestamp_ms: Option<i64>,
    pub newest_timestamp_ms: Option<i64>,
}

/// What the durable store reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DurableStats {
    pub item_count: usize,
    pub total_bytes: u64,
    pub oldest_timestamp_ms: Option<i64>,
    pub newest_timestamp_ms: Option<i64>,
    /// Database files plus external blob storage.
    pub on_disk_bytes: u64,
}
