use anyhow::Result;
use cs_core::clipboard::HistoryItem;

use crate::db::models::NewHistoryItemRow;
use crate::db::ports::InsertMapper;

pub struct HistoryItemRowMapper;

impl InsertMapper<HistoryItem, NewHistoryItemRow> for HistoryItemRowMapper {
    /// The source application is resolved separately, inside the save transaction.
    fn to_row(&self, domain: &HistoryItem) -> Result<NewHistoryItemRow> {
        Ok(NewHistoryItemRow {
            item_id: domain.id.to_string(),
            captured_at_ms: domain.timestamp_ms,
            active_at_ms: domain.active_at_ms,
            source_app_id: None,
        })
    }
}
