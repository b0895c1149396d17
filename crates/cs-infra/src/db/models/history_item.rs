use crate::db::schema::history_item;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = history_item)]
pub struct HistoryItemRow {
    pub item_id: String,
    pub captured_at_ms: i64,
    pub active_at_ms: i64,
    pub source_app_id: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = history_item)]
pub struct NewHistoryItemRow {
    pub item_id: String,
    pub captured_at_ms: i64,
    pub active_at_ms: i64,
    pub source_app_id: Option<String>,
}
