use crate::db::schema::history_content;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = history_content)]
pub struct HistoryContentRow {
    pub content_id: String,
    pub item_id: String,
    pub position: i32,
    pub description: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub inline_data: Option<Vec<u8>>,
    pub blob_id: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = history_content)]
pub struct NewHistoryContentRow {
    pub content_id: String,
    pub item_id: String,
    pub position: i32,
    pub description: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub inline_data: Option<Vec<u8>>,
    pub blob_id: Option<String>,
}
