use crate::db::schema::content_format;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = content_format)]
pub struct ContentFormatRow {
    pub format_id: String,
    pub content_id: String,
    pub position: i32,
    pub type_tag: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_format)]
pub struct NewContentFormatRow {
    pub format_id: String,
    pub content_id: String,
    pub position: i32,
    pub type_tag: String,
}
