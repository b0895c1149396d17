use crate::db::schema::source_app;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = source_app)]
pub struct SourceAppRow {
    pub source_app_id: String,
    pub bundle_identifier: Option<String>,
    pub application_name: Option<String>,
    pub icon_bytes: Option<Vec<u8>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = source_app)]
pub struct NewSourceAppRow {
    pub source_app_id: String,
    pub bundle_identifier: Option<String>,
    pub application_name: Option<String>,
    pub icon_bytes: Option<Vec<u8>>,
}
