use anyhow::Result;
use bytes::Bytes;
use cs_core::clipboard::SourceApplicationInfo;

use crate::db::models::{NewSourceAppRow, SourceAppRow};
use crate::db::ports::{InsertMapper, RowMapper};

pub struct SourceAppRowMapper;

impl InsertMapper<SourceApplicationInfo, NewSourceAppRow> for SourceAppRowMapper {
    fn to_row(&self, domain: &SourceApplicationInfo) -> Result<NewSourceAppRow> {
        Ok(NewSourceAppRow {
            source_app_id: uuid::Uuid::new_v4().to_string(),
            bundle_identifier: domain.bundle_identifier.clone(),
            application_name: domain.application_name.clone(),
            icon_bytes: domain.icon_bytes.as_ref().map(|b| b.to_vec()),
        })
    }
}

impl RowMapper<SourceAppRow, SourceApplicationInfo> for SourceAppRowMapper {
    fn to_domain(&self, row: &SourceAppRow) -> Result<SourceApplicationInfo> {
        Ok(SourceApplicationInfo {
            bundle_identifier: row.bundle_identifier.clone(),
            application_name: row.application_name.clone(),
            icon_bytes: row.icon_bytes.clone().map(Bytes::from),
        })
    }
}
