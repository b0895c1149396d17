use anyhow::Result;
use cs_core::clipboard::{Content, Format};
use cs_core::ids::{FormatId, HistoryItemId};

use crate::db::models::{ContentFormatRow, NewContentFormatRow, NewHistoryContentRow};
use crate::db::ports::{InsertMapper, RowMapper};
use crate::fs::{content_hash, StoredBlob};

/// A content about to be written, with where its bytes live.
pub struct PendingContent<'a> {
    pub item_id: &'a HistoryItemId,
    pub position: usize,
    pub content: &'a Content,
    /// `None` keeps the bytes inline in the row.
    pub blob: Option<&'a StoredBlob>,
}

pub struct ContentRowMapper;

impl<'a> InsertMapper<PendingContent<'a>, NewHistoryContentRow> for ContentRowMapper {
    fn to_row(&self, domain: &PendingContent<'a>) -> Result<NewHistoryContentRow> {
        let content = domain.content;
        let (content_hash, inline_data, blob_id) = match domain.blob {
            Some(blob) => (
                blob.meta.content_hash.clone(),
                None,
                Some(blob.blob_id.to_string()),
            ),
            None => (content_hash(&content.bytes), Some(content.bytes.to_vec()), None),
        };

        Ok(NewHistoryContentRow {
            content_id: content.id.to_string(),
            item_id: domain.item_id.to_string(),
            position: i32::try_from(domain.position)?,
            description: content.description.clone(),
            size_bytes: i64::try_from(content.size_bytes())?,
            content_hash,
            inline_data,
            blob_id,
        })
    }
}

pub struct FormatRowMapper;

impl<'a> InsertMapper<PendingContent<'a>, Vec<NewContentFormatRow>> for FormatRowMapper {
    fn to_row(&self, domain: &PendingContent<'a>) -> Result<Vec<NewContentFormatRow>> {
        domain
            .content
            .formats
            .iter()
            .enumerate()
            .map(|(position, format)| {
                Ok(NewContentFormatRow {
                    format_id: format.id.to_string(),
                    content_id: domain.content.id.to_string(),
                    position: i32::try_from(position)?,
                    type_tag: format.type_tag.clone(),
                })
            })
            .collect()
    }
}

impl RowMapper<ContentFormatRow, Format> for FormatRowMapper {
    fn to_domain(&self, row: &ContentFormatRow) -> Result<Format> {
        Ok(Format::with_id(
            FormatId::from(row.format_id.clone()),
            row.type_tag.clone(),
        ))
    }
}
