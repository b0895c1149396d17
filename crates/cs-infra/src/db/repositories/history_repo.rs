use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::expression_methods::SqliteExpressionMethods;
use diesel::SqliteConnection;
use tracing::{debug, info, warn};

use cs_core::clipboard::{Content, Format, HistoryItem, SourceApplicationInfo};
use cs_core::history::DurableStats;
use cs_core::ids::{BlobId, ContentId, HistoryItemId};
use cs_core::ports::HistoryRepositoryPort;

use crate::db::error::PersistenceError;
use crate::db::mappers::{
    ContentRowMapper, FormatRowMapper, HistoryItemRowMapper, PendingContent, SourceAppRowMapper,
};
use crate::db::models::{
    ContentFormatRow, HistoryContentRow, HistoryItemRow, NewContentFormatRow,
    NewHistoryContentRow, NewHistoryItemRow, SourceAppRow,
};
use crate::db::ports::{DbExecutor, InsertMapper, RowMapper};
use crate::db::schema::{content_format, history_content, history_item, source_app};
use crate::fs::{FsBlobStore, StoredBlob};

/// Rows for one item, built before the save transaction opens.
struct ItemRows {
    item: NewHistoryItemRow,
    contents: Vec<NewHistoryContentRow>,
    formats: Vec<NewContentFormatRow>,
}

/// SQLite-backed history with large payloads in an [`FsBlobStore`].
///
/// Contents larger than `inline_threshold_bytes` are written to the blob
/// store before the database transaction that references them; if that
/// transaction fails the blobs are removed again, so a failed save leaves
/// earlier state untouched.
pub struct DieselHistoryRepository<E> {
    executor: Arc<E>,
    blob_store: Arc<FsBlobStore>,
    inline_threshold_bytes: usize,
    database_path: Option<PathBuf>,
}

impl<E> DieselHistoryRepository<E>
where
    E: DbExecutor + 'static,
{
    pub fn new(executor: E, blob_store: FsBlobStore, inline_threshold_bytes: usize) -> Self {
        Self {
            executor: Arc::new(executor),
            blob_store: Arc::new(blob_store),
            inline_threshold_bytes,
            database_path: None,
        }
    }

    /// Database file to include in on-disk statistics.
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = Some(path);
        self
    }

    /// Run `f` on a pooled connection without blocking the async runtime.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let executor = Arc::clone(&self.executor);
        tokio::task::spawn_blocking(move || executor.run(f))
            .await
            .map_err(|e| PersistenceError::Task(e.to_string()))?
    }

    async fn write_blobs(&self, item: &HistoryItem) -> Result<Vec<Option<StoredBlob>>> {
        let mut blobs = Vec::with_capacity(item.contents.len());
        for content in &item.contents {
            if content.size_bytes() <= self.inline_threshold_bytes {
                blobs.push(None);
                continue;
            }
            match self.blob_store.create(&content.bytes).await {
                Ok(blob) => blobs.push(Some(blob)),
                Err(err) => {
                    self.discard_blobs(blobs.iter().flatten().map(|b: &StoredBlob| b.blob_id.clone()).collect::<Vec<_>>())
                        .await;
                    return Err(err.context("failed to write content blob"));
                }
            }
        }
        Ok(blobs)
    }

    async fn discard_blobs(&self, blob_ids: impl IntoIterator<Item = BlobId>) {
        for blob_id in blob_ids {
            if let Err(err) = self.blob_store.delete(&blob_id).await {
                warn!(blob_id = %blob_id, error = %err, "failed to remove blob");
            }
        }
    }

    async fn insert_rows(
        &self,
        rows: ItemRows,
        source: Option<SourceApplicationInfo>,
    ) -> Result<()> {
        self.blocking(move |conn| {
            conn.transaction::<_, anyhow::Error, _>(|conn| {
                let mut item_row = rows.item;
                item_row.source_app_id = match &source {
                    Some(info) if !info.is_empty() => Some(resolve_source_app(conn, info)?),
                    _ => None,
                };

                diesel::insert_into(history_item::table)
                    .values(&item_row)
                    .execute(conn)?;
                for row in &rows.contents {
                    diesel::insert_into(history_content::table)
                        .values(row)
                        .execute(conn)?;
                }
                for row in &rows.formats {
                    diesel::insert_into(content_format::table)
                        .values(row)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    /// Rebuild one item. Fails when any of its payloads is missing or corrupt.
    async fn assemble(
        &self,
        row: HistoryItemRow,
        content_rows: Vec<HistoryContentRow>,
        formats_by_content: &mut HashMap<String, Vec<Format>>,
        apps: &HashMap<String, SourceApplicationInfo>,
    ) -> Result<HistoryItem> {
        let item_id = HistoryItemId::from(row.item_id);
        if content_rows.is_empty() {
            return Err(PersistenceError::EmptyItem { item_id }.into());
        }

        let mut contents = Vec::with_capacity(content_rows.len());
        for content in content_rows {
            let bytes = match (content.inline_data, content.blob_id) {
                (Some(data), _) => Bytes::from(data),
                (None, Some(blob_id)) => {
                    self.blob_store
                        .read_verified(&BlobId::from(blob_id), &content.content_hash)
                        .await?
                }
                (None, None) => {
                    return Err(PersistenceError::MissingPayload {
                        content_id: content.content_id,
                    }
                    .into())
                }
            };

            let formats = formats_by_content
                .remove(&content.content_id)
                .unwrap_or_default();
            if formats.is_empty() {
                anyhow::bail!("content {} has no formats", content.content_id);
            }

            contents.push(Content::restore(
                ContentId::from(content.content_id),
                bytes,
                formats,
                content.description,
            ));
        }

        Ok(HistoryItem {
            id: item_id,
            timestamp_ms: row.captured_at_ms,
            active_at_ms: row.active_at_ms,
            contents,
            source_application: row
                .source_app_id
                .and_then(|id| apps.get(&id).cloned()),
        })
    }

    async fn database_size(&self) -> Result<u64> {
        let Some(path) = &self.database_path else {
            return Ok(0);
        };

        let mut total = 0;
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            match tokio::fs::metadata(&file).await {
                Ok(meta) => total += meta.len(),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(total)
    }
}

fn build_rows(item: &HistoryItem, blobs: &[Option<StoredBlob>]) -> Result<ItemRows> {
    let mut rows = ItemRows {
        item: HistoryItemRowMapper.to_row(item)?,
        contents: Vec::with_capacity(item.contents.len()),
        formats: Vec::new(),
    };

    for (position, (content, blob)) in item.contents.iter().zip(blobs).enumerate() {
        let pending = PendingContent {
            item_id: &item.id,
            position,
            content,
            blob: blob.as_ref(),
        };
        rows.contents.push(ContentRowMapper.to_row(&pending)?);
        rows.formats.extend(FormatRowMapper.to_row(&pending)?);
    }

    Ok(rows)
}

/// Id of the stored record for `info`, inserting one if none matches.
fn resolve_source_app(conn: &mut SqliteConnection, info: &SourceApplicationInfo) -> Result<String> {
    // `IS` so that a missing bundle id or name matches a stored NULL.
    let existing = source_app::table
        .filter(source_app::bundle_identifier.is(&info.bundle_identifier))
        .filter(source_app::application_name.is(&info.application_name))
        .select(source_app::source_app_id)
        .first::<String>(conn)
        .optional()?;

    if let Some(source_app_id) = existing {
        return Ok(source_app_id);
    }

    let new_row = SourceAppRowMapper.to_row(info)?;
    diesel::insert_into(source_app::table)
        .values(&new_row)
        .execute(conn)?;
    Ok(new_row.source_app_id)
}

#[async_trait]
impl<E> HistoryRepositoryPort for DieselHistoryRepository<E>
where
    E: DbExecutor + 'static,
{
    async fn save(&self, item: &HistoryItem) -> Result<()> {
        let item_id = item.id.to_string();
        let active_at_ms = item.active_at_ms;
        let refreshed = self
            .blocking(move |conn| {
                let updated = diesel::update(
                    history_item::table.filter(history_item::item_id.eq(&item_id)),
                )
                .set(history_item::active_at_ms.eq(active_at_ms))
                .execute(conn)?;
                Ok(updated > 0)
            })
            .await?;

        if refreshed {
            debug!(item_id = %item.id, "item already stored, refreshed active time");
            return Ok(());
        }

        let blobs = self.write_blobs(item).await?;
        let result = match build_rows(item, &blobs) {
            Ok(rows) => self.insert_rows(rows, item.source_application.clone()).await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            self.discard_blobs(blobs.into_iter().flatten().map(|b| b.blob_id))
                .await;
            return Err(err.context(format!("failed to save item {}", item.id)));
        }

        debug!(
            item_id = %item.id,
            contents = item.contents.len(),
            blobs = blobs.iter().flatten().count(),
            "item saved"
        );
        Ok(())
    }

    async fn touch(&self, id: &HistoryItemId, active_at_ms: i64) -> Result<()> {
        let item_id = id.to_string();
        let updated = self
            .blocking(move |conn| {
                Ok(diesel::update(
                    history_item::table.filter(history_item::item_id.eq(&item_id)),
                )
                .set(history_item::active_at_ms.eq(active_at_ms))
                .execute(conn)?)
            })
            .await?;

        if updated == 0 {
            debug!(item_id = %id, "touch for an item that is not stored");
        }
        Ok(())
    }

    async fn delete(&self, id: &HistoryItemId) -> Result<()> {
        let item_id = id.to_string();
        let blob_ids = self
            .blocking(move |conn| {
                conn.transaction::<_, anyhow::Error, _>(|conn| {
                    let blob_ids: Vec<Option<String>> = history_content::table
                        .filter(history_content::item_id.eq(&item_id))
                        .select(history_content::blob_id)
                        .load(conn)?;
                    diesel::delete(history_item::table.filter(history_item::item_id.eq(&item_id)))
                        .execute(conn)?;
                    Ok(blob_ids)
                })
            })
            .await
            .with_context(|| format!("failed to delete item {}", id))?;

        self.discard_blobs(blob_ids.into_iter().flatten().map(BlobId::from))
            .await;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryItem>> {
        let (item_rows, content_rows, format_rows, app_rows) = self
            .blocking(|conn| {
                conn.transaction::<_, anyhow::Error, _>(|conn| {
                    let items = history_item::table
                        .order((
                            history_item::active_at_ms.desc(),
                            history_item::captured_at_ms.desc(),
                            // insertion order breaks timestamp ties
                            sql::<BigInt>("history_item.rowid").desc(),
                        ))
                        .select(HistoryItemRow::as_select())
                        .load::<HistoryItemRow>(conn)?;
                    let contents = history_content::table
                        .order((history_content::item_id.asc(), history_content::position.asc()))
                        .select(HistoryContentRow::as_select())
                        .load::<HistoryContentRow>(conn)?;
                    let formats = content_format::table
                        .order((content_format::content_id.asc(), content_format::position.asc()))
                        .select(ContentFormatRow::as_select())
                        .load::<ContentFormatRow>(conn)?;
                    let apps = source_app::table
                        .select(SourceAppRow::as_select())
                        .load::<SourceAppRow>(conn)?;
                    Ok((items, contents, formats, apps))
                })
            })
            .await
            .context("failed to read stored history")?;

        let mut formats_by_content: HashMap<String, Vec<Format>> = HashMap::new();
        for row in &format_rows {
            formats_by_content
                .entry(row.content_id.clone())
                .or_default()
                .push(FormatRowMapper.to_domain(row)?);
        }

        let mut contents_by_item: HashMap<String, Vec<HistoryContentRow>> = HashMap::new();
        for row in content_rows {
            contents_by_item
                .entry(row.item_id.clone())
                .or_default()
                .push(row);
        }

        let mut apps = HashMap::with_capacity(app_rows.len());
        for row in &app_rows {
            apps.insert(row.source_app_id.clone(), SourceAppRowMapper.to_domain(row)?);
        }

        let total = item_rows.len();
        let mut items = Vec::with_capacity(total);
        for row in item_rows {
            let item_id = row.item_id.clone();
            let contents = contents_by_item.remove(&item_id).unwrap_or_default();
            match self
                .assemble(row, contents, &mut formats_by_content, &apps)
                .await
            {
                Ok(item) => items.push(item),
                Err(err) => warn!(item_id = %item_id, error = %err, "skipping unreadable stored item"),
            }
        }

        info!(loaded = items.len(), skipped = total - items.len(), "stored history loaded");
        Ok(items)
    }

    async fn clear_all(&self) -> Result<()> {
        self.blocking(|conn| {
            conn.transaction::<_, anyhow::Error, _>(|conn| {
                diesel::delete(content_format::table).execute(conn)?;
                diesel::delete(history_content::table).execute(conn)?;
                diesel::delete(history_item::table).execute(conn)?;
                diesel::delete(source_app::table).execute(conn)?;
                Ok(())
            })
        })
        .await
        .context("failed to clear stored history")?;

        // The rows are gone; leftover files are only reclaimable space.
        if let Err(err) = self.blob_store.clear().await {
            warn!(error = %err, "failed to remove stored blobs");
        }
        info!("stored history cleared");
        Ok(())
    }

    async fn enforce_capacity(&self, max_items: usize) -> Result<usize> {
        let keep = i64::try_from(max_items).unwrap_or(i64::MAX);
        let (removed, blob_ids) = self
            .blocking(move |conn| {
                conn.transaction::<_, anyhow::Error, _>(|conn| {
                    let stale: Vec<String> = history_item::table
                        .order((
                            history_item::active_at_ms.desc(),
                            history_item::captured_at_ms.desc(),
                            // insertion order breaks timestamp ties
                            sql::<BigInt>("history_item.rowid").desc(),
                        ))
                        .select(history_item::item_id)
                        .limit(i64::MAX)
                        .offset(keep)
                        .load(conn)?;

                    if stale.is_empty() {
                        return Ok((0, Vec::new()));
                    }

                    let blob_ids: Vec<Option<String>> = history_content::table
                        .filter(history_content::item_id.eq_any(stale.clone()))
                        .select(history_content::blob_id)
                        .load(conn)?;
                    let removed = diesel::delete(
                        history_item::table.filter(history_item::item_id.eq_any(stale)),
                    )
                    .execute(conn)?;
                    Ok((removed, blob_ids))
                })
            })
            .await
            .context("failed to enforce stored capacity")?;

        self.discard_blobs(blob_ids.into_iter().flatten().map(BlobId::from))
            .await;
        if removed > 0 {
            debug!(removed, max_items, "stored history trimmed");
        }
        Ok(removed)
    }

    async fn stats(&self) -> Result<DurableStats> {
        let (timestamps, sizes) = self
            .blocking(|conn| {
                let timestamps: Vec<i64> = history_item::table
                    .select(history_item::captured_at_ms)
                    .load(conn)?;
                let sizes: Vec<i64> = history_content::table
                    .select(history_content::size_bytes)
                    .load(conn)?;
                Ok((timestamps, sizes))
            })
            .await?;

        let on_disk_bytes = self.database_size().await? + self.blob_store.disk_usage().await?;

        Ok(DurableStats {
            item_count: timestamps.len(),
            total_bytes: sizes.iter().map(|s| (*s).max(0) as u64).sum(),
            oldest_timestamp_ms: timestamps.iter().copied().min(),
            newest_timestamp_ms: timestamps.iter().copied().max(),
            on_disk_bytes,
        })
    }
}
