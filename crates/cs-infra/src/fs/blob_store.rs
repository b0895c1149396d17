use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use cs_core::ids::BlobId;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::db::error::PersistenceError;

pub const BLOBS_DIR: &str = "blobs";
const BLOB_META_FILE_NAME: &str = "meta.json";
const BLOB_DATA_FILE_NAME: &str = "data.bin";

/// Sidecar written next to every blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    pub size_bytes: u64,
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub blob_id: BlobId,
    pub meta: BlobMeta,
}

/// `blake3v1:<hex>` digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("blake3v1:{}", hex::encode(blake3::hash(bytes).as_bytes()))
}

/// Payloads kept outside the database, one directory per blob:
/// `<root>/blobs/<blob_id>/{data.bin, meta.json}`.
pub struct FsBlobStore {
    root: PathBuf,
}

fn validate_blob_id(blob_id: &BlobId) -> Result<()> {
    uuid::Uuid::parse_str(blob_id.as_str())
        .with_context(|| format!("invalid blob id: {}", blob_id))?;
    Ok(())
}

impl FsBlobStore {
    /// Create a new FsBlobStore rooted at the given filesystem path.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.root.join(BLOBS_DIR)
    }

    fn blob_dir(&self, blob_id: &BlobId) -> Result<PathBuf> {
        validate_blob_id(blob_id)?;
        Ok(self.blobs_dir().join(blob_id.as_str()))
    }

    /// Write `bytes` under a fresh id.
    pub async fn create(&self, bytes: &Bytes) -> Result<StoredBlob> {
        let blob_id = BlobId::from(uuid::Uuid::new_v4().to_string());
        let dir = self.blobs_dir().join(blob_id.as_str());
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create blob dir {}", dir.display()))?;

        let meta = BlobMeta {
            size_bytes: bytes.len() as u64,
            content_hash: content_hash(bytes),
        };

        fs::write(dir.join(BLOB_DATA_FILE_NAME), bytes).await?;
        fs::write(dir.join(BLOB_META_FILE_NAME), serde_json::to_vec(&meta)?).await?;

        debug!(blob_id = %blob_id, size = bytes.len(), "blob written");
        Ok(StoredBlob { blob_id, meta })
    }

    pub async fn read_meta(&self, blob_id: &BlobId) -> Result<BlobMeta> {
        let path = self.blob_dir(blob_id)?.join(BLOB_META_FILE_NAME);
        let meta_bytes = fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_json::from_slice(&meta_bytes)?)
    }

    pub async fn read_data(&self, blob_id: &BlobId) -> Result<Bytes> {
        let path = self.blob_dir(blob_id)?.join(BLOB_DATA_FILE_NAME);
        let data = fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Bytes::from(data))
    }

    /// Read a blob and check it against the hash recorded for it.
    pub async fn read_verified(&self, blob_id: &BlobId, expected_hash: &str) -> Result<Bytes> {
        let meta = self.read_meta(blob_id).await?;
        let data = self.read_data(blob_id).await?;

        if meta.content_hash != expected_hash
            || meta.size_bytes != data.len() as u64
            || content_hash(&data) != expected_hash
        {
            return Err(PersistenceError::CorruptBlob {
                blob_id: blob_id.clone(),
            }
            .into());
        }
        Ok(data)
    }

    /// Remove one blob. A blob that is already gone is not an error.
    pub async fn delete(&self, blob_id: &BlobId) -> Result<()> {
        let dir = self.blob_dir(blob_id)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", dir.display())),
        }
    }

    /// Remove every blob.
    pub async fn clear(&self) -> Result<()> {
        let dir = self.blobs_dir();
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", dir.display())),
        }
    }

    /// Total size of every file under the blobs directory.
    pub async fn disk_usage(&self) -> Result<u64> {
        let mut total = 0u64;
        let mut pending = vec![self.blobs_dir()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    pending.push(entry.path());
                } else {
                    total += metadata.len();
                }
            }
        }

        Ok(total)
    }
}
