//! Application configuration domain model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::history::DEFAULT_CAPACITY;

/// Shortest poll interval honored; lower values are raised to this.
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Application configuration
///
/// Every field has a default, so a partial TOML file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub history: HistoryConfig,
    pub storage: StorageConfig,
}

/// Clipboard observation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Milliseconds between change-token checks
    pub poll_interval_ms: u64,
}

/// History settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of items kept in memory and on disk
    pub max_items: usize,
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the database and blobs. Empty means the platform data dir.
    pub data_dir: PathBuf,

    /// Payloads larger than this go to the blob store instead of the database
    pub inline_threshold_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_CAPACITY,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            inline_threshold_bytes: 16 * 1024,
        }
    }
}

impl CaptureConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

impl HistoryConfig {
    /// Capacity is never below one.
    pub fn capacity(&self) -> usize {
        self.max_items.max(1)
    }
}

impl StorageConfig {
    pub fn has_custom_data_dir(&self) -> bool {
        !self.data_dir.as_os_str().is_empty()
    }
}
