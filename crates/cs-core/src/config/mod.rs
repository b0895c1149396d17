mod app_config;

pub use app_config::{AppConfig, CaptureConfig, HistoryConfig, StorageConfig, MIN_POLL_INTERVAL_MS};
