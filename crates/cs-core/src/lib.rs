//! # cs-core
//!
//! Core domain models and business logic for Clipstack.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod clipboard;
pub mod config;
pub mod history;
pub mod ids;
pub mod ports;
pub mod text;

// Re-export commonly used types at the crate root
pub use clipboard::{Content, Format, FormatKind, HistoryItem, SourceApplicationInfo};
pub use config::AppConfig;
pub use history::{HistoryStore, DEFAULT_CAPACITY};
pub use ids::{BlobId, ContentId, FormatId, HistoryItemId};
