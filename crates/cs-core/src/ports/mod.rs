//! Port interfaces for the application layer
//!
//! Ports define the contract between the engine (use cases) and the
//! infrastructure/platform implementations, keeping the domain free of
//! clipboard APIs and storage engines.

mod app_dirs;
mod clock;
mod history_repository;
mod source_app;
mod system_clipboard;

pub use app_dirs::{AppDirs, AppDirsError, AppDirsPort};
pub use clock::ClockPort;
pub use history_repository::HistoryRepositoryPort;
pub use source_app::SourceApplicationPort;
pub use system_clipboard::SystemClipboardPort;
