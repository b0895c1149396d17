//! # cs-platform
//!
//! Operating-system adapters for the `cs-core` ports.

pub mod app_dirs;
pub mod clipboard;
pub mod source_app;

pub use app_dirs::DirsAppDirsAdapter;
pub use clipboard::RsSystemClipboard;
pub use source_app::NoSourceApplication;
