pub mod content_format;
pub mod history_content;
pub mod history_item;
pub mod source_app;

pub use content_format::{ContentFormatRow, NewContentFormatRow};
pub use history_content::{HistoryContentRow, NewHistoryContentRow};
pub use history_item::{HistoryItemRow, NewHistoryItemRow};
pub use source_app::{NewSourceAppRow, SourceAppRow};
