pub mod content_mapper;
pub mod history_item_mapper;
pub mod source_app_mapper;

pub use content_mapper::{ContentRowMapper, FormatRowMapper, PendingContent};
pub use history_item_mapper::HistoryItemRowMapper;
pub use source_app_mapper::SourceAppRowMapper;
