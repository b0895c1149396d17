//! Clipboard domain models.

mod content;
mod format;
mod grouper;
mod item;
mod snapshot;
mod source_app;

pub use content::{format_size, Content};
pub use format::{tags, Format, FormatKind};
pub use grouper::group_representations;
pub use item::HistoryItem;
pub use snapshot::{ChangeToken, ClipboardSnapshot, ObservedRepresentation};
pub use source_app::SourceApplicationInfo;
