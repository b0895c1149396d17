use crate::clipboard::{Content, SourceApplicationInfo};
use crate::ids::HistoryItemId;

/// One observed clipboard state.
///
/// `timestamp_ms` is the first capture and never changes. `active_at_ms` moves
/// forward every time the same state is captured again (promotion) and is what
/// durable ordering uses. Neither takes part in equality, which compares
/// `(contents, source_application)` only.
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub id: HistoryItemId,
    pub timestamp_ms: i64,
    pub active_at_ms: i64,
    pub contents: Vec<Content>,
    pub source_application: Option<SourceApplicationInfo>,
}

impl HistoryItem {
    pub fn new(
        contents: Vec<Content>,
        timestamp_ms: i64,
        source_application: Option<SourceApplicationInfo>,
    ) -> Self {
        Self {
            id: HistoryItemId::new(),
            timestamp_ms,
            active_at_ms: timestamp_ms,
            contents,
            source_application,
        }
    }

    pub fn total_size_bytes(&self) -> usize {
        self.contents.iter().map(Content::size_bytes).sum()
    }

    /// The content a listing shows first: the first text content, else the first one.
    pub fn primary_content(&self) -> Option<&Content> {
        self.contents
            .iter()
            .find(|c| c.is_text())
            .or_else(|| self.contents.first())
    }

    pub fn title(&self) -> &str {
        self.primary_content()
            .map(|c| c.description.as_str())
            .unwrap_or("")
    }
}

impl PartialEq for HistoryItem {
    fn eq(&self, other: &Self) -> bool {
        self.contents == other.contents && self.source_application == other.source_application
    }
}

impl Eq for HistoryItem {}
