use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::FormatId;

/// Well-known clipboard type tags.
///
/// Platform adapters translate their native representations to these tags when
/// one exists; anything else is passed through under the platform's own name.
pub mod tags {
    pub const PLAIN_TEXT: &str = "text/plain";
    pub const RICH_TEXT: &str = "text/rtf";
    pub const HTML: &str = "text/html";
    pub const URL: &str = "text/uri-list";
    pub const PNG: &str = "image/png";
    pub const TIFF: &str = "image/tiff";

    /// Order in which the poller reads well-known tags.
    pub const PRIORITY: [&str; 6] = [PLAIN_TEXT, RICH_TEXT, HTML, URL, PNG, TIFF];
}

/// Classification of a type tag, used to decide how a payload can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    PlainText,
    RichText,
    Html,
    Url,
    Png,
    Tiff,
    Other,
}

impl FormatKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            tags::PLAIN_TEXT => FormatKind::PlainText,
            tags::RICH_TEXT => FormatKind::RichText,
            tags::HTML => FormatKind::Html,
            tags::URL => FormatKind::Url,
            tags::PNG => FormatKind::Png,
            tags::TIFF => FormatKind::Tiff,
            _ => FormatKind::Other,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormatKind::PlainText | FormatKind::RichText | FormatKind::Html | FormatKind::Url
        )
    }

    /// Markup formats only get the bounded full-decode path.
    pub fn is_markup(&self) -> bool {
        matches!(self, FormatKind::RichText | FormatKind::Html)
    }

    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            FormatKind::PlainText => Some("Plain Text"),
            FormatKind::RichText => Some("Rich Text"),
            FormatKind::Html => Some("HTML"),
            FormatKind::Url => Some("URL"),
            FormatKind::Png => Some("PNG Image"),
            FormatKind::Tiff => Some("TIFF Image"),
            FormatKind::Other => None,
        }
    }
}

/// One representation of a clipboard payload.
///
/// Equality compares `type_tag` only: the same representation captured twice
/// yields two `Format` instances with different ids that are still equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    pub id: FormatId,
    pub type_tag: String,
}

impl Format {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            id: FormatId::new(),
            type_tag: type_tag.into(),
        }
    }

    pub fn with_id(id: FormatId, type_tag: impl Into<String>) -> Self {
        Self {
            id,
            type_tag: type_tag.into(),
        }
    }

    pub fn kind(&self) -> FormatKind {
        FormatKind::from_tag(&self.type_tag)
    }

    pub fn display_name(&self) -> &str {
        self.kind().display_name().unwrap_or(&self.type_tag)
    }
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        self.type_tag == other.type_tag
    }
}

impl Eq for Format {}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
