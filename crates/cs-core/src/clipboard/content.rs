use bytes::Bytes;

use crate::clipboard::{Format, FormatKind};
use crate::ids::ContentId;
use crate::text::TextChunkProvider;

const DESCRIPTION_SCAN_CHARS: usize = 200;
const DESCRIPTION_MAX_CHARS: usize = 100;

/// One logical clipboard payload and every format it was exposed under.
///
/// All `formats` refer to the same bytes as observed in a single capture.
/// Equality across captures compares `(bytes, formats, description)`.
#[derive(Debug, Clone)]
pub struct Content {
    pub id: ContentId,
    pub bytes: Bytes,
    pub formats: Vec<Format>,
    pub description: String,
}

impl Content {
    /// Build a freshly captured content and derive its description.
    pub fn new(bytes: Bytes, formats: Vec<Format>) -> Self {
        debug_assert!(!formats.is_empty(), "content requires at least one format");
        let description = describe(&bytes, &formats);
        Self {
            id: ContentId::new(),
            bytes,
            formats,
            description,
        }
    }

    /// Rebuild a content from storage, keeping its recorded identity.
    pub fn restore(id: ContentId, bytes: Bytes, formats: Vec<Format>, description: String) -> Self {
        Self {
            id,
            bytes,
            formats,
            description,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn has_format(&self, type_tag: &str) -> bool {
        self.formats.iter().any(|f| f.type_tag == type_tag)
    }

    /// Highest-priority text-bearing format, if any.
    pub fn text_format(&self) -> Option<&Format> {
        text_format_of(&self.formats)
    }

    pub fn is_text(&self) -> bool {
        self.text_format().is_some()
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
            && self.formats == other.formats
            && self.description == other.description
    }
}

impl Eq for Content {}

fn text_format_of(formats: &[Format]) -> Option<&Format> {
    const ORDER: [FormatKind; 4] = [
        FormatKind::PlainText,
        FormatKind::Url,
        FormatKind::Html,
        FormatKind::RichText,
    ];
    ORDER
        .iter()
        .find_map(|kind| formats.iter().find(|f| f.kind() == *kind))
}

fn describe(bytes: &Bytes, formats: &[Format]) -> String {
    let text_kind = text_format_of(formats).map(Format::kind);

    if let Some(kind) = text_kind {
        if let Some(summary) = summarize_text(bytes, kind) {
            return summary;
        }
    }

    let name = formats
        .first()
        .map(Format::display_name)
        .unwrap_or("Unknown");
    format!("{} ({})", name, format_size(bytes.len()))
}

fn summarize_text(bytes: &Bytes, kind: FormatKind) -> Option<String> {
    let mut provider = TextChunkProvider::new(bytes.clone(), kind)?;
    let chunk = provider.chunk(0, DESCRIPTION_SCAN_CHARS)?;
    let line = chunk
        .text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?;

    if line.chars().count() > DESCRIPTION_MAX_CHARS {
        let truncated: String = line.chars().take(DESCRIPTION_MAX_CHARS).collect();
        Some(format!("{}…", truncated.trim_end()))
    } else {
        Some(line.to_string())
    }
}

/// Human readable byte size, e.g. `12.3 KB`.
pub fn format_size(size: usize) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if size < 1024 {
        return format!("{} B", size);
    }
    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
