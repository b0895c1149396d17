//! Translation between clipboard-rs content kinds and type tags.

use anyhow::{anyhow, Result};
use bytes::Bytes;
use clipboard_rs::common::RustImage;
use clipboard_rs::{ClipboardContent, ContentFormat, RustImageData};
use cs_core::clipboard::tags;

/// Well-known tags and the native content kind each one is read through.
pub(crate) fn well_known_formats() -> [(&'static str, ContentFormat); 5] {
    [
        (tags::PLAIN_TEXT, ContentFormat::Text),
        (tags::RICH_TEXT, ContentFormat::Rtf),
        (tags::HTML, ContentFormat::Html),
        (tags::URL, ContentFormat::Files),
        (tags::PNG, ContentFormat::Image),
    ]
}

/// File lists travel as newline-separated URIs.
pub(crate) fn files_to_bytes(files: Vec<String>) -> Bytes {
    Bytes::from(files.join("\n"))
}

pub(crate) fn bytes_to_files(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(std::str::from_utf8(bytes)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn utf8(bytes: &[u8], tag: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| anyhow!("{} payload is not UTF-8: {}", tag, e))
}

/// Native content to write for one `(tag, bytes)` representation.
pub(crate) fn to_clipboard_content(type_tag: &str, bytes: &[u8]) -> Result<ClipboardContent> {
    Ok(match type_tag {
        tags::PLAIN_TEXT => ClipboardContent::Text(utf8(bytes, type_tag)?),
        tags::RICH_TEXT => ClipboardContent::Rtf(utf8(bytes, type_tag)?),
        tags::HTML => ClipboardContent::Html(utf8(bytes, type_tag)?),
        tags::URL => ClipboardContent::Files(bytes_to_files(bytes)?),
        tags::PNG => {
            let image = RustImageData::from_bytes(bytes).map_err(|e| anyhow!(e))?;
            ClipboardContent::Image(image)
        }
        other => ClipboardContent::Other(other.to_string(), bytes.to_vec()),
    })
}
