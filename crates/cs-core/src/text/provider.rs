use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::debug;

use super::encoding::{self, decode_prefix, walk, Detection, TextEncoding};
use crate::clipboard::{Content, FormatKind};

/// Payloads below this size are decoded once and sliced in memory.
pub const SMALL_PAYLOAD_LIMIT: usize = 100_000;

/// Rich text and HTML above this size are not offered as text at all.
pub const MARKUP_PAYLOAD_LIMIT: usize = 500_000;

/// A slice of text and the offset to ask for next.
///
/// Offsets count Unicode scalar values. `next_offset - offset` is the number
/// of characters in `text`, which can be less than requested at the end of the
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub next_offset: usize,
}

impl TextChunk {
    fn empty(offset: usize) -> Self {
        Self {
            text: String::new(),
            next_offset: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

enum Mode {
    Decoded {
        text: String,
        chars: usize,
        /// Last served position as (char offset, byte offset) into `text`.
        cursor: (usize, usize),
    },
    Streaming {
        detection: Detection,
        /// char offset -> absolute byte offset of that character.
        checkpoints: BTreeMap<usize, usize>,
        total_chars: Option<usize>,
    },
}

/// Incremental, character-safe access to the text of one payload.
///
/// Small payloads (and markup up to [`MARKUP_PAYLOAD_LIMIT`]) are decoded up
/// front. Large plain text is decoded one window at a time; window starts are
/// exact because they are found from recorded checkpoints, so chained chunks
/// always reassemble to the original text.
pub struct TextChunkProvider {
    bytes: Bytes,
    kind: FormatKind,
    mode: Mode,
}

impl TextChunkProvider {
    /// Provider for `bytes` read as `kind`. `None` when `kind` is not text,
    /// when markup is too large, or when a small payload does not decode.
    pub fn new(bytes: Bytes, kind: FormatKind) -> Option<Self> {
        if !kind.is_text() {
            return None;
        }

        let detection = encoding::detect(&bytes);
        let len = bytes.len();
        let decode_fully =
            len < SMALL_PAYLOAD_LIMIT || (kind.is_markup() && len <= MARKUP_PAYLOAD_LIMIT);

        let mode = if decode_fully {
            let body = &bytes[detection.bom_len.min(len)..];
            match decode_prefix(detection.encoding, body, usize::MAX, true) {
                Ok((text, walked)) => Mode::Decoded {
                    text,
                    chars: walked.chars,
                    cursor: (0, 0),
                },
                Err(err) => {
                    debug!(error = %err, size = len, "payload is not decodable text");
                    return None;
                }
            }
        } else if kind.is_markup() {
            debug!(size = len, "markup payload too large for text access");
            return None;
        } else {
            let mut checkpoints = BTreeMap::new();
            checkpoints.insert(0, detection.bom_len.min(len));
            Mode::Streaming {
                detection,
                checkpoints,
                total_chars: None,
            }
        };

        Some(Self { bytes, kind, mode })
    }

    /// Provider for the highest-priority text format of `content`.
    pub fn for_content(content: &Content) -> Option<Self> {
        let kind = content.text_format()?.kind();
        Self::new(content.bytes.clone(), kind)
    }

    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    /// Encoding used for streaming access; `None` when fully decoded.
    pub fn streaming_encoding(&self) -> Option<TextEncoding> {
        match &self.mode {
            Mode::Decoded { .. } => None,
            Mode::Streaming { detection, .. } => Some(detection.encoding),
        }
    }

    /// Up to `length` characters starting at character `offset`.
    ///
    /// Past the end the chunk is empty and `next_offset == offset`. `None`
    /// means the bytes around `offset` could not be decoded.
    pub fn chunk(&mut self, offset: usize, length: usize) -> Option<TextChunk> {
        if length == 0 {
            return Some(TextChunk::empty(offset));
        }

        match &mut self.mode {
            Mode::Decoded {
                text,
                chars,
                cursor,
            } => {
                if offset >= *chars {
                    return Some(TextChunk::empty(offset));
                }
                let base = if offset >= cursor.0 { *cursor } else { (0, 0) };
                let (_, start) = advance(text, base, offset - base.0);
                let (end_char, end) = advance(text, (offset, start), length);
                *cursor = (end_char, end);
                Some(TextChunk {
                    text: text[start..end].to_string(),
                    next_offset: end_char,
                })
            }
            Mode::Streaming {
                detection,
                checkpoints,
                total_chars,
            } => {
                if total_chars.is_some_and(|total| offset >= total) {
                    return Some(TextChunk::empty(offset));
                }

                let data = &self.bytes[..];
                let Some(start) = locate(data, detection, checkpoints, offset)? else {
                    return Some(TextChunk::empty(offset));
                };

                let window = length.saturating_mul(detection.encoding.max_bytes_per_char());
                let end = start.saturating_add(window).min(data.len());
                let at_end = end == data.len();

                match decode_prefix(detection.encoding, &data[start..end], length, at_end) {
                    Ok((text, walked)) => {
                        let next_offset = offset + walked.chars;
                        checkpoints.insert(next_offset, start + walked.consumed);
                        if start + walked.consumed == data.len() {
                            *total_chars = Some(next_offset);
                        }
                        Some(TextChunk { text, next_offset })
                    }
                    Err(err) => {
                        debug!(error = %err, offset, "text chunk not decodable");
                        None
                    }
                }
            }
        }
    }

    /// Approximate character count, only good for progress reporting.
    pub fn estimate_text_size(&self) -> usize {
        match &self.mode {
            Mode::Decoded { chars, .. } => *chars,
            Mode::Streaming {
                detection,
                total_chars,
                ..
            } => total_chars.unwrap_or_else(|| {
                let body = self.bytes.len().saturating_sub(detection.bom_len);
                (body as f64 / detection.bytes_per_char.max(1.0)).round() as usize
            }),
        }
    }
}

/// Move `n` characters forward from `(char offset, byte offset)` in `text`.
fn advance(text: &str, from: (usize, usize), n: usize) -> (usize, usize) {
    let (mut chars, mut byte) = from;
    for ch in text[byte..].chars().take(n) {
        chars += 1;
        byte += ch.len_utf8();
    }
    (chars, byte)
}

/// Absolute byte offset of character `offset`, `Some(None)` when the text
/// ends before it, `None` when the bytes on the way do not decode.
fn locate(
    data: &[u8],
    detection: &Detection,
    checkpoints: &mut BTreeMap<usize, usize>,
    offset: usize,
) -> Option<Option<usize>> {
    if let Some(width) = detection.encoding.fixed_width() {
        let pos = offset
            .checked_mul(width)
            .and_then(|b| b.checked_add(detection.bom_len));
        return Some(pos.filter(|p| *p <= data.len()));
    }

    let (from_char, from_byte) = checkpoints
        .range(..=offset)
        .next_back()
        .map(|(c, b)| (*c, *b))
        .unwrap_or((0, detection.bom_len.min(data.len())));

    if from_char == offset {
        return Some(Some(from_byte));
    }

    let needed = offset - from_char;
    match walk(detection.encoding, &data[from_byte..], needed, true, |_| {}) {
        Ok(walked) if walked.chars == needed => {
            let pos = from_byte + walked.consumed;
            checkpoints.insert(offset, pos);
            Some(Some(pos))
        }
        Ok(_) => Some(None),
        Err(err) => {
            debug!(error = %err, offset, "failed to locate text offset");
            None
        }
    }
}

/// Convenience wrapper: one chunk of `content`'s text.
pub fn get_text_chunk(content: &Content, offset: usize, length: usize) -> Option<TextChunk> {
    TextChunkProvider::for_content(content)?.chunk(offset, length)
}

/// Convenience wrapper: approximate character count of `content`'s text.
pub fn estimate_text_size(content: &Content) -> Option<usize> {
    TextChunkProvider::for_content(content).map(|p| p.estimate_text_size())
}
