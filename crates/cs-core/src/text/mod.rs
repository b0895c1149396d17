//! Lazy, encoding-aware access to large text payloads.

mod encoding;
mod provider;

pub use encoding::{detect, Detection, TextDecodeError, TextEncoding, PROBE_LEN};
pub use provider::{
    estimate_text_size, get_text_chunk, TextChunk, TextChunkProvider, MARKUP_PAYLOAD_LIMIT,
    SMALL_PAYLOAD_LIMIT,
};
