use anyhow::{anyhow, Result};
use cs_core::clipboard::Content;
use cs_core::text::{TextChunk, TextChunkProvider};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Characters per chunk when the caller has no preference.
pub const DEFAULT_CHUNK_CHARS: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every chunk was delivered; `chars` is the total character count.
    Completed { chars: usize },
    Cancelled,
    /// The content has no readable text, or part of it failed to decode.
    Unavailable,
    /// The receiving side went away before the end.
    ReceiverDropped,
}

/// Streams one content's text to a channel, chunk by chunk, on a blocking
/// worker. Cancellation is checked before every fetch and every hand-off.
pub struct LoadTextProgressively {
    chunk_chars: usize,
}

impl Default for LoadTextProgressively {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CHARS)
    }
}

impl LoadTextProgressively {
    pub fn new(chunk_chars: usize) -> Self {
        Self {
            chunk_chars: chunk_chars.max(1),
        }
    }

    pub async fn execute(
        &self,
        content: Content,
        tx: mpsc::Sender<TextChunk>,
        cancel: CancellationToken,
    ) -> Result<LoadOutcome> {
        let chunk_chars = self.chunk_chars;
        tokio::task::spawn_blocking(move || load_blocking(&content, chunk_chars, &tx, &cancel))
            .await
            .map_err(|e| anyhow!("text loading task failed: {}", e))
    }
}

fn load_blocking(
    content: &Content,
    chunk_chars: usize,
    tx: &mpsc::Sender<TextChunk>,
    cancel: &CancellationToken,
) -> LoadOutcome {
    let Some(mut provider) = TextChunkProvider::for_content(content) else {
        return LoadOutcome::Unavailable;
    };

    let mut offset = 0;
    loop {
        if cancel.is_cancelled() {
            return LoadOutcome::Cancelled;
        }
        let Some(chunk) = provider.chunk(offset, chunk_chars) else {
            debug!(content_id = %content.id, offset, "text became unreadable mid-load");
            return LoadOutcome::Unavailable;
        };
        if chunk.is_empty() {
            return LoadOutcome::Completed { chars: offset };
        }

        if cancel.is_cancelled() {
            return LoadOutcome::Cancelled;
        }
        offset = chunk.next_offset;
        if tx.blocking_send(chunk).is_err() {
            return LoadOutcome::ReceiverDropped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use cs_core::clipboard::{tags, Format};

    fn text_content(text: String) -> Content {
        Content::new(Bytes::from(text), vec![Format::new(tags::PLAIN_TEXT)])
    }

    #[tokio::test]
    async fn test_streams_whole_text() {
        let text = "ünïcödé ✓ ".repeat(20_000);
        let (tx, mut rx) = mpsc::channel::<TextChunk>(4);
        let loader = LoadTextProgressively::new(5_000);

        let receiver = tokio::spawn(async move {
            let mut out = String::new();
            while let Some(chunk) = rx.recv().await {
                out.push_str(&chunk.text);
            }
            out
        });

        let outcome = loader
            .execute(text_content(text.clone()), tx, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Completed { chars: text.chars().count() });
        assert_eq!(receiver.await.unwrap(), text);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (tx, _rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = LoadTextProgressively::new(10)
            .execute(text_content("abc".repeat(10)), tx, cancel)
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_loading() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let outcome = LoadTextProgressively::new(10)
            .execute(text_content("abc".repeat(10)), tx, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::ReceiverDropped);
    }

    #[tokio::test]
    async fn test_binary_content_is_unavailable() {
        let (tx, _rx) = mpsc::channel(1);
        let image = Content::new(Bytes::from_static(&[0x89, 0x50]), vec![Format::new(tags::PNG)]);

        let outcome = LoadTextProgressively::default()
            .execute(image, tx, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Unavailable);
    }
}
