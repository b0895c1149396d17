use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use bytes::Bytes;
use clipboard_rs::common::RustImage;
use clipboard_rs::{
    Clipboard, ClipboardContext, ClipboardHandler, ClipboardWatcher, ClipboardWatcherContext,
    WatcherShutdown,
};
use cs_core::clipboard::{tags, ChangeToken, ObservedRepresentation};
use cs_core::ports::SystemClipboardPort;
use tracing::{debug, info, warn};

use super::mapping::{files_to_bytes, to_clipboard_content, well_known_formats};

fn map_clipboard_err<T>(
    result: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T> {
    result.map_err(|e| anyhow!(e))
}

/// Bumps the shared counter on every change notification.
struct ChangeCounter {
    changes: Arc<AtomicU64>,
}

impl ClipboardHandler for ChangeCounter {
    fn on_clipboard_change(&mut self) {
        self.changes.fetch_add(1, Ordering::SeqCst);
    }
}

/// System clipboard through clipboard-rs.
///
/// With [`RsSystemClipboard::start_watching`] running, the change token is a
/// counter bumped by the platform watcher. Without it the token is a
/// fingerprint of the advertised formats and the plain text, which costs a
/// read per poll.
pub struct RsSystemClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
    changes: Arc<AtomicU64>,
    watching: Arc<AtomicBool>,
    shutdown: Mutex<Option<WatcherShutdown>>,
}

impl RsSystemClipboard {
    pub fn new() -> Result<Self> {
        let context = map_clipboard_err(ClipboardContext::new())
            .map_err(|e| e.context("failed to open the system clipboard"))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
            changes: Arc::new(AtomicU64::new(0)),
            watching: Arc::new(AtomicBool::new(false)),
            shutdown: Mutex::new(None),
        })
    }

    fn context(&self) -> Result<MutexGuard<'_, ClipboardContext>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("clipboard context lock poisoned"))
    }

    /// Start the platform change watcher on a blocking thread.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_watching(&self) -> Result<()> {
        let mut shutdown = self
            .shutdown
            .lock()
            .map_err(|_| anyhow!("watcher lock poisoned"))?;
        if shutdown.is_some() {
            debug!("clipboard watcher already running, skipping start");
            return Ok(());
        }

        let mut watcher_ctx = map_clipboard_err(ClipboardWatcherContext::new())
            .map_err(|e| e.context("failed to create watcher context"))?;
        let handler = ChangeCounter {
            changes: Arc::clone(&self.changes),
        };
        let channel = watcher_ctx.add_handler(handler).get_shutdown_channel();

        let watching = Arc::clone(&self.watching);
        watching.store(true, Ordering::SeqCst);
        tokio::task::spawn_blocking(move || {
            info!("start clipboard watch");
            watcher_ctx.start_watch();
            watching.store(false, Ordering::SeqCst);
            info!("clipboard watch stopped");
        });

        *shutdown = Some(channel);
        Ok(())
    }

    pub fn stop_watching(&self) {
        let channel = match self.shutdown.lock() {
            Ok(mut shutdown) => shutdown.take(),
            Err(_) => None,
        };
        if let Some(channel) = channel {
            channel.stop();
        }
    }

    fn fingerprint(&self) -> Result<ChangeToken> {
        let ctx = self.context()?;
        let mut hasher = DefaultHasher::new();
        map_clipboard_err(ctx.available_formats())?.hash(&mut hasher);
        if let Ok(text) = ctx.get_text() {
            text.hash(&mut hasher);
        }
        Ok(ChangeToken::new(hasher.finish()))
    }
}

impl Drop for RsSystemClipboard {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

impl SystemClipboardPort for RsSystemClipboard {
    fn change_token(&self) -> Result<ChangeToken> {
        if self.watching.load(Ordering::SeqCst) {
            Ok(ChangeToken::new(self.changes.load(Ordering::SeqCst)))
        } else {
            self.fingerprint()
        }
    }

    fn available_format_tags(&self) -> Result<Vec<String>> {
        let ctx = self.context()?;
        let mut seen = HashSet::new();
        let mut available = Vec::new();

        for (tag, format) in well_known_formats() {
            if ctx.has(format) && seen.insert(tag.to_string()) {
                available.push(tag.to_string());
            }
        }

        // raw fallback
        for name in map_clipboard_err(ctx.available_formats())? {
            if seen.insert(name.clone()) {
                available.push(name);
            }
        }

        Ok(available)
    }

    fn read_bytes(&self, type_tag: &str) -> Result<Option<Bytes>> {
        let ctx = self.context()?;

        let read = match type_tag {
            tags::PLAIN_TEXT => ctx.get_text().map(Bytes::from),
            tags::RICH_TEXT => ctx.get_rich_text().map(Bytes::from),
            tags::HTML => ctx.get_html().map(Bytes::from),
            tags::URL => ctx.get_files().map(files_to_bytes),
            tags::PNG => ctx.get_image().and_then(|image| {
                image
                    .to_png()
                    .map(|png| Bytes::copy_from_slice(png.get_bytes()))
            }),
            other => ctx.get_buffer(other).map(Bytes::from),
        };

        match read {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) => {
                debug!(type_tag, error = %err, "clipboard representation unavailable");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<()> {
        map_clipboard_err(self.context()?.clear())
    }

    fn write_bytes(&self, type_tag: &str, bytes: Bytes) -> Result<()> {
        let content = to_clipboard_content(type_tag, &bytes)?;
        map_clipboard_err(self.context()?.set(vec![content]))
    }

    fn write_all(&self, representations: Vec<ObservedRepresentation>) -> Result<()> {
        let mut contents = Vec::with_capacity(representations.len());
        for rep in &representations {
            match to_clipboard_content(&rep.type_tag, &rep.bytes) {
                Ok(content) => contents.push(content),
                Err(err) => warn!(type_tag = %rep.type_tag, error = %err, "skipping representation"),
            }
        }
        let ctx = self.context()?;
        if contents.is_empty() {
            return map_clipboard_err(ctx.clear());
        }
        map_clipboard_err(ctx.set(contents))
    }
}
