use anyhow::Result;
use bytes::Bytes;

use crate::clipboard::{ChangeToken, ObservedRepresentation};

/// The system-wide clipboard, as seen by the engine.
///
/// Implementations give best-effort snapshots: the clipboard may change
/// between any two calls.
pub trait SystemClipboardPort: Send + Sync {
    /// Token that differs whenever the contents changed. Must be cheap.
    fn change_token(&self) -> Result<ChangeToken>;

    /// Every type tag the clipboard currently advertises.
    fn available_format_tags(&self) -> Result<Vec<String>>;

    /// Raw bytes for one tag, `None` if the tag is gone or empty.
    fn read_bytes(&self, type_tag: &str) -> Result<Option<Bytes>>;

    fn clear(&self) -> Result<()>;

    fn write_bytes(&self, type_tag: &str, bytes: Bytes) -> Result<()>;

    /// Replace the clipboard with the given representations.
    fn write_all(&self, representations: Vec<ObservedRepresentation>) -> Result<()> {
        self.clear()?;
        for rep in representations {
            self.write_bytes(&rep.type_tag, rep.bytes)?;
        }
        Ok(())
    }
}
