use bytes::Bytes;

/// Opaque token the system clipboard changes whenever its contents change.
///
/// Only inequality is meaningful; no ordering or arithmetic is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeToken(u64);

impl ChangeToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<u64> for ChangeToken {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// One `(type tag, bytes)` pair read from the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRepresentation {
    pub type_tag: String,
    pub bytes: Bytes,
}

impl ObservedRepresentation {
    pub fn new(type_tag: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            type_tag: type_tag.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Everything one poll read after a detected change.
#[derive(Debug, Clone, Default)]
pub struct ClipboardSnapshot {
    pub representations: Vec<ObservedRepresentation>,
}

impl ClipboardSnapshot {
    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    pub fn representation_count(&self) -> usize {
        self.representations.len()
    }

    pub fn total_size_bytes(&self) -> usize {
        self.representations.iter().map(|r| r.size_bytes()).sum()
    }
}
