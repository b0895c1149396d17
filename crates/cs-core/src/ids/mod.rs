//! ID type wrappers for type safety.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

/// Identity of one [`HistoryItem`](crate::clipboard::HistoryItem).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryItemId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatId(String);

/// Identifier of a payload stored outside the primary index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(String);

impl_id!(HistoryItemId, ContentId, FormatId, BlobId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(HistoryItemId::new(), HistoryItemId::new());
    }

    #[test]
    fn test_id_round_trips_through_string() {
        let id = ContentId::from("c-1");
        assert_eq!(id.as_str(), "c-1");
        assert_eq!(id.to_string(), "c-1");
        let s: String = id.into();
        assert_eq!(s, "c-1");
    }
}
