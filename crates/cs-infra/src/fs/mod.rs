pub mod blob_store;

pub use blob_store::{content_hash, BlobMeta, FsBlobStore, StoredBlob};
