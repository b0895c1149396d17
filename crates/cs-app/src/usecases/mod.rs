//! Use cases driven by the presentation layer.

pub mod load_text;
pub mod statistics;

pub use load_text::{LoadOutcome, LoadTextProgressively, DEFAULT_CHUNK_CHARS};
pub use statistics::{GetHistoryStatistics, HistoryStatistics};
