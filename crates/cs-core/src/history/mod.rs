//! Ordered clipboard history.

mod stats;
mod store;

pub use stats::{DurableStats, HistoryStats};
pub use store::{CaptureOutcome, HistoryStore, LoadTicket, MergeOutcome, DEFAULT_CAPACITY};
