//! # cs-app
//!
//! Application layer: the capture loop, the persistence queue and the use
//! cases the presentation layer calls.

pub mod deps;
pub mod engine;
pub mod persistence;
pub mod poller;
pub mod usecases;

pub use deps::EngineDeps;
pub use engine::HistoryEngine;
pub use persistence::PersistenceGateway;
pub use poller::{ClipboardPoller, PollOutcome};
pub use usecases::{GetHistoryStatistics, HistoryStatistics, LoadOutcome, LoadTextProgressively};
