//! Dependency bundle handed to the history engine.

use std::sync::Arc;

use cs_core::ports::{ClockPort, SourceApplicationPort, SystemClipboardPort};

use crate::persistence::PersistenceGateway;

/// Everything the engine talks to.
///
/// Constructed by the wiring layer; tests substitute fakes for any port.
pub struct EngineDeps {
    // Clipboard
    pub clipboard: Arc<dyn SystemClipboardPort>,
    pub source_app: Arc<dyn SourceApplicationPort>,

    // Storage
    pub persistence: PersistenceGateway,

    // System
    pub clock: Arc<dyn ClockPort>,

    /// Initial history capacity.
    pub capacity: usize,
}
