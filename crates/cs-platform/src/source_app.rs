use cs_core::clipboard::SourceApplicationInfo;
use cs_core::ports::SourceApplicationPort;

/// Placeholder [`SourceApplicationPort`] that never detects the frontmost
/// application, on any platform.
///
/// No foreground-app lookup is wired up yet, so every capture is recorded
/// without a source and `source_application` stays `None` in storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSourceApplication;

impl SourceApplicationPort for NoSourceApplication {
    fn frontmost(&self) -> Option<SourceApplicationInfo> {
        None
    }
}
