use crate::clipboard::SourceApplicationInfo;

/// Reports the application in the foreground at capture time.
pub trait SourceApplicationPort: Send + Sync {
    fn frontmost(&self) -> Option<SourceApplicationInfo>;
}
