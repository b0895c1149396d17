use bytes::Bytes;

/// Foreground application observed at capture time. Every field is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceApplicationInfo {
    pub bundle_identifier: Option<String>,
    pub application_name: Option<String>,
    pub icon_bytes: Option<Bytes>,
}

impl SourceApplicationInfo {
    pub fn named(bundle_identifier: impl Into<String>, application_name: impl Into<String>) -> Self {
        Self {
            bundle_identifier: Some(bundle_identifier.into()),
            application_name: Some(application_name.into()),
            icon_bytes: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bundle_identifier.is_none()
            && self.application_name.is_none()
            && self.icon_bytes.is_none()
    }

    /// Name suitable for listings: application name, then bundle identifier.
    pub fn label(&self) -> Option<&str> {
        self.application_name
            .as_deref()
            .or(self.bundle_identifier.as_deref())
    }
}
