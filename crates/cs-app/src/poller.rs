use std::collections::HashSet;
use std::sync::Arc;

use cs_core::clipboard::{tags, ChangeToken, ClipboardSnapshot, ObservedRepresentation};
use cs_core::ports::SystemClipboardPort;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum PollOutcome {
    Unchanged,
    /// The clipboard changed. An empty snapshot means it was cleared.
    Changed(ClipboardSnapshot),
}

/// Detects clipboard changes by token and reads every representation.
pub struct ClipboardPoller {
    clipboard: Arc<dyn SystemClipboardPort>,
    last_token: Option<ChangeToken>,
}

impl ClipboardPoller {
    pub fn new(clipboard: Arc<dyn SystemClipboardPort>) -> Self {
        Self {
            clipboard,
            last_token: None,
        }
    }

    /// One poll. The first call after construction always reports a change.
    ///
    /// A token that cannot be read counts as unchanged; a format that cannot
    /// be listed or read is left out of the snapshot.
    pub fn poll(&mut self) -> PollOutcome {
        let token = match self.clipboard.change_token() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "failed to read clipboard change token");
                return PollOutcome::Unchanged;
            }
        };

        if self.last_token == Some(token) {
            return PollOutcome::Unchanged;
        }
        self.last_token = Some(token);

        PollOutcome::Changed(self.read_snapshot())
    }

    fn read_snapshot(&self) -> ClipboardSnapshot {
        let advertised = match self.clipboard.available_format_tags() {
            Ok(advertised) => advertised,
            Err(err) => {
                warn!(error = %err, "failed to list clipboard formats");
                return ClipboardSnapshot::default();
            }
        };

        let mut snapshot = ClipboardSnapshot::default();
        for tag in read_order(&advertised) {
            match self.clipboard.read_bytes(tag) {
                Ok(Some(bytes)) => snapshot
                    .representations
                    .push(ObservedRepresentation::new(tag, bytes)),
                Ok(None) => debug!(type_tag = tag, "advertised format has no data"),
                Err(err) => warn!(type_tag = tag, error = %err, "failed to read clipboard format"),
            }
        }

        debug!(
            representation_count = snapshot.representation_count(),
            total_bytes = snapshot.total_size_bytes(),
            "clipboard changed"
        );
        snapshot
    }
}

/// Well-known tags in priority order, then every other tag as advertised.
/// Each tag appears once.
pub fn read_order(advertised: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(advertised.len());

    for tag in tags::PRIORITY {
        if advertised.iter().any(|a| a == tag) && seen.insert(tag) {
            order.push(tag);
        }
    }
    for tag in advertised {
        if seen.insert(tag.as_str()) {
            order.push(tag.as_str());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use bytes::Bytes;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Clipboard {}

        impl SystemClipboardPort for Clipboard {
            fn change_token(&self) -> Result<ChangeToken>;
            fn available_format_tags(&self) -> Result<Vec<String>>;
            fn read_bytes(&self, type_tag: &str) -> Result<Option<Bytes>>;
            fn clear(&self) -> Result<()>;
            fn write_bytes(&self, type_tag: &str, bytes: Bytes) -> Result<()>;
        }
    }

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_read_order_puts_priority_tags_first() {
        let advertised = strings(&["com.example.raw", tags::HTML, tags::PLAIN_TEXT, tags::HTML]);
        assert_eq!(
            read_order(&advertised),
            vec![tags::PLAIN_TEXT, tags::HTML, "com.example.raw"]
        );
    }

    #[test]
    fn test_first_poll_reads_and_unchanged_token_does_not() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_change_token()
            .times(2)
            .returning(|| Ok(ChangeToken::new(7)));
        clipboard
            .expect_available_format_tags()
            .times(1)
            .returning(|| Ok(vec![tags::PLAIN_TEXT.to_string()]));
        clipboard
            .expect_read_bytes()
            .with(eq(tags::PLAIN_TEXT))
            .times(1)
            .returning(|_| Ok(Some(Bytes::from_static(b"hello"))));

        let mut poller = ClipboardPoller::new(Arc::new(clipboard));

        match poller.poll() {
            PollOutcome::Changed(snapshot) => {
                assert_eq!(snapshot.representations.len(), 1);
                assert_eq!(snapshot.representations[0].bytes, Bytes::from_static(b"hello"));
            }
            PollOutcome::Unchanged => panic!("first poll must report a change"),
        }
        assert!(matches!(poller.poll(), PollOutcome::Unchanged));
    }

    #[test]
    fn test_failed_reads_degrade_to_fewer_representations() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_change_token()
            .returning(|| Ok(ChangeToken::new(1)));
        clipboard
            .expect_available_format_tags()
            .returning(|| Ok(strings(&[tags::PLAIN_TEXT, tags::PNG, "x-custom"])));
        clipboard.expect_read_bytes().returning(|tag| match tag {
            tags::PLAIN_TEXT => Ok(Some(Bytes::from_static(b"t"))),
            tags::PNG => Err(anyhow!("image vanished")),
            _ => Ok(None),
        });

        let mut poller = ClipboardPoller::new(Arc::new(clipboard));
        let PollOutcome::Changed(snapshot) = poller.poll() else {
            panic!("expected a change");
        };
        assert_eq!(snapshot.representations.len(), 1);
        assert_eq!(snapshot.representations[0].type_tag, tags::PLAIN_TEXT);
    }

    #[test]
    fn test_token_failure_is_unchanged() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_change_token()
            .returning(|| Err(anyhow!("pasteboard unavailable")));
        clipboard.expect_available_format_tags().never();

        let mut poller = ClipboardPoller::new(Arc::new(clipboard));
        assert!(matches!(poller.poll(), PollOutcome::Unchanged));
    }

    #[test]
    fn test_listing_failure_reports_cleared_clipboard() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_change_token()
            .returning(|| Ok(ChangeToken::new(3)));
        clipboard
            .expect_available_format_tags()
            .returning(|| Err(anyhow!("busy")));

        let mut poller = ClipboardPoller::new(Arc::new(clipboard));
        let PollOutcome::Changed(snapshot) = poller.poll() else {
            panic!("expected a change");
        };
        assert!(snapshot.is_empty());
    }
}
