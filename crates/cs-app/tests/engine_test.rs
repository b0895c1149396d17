//! Capture-loop behavior against a recording repository.

mod support;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use cs_core::clipboard::{tags, Content, Format, HistoryItem, SourceApplicationInfo};
use cs_core::history::CaptureOutcome;
use support::{harness, RecordingRepository, RepoCall};
use tokio_util::sync::CancellationToken;

const UTF8_PLAIN: &str = "public.utf8-plain-text";

fn titles(items: &[HistoryItem]) -> Vec<String> {
    items.iter().map(|item| item.title().to_string()).collect()
}

fn text_item(text: &str, at_ms: i64) -> HistoryItem {
    HistoryItem::new(
        vec![Content::new(
            Bytes::from(text.to_string()),
            vec![Format::new(tags::PLAIN_TEXT)],
        )],
        at_ms,
        None,
    )
}

#[tokio::test]
async fn test_identical_buffers_become_one_content() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);

    h.clipboard
        .set(&[(tags::PLAIN_TEXT, "hello"), (UTF8_PLAIN, "hello")]);
    let outcome = h.engine.tick().await.unwrap();
    assert!(matches!(outcome, Some(CaptureOutcome::Inserted { .. })));

    let items = h.engine.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].contents.len(), 1);
    let formats: Vec<&str> = items[0].contents[0]
        .formats
        .iter()
        .map(|f| f.type_tag.as_str())
        .collect();
    assert_eq!(formats, vec![tags::PLAIN_TEXT, UTF8_PLAIN]);

    h.engine.flush().await;
    assert_eq!(repo.calls(), vec![RepoCall::Save(items[0].id.clone())]);
}

#[tokio::test]
async fn test_fewer_formats_is_a_new_item() {
    let h = harness(Arc::new(RecordingRepository::default()), 10);

    h.clipboard
        .set(&[(tags::PLAIN_TEXT, "hello"), (UTF8_PLAIN, "hello")]);
    h.engine.tick().await.unwrap();
    h.clipboard.set(&[(tags::PLAIN_TEXT, "hello")]);
    h.engine.tick().await.unwrap();

    assert_eq!(h.engine.items().await.len(), 2);
}

#[tokio::test]
async fn test_unchanged_clipboard_is_not_recaptured() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);

    h.clipboard.set(&[(tags::PLAIN_TEXT, "once")]);
    assert!(h.engine.tick().await.unwrap().is_some());
    assert!(h.engine.tick().await.unwrap().is_none());

    h.engine.flush().await;
    assert_eq!(repo.calls().len(), 1);
}

#[tokio::test]
async fn test_recopy_promotes_instead_of_duplicating() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);

    for text in ["A", "B", "A"] {
        h.clipboard.set(&[(tags::PLAIN_TEXT, text)]);
        h.engine.tick().await.unwrap();
    }

    let items = h.engine.items().await;
    assert_eq!(titles(&items), vec!["A", "B"]);
    assert!(items[0].active_at_ms > items[0].timestamp_ms);
    assert_eq!(h.engine.selected().await.map(|i| i.id), Some(items[0].id.clone()));

    h.engine.flush().await;
    let calls = repo.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[2],
        RepoCall::Touch(items[0].id.clone(), items[0].active_at_ms)
    );
}

#[tokio::test]
async fn test_capacity_evicts_oldest_and_enforces_once() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 2);

    for text in ["A", "B", "C"] {
        h.clipboard.set(&[(tags::PLAIN_TEXT, text)]);
        h.engine.tick().await.unwrap();
    }

    assert_eq!(titles(&h.engine.items().await), vec!["C", "B"]);

    h.engine.flush().await;
    let calls = repo.calls();
    let enforced: Vec<&RepoCall> = calls
        .iter()
        .filter(|c| matches!(c, RepoCall::EnforceCapacity(_)))
        .collect();
    assert_eq!(enforced, vec![&RepoCall::EnforceCapacity(2)]);
    assert_eq!(calls.last(), Some(&RepoCall::EnforceCapacity(2)));
}

#[tokio::test]
async fn test_cleared_clipboard_stores_nothing() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);

    h.clipboard.set(&[]);
    let outcome = h.engine.tick().await.unwrap();
    assert_eq!(outcome, Some(CaptureOutcome::Empty));
    assert!(h.engine.items().await.is_empty());

    h.engine.flush().await;
    assert!(repo.calls().is_empty());
}

#[tokio::test]
async fn test_source_application_is_attached() {
    let h = harness(Arc::new(RecordingRepository::default()), 10);
    let editor = SourceApplicationInfo::named("org.example.editor", "Editor");
    *h.source_app.app.lock().unwrap() = Some(editor.clone());

    h.clipboard.set(&[(tags::PLAIN_TEXT, "from editor")]);
    h.engine.tick().await.unwrap();

    let items = h.engine.items().await;
    assert_eq!(items[0].source_application, Some(editor));
}

#[tokio::test]
async fn test_clear_all_is_idempotent() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);

    h.clipboard.set(&[(tags::PLAIN_TEXT, "x")]);
    h.engine.tick().await.unwrap();

    assert_eq!(h.engine.clear_all().await, 1);
    assert_eq!(h.engine.clear_all().await, 0);
    assert!(h.engine.items().await.is_empty());
    assert!(h.engine.selected().await.is_none());

    h.engine.flush().await;
    let calls = repo.calls();
    assert_eq!(&calls[1..], &[RepoCall::ClearAll, RepoCall::ClearAll]);
}

#[tokio::test]
async fn test_remove_deletes_durable_record() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);

    h.clipboard.set(&[(tags::PLAIN_TEXT, "gone soon")]);
    h.engine.tick().await.unwrap();
    let id = h.engine.items().await[0].id.clone();

    assert!(h.engine.remove(&id).await.is_some());
    assert!(h.engine.remove(&id).await.is_none());

    h.engine.flush().await;
    assert_eq!(repo.calls().last(), Some(&RepoCall::Delete(id)));
}

#[tokio::test]
async fn test_load_merges_behind_new_captures() {
    let stale_duplicate = text_item("A", 1);
    let older = text_item("old", 0);
    let repo = Arc::new(RecordingRepository::with_stored(vec![
        stale_duplicate.clone(),
        older.clone(),
    ]));
    let h = harness(repo.clone(), 10);

    h.clipboard.set(&[(tags::PLAIN_TEXT, "A")]);
    h.engine.tick().await.unwrap();

    let outcome = h.engine.load_history().await.unwrap();
    assert_eq!(outcome.appended, 1);
    assert_eq!(outcome.superseded, vec![stale_duplicate.id.clone()]);

    let items = h.engine.items().await;
    assert_eq!(titles(&items), vec!["A", "old"]);
    assert_ne!(items[0].id, stale_duplicate.id);
    assert_eq!(items[1].id, older.id);

    h.engine.flush().await;
    assert_eq!(repo.calls().last(), Some(&RepoCall::Delete(stale_duplicate.id)));
}

#[tokio::test]
async fn test_load_beyond_capacity_enforces_durable_capacity() {
    let repo = Arc::new(RecordingRepository::with_stored(vec![
        text_item("c", 3),
        text_item("b", 2),
        text_item("a", 1),
    ]));
    let h = harness(repo.clone(), 2);

    let outcome = h.engine.load_history().await.unwrap();
    assert_eq!(outcome.evicted.len(), 1);
    assert_eq!(titles(&h.engine.items().await), vec!["c", "b"]);

    h.engine.flush().await;
    assert_eq!(repo.calls(), vec![RepoCall::EnforceCapacity(2)]);
}

#[tokio::test]
async fn test_clear_all_during_initial_load_wins() {
    let repo = Arc::new(RecordingRepository::gated(vec![text_item("old", 0)]));
    let h = harness(repo.clone(), 10);

    let load = h.engine.spawn_initial_load();
    repo.gate().entered.notified().await;
    h.clipboard.set(&[(tags::PLAIN_TEXT, "A")]);
    h.engine.tick().await.unwrap();
    h.engine.clear_all().await;
    repo.gate().release.notify_one();
    load.await.unwrap();

    assert!(h.engine.items().await.is_empty());
}

#[tokio::test]
async fn test_remove_during_initial_load_wins() {
    let repo = Arc::new(RecordingRepository::gated(Vec::new()));
    let h = harness(repo.clone(), 10);

    h.clipboard.set(&[(tags::PLAIN_TEXT, "A")]);
    h.engine.tick().await.unwrap();
    let captured = h.engine.items().await[0].clone();
    // The durable snapshot already holds the capture.
    *repo.stored.lock().unwrap() = vec![captured.clone(), text_item("old", 0)];

    let load = h.engine.spawn_initial_load();
    repo.gate().entered.notified().await;
    assert!(h.engine.remove(&captured.id).await.is_some());
    repo.gate().release.notify_one();
    load.await.unwrap();

    assert_eq!(titles(&h.engine.items().await), vec!["old"]);
}

#[tokio::test]
async fn test_set_capacity_reports_evicted_ids() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 5);

    for text in ["1", "2", "3"] {
        h.clipboard.set(&[(tags::PLAIN_TEXT, text)]);
        h.engine.tick().await.unwrap();
    }
    let oldest = h.engine.items().await[2].id.clone();

    assert_eq!(h.engine.set_capacity(2).await, vec![oldest]);
    assert!(h.engine.set_capacity(4).await.is_empty());

    h.engine.flush().await;
    assert_eq!(repo.calls().last(), Some(&RepoCall::EnforceCapacity(2)));
}

#[tokio::test]
async fn test_copy_back_writes_every_representation_and_selects() {
    let h = harness(Arc::new(RecordingRepository::default()), 10);

    h.clipboard
        .set(&[(tags::PLAIN_TEXT, "first"), (tags::HTML, "<b>first</b>")]);
    h.engine.tick().await.unwrap();
    h.clipboard.set(&[(tags::PLAIN_TEXT, "second")]);
    h.engine.tick().await.unwrap();

    let first = h.engine.items().await[1].clone();
    assert!(h.engine.copy_to_clipboard(&first.id).await.unwrap());

    let written: Vec<(String, Bytes)> = h
        .clipboard
        .contents()
        .into_iter()
        .map(|rep| (rep.type_tag, rep.bytes))
        .collect();
    assert_eq!(
        written,
        vec![
            (tags::PLAIN_TEXT.to_string(), Bytes::from_static(b"first")),
            (tags::HTML.to_string(), Bytes::from_static(b"<b>first</b>")),
        ]
    );
    assert_eq!(h.engine.selected().await.map(|i| i.id), Some(first.id));

    let unknown = text_item("nowhere", 0).id;
    assert!(!h.engine.copy_to_clipboard(&unknown).await.unwrap());
}

#[tokio::test]
async fn test_statistics_without_durable_store() {
    let repo = Arc::new(RecordingRepository {
        fail_stats: true,
        ..Default::default()
    });
    let h = harness(repo, 10);

    h.clipboard.set(&[(tags::PLAIN_TEXT, "four")]);
    h.engine.tick().await.unwrap();

    let stats = h.engine.statistics().await;
    assert_eq!(stats.memory.item_count, 1);
    assert_eq!(stats.memory.total_bytes, 4);
    assert!(stats.durable.is_none());
}

#[tokio::test]
async fn test_run_captures_until_cancelled() {
    let repo = Arc::new(RecordingRepository::default());
    let h = harness(repo.clone(), 10);
    h.clipboard.set(&[(tags::PLAIN_TEXT, "looped")]);

    let cancel = CancellationToken::new();
    let engine = h.engine.clone();
    let loop_cancel = cancel.clone();
    let handle =
        tokio::spawn(async move { engine.run(Duration::from_millis(5), loop_cancel).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(titles(&h.engine.items().await), vec!["looped"]);
    assert_eq!(repo.calls().len(), 1);
}
