//! Command handlers for the `clipstack` binary.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use cs_app::usecases::{LoadOutcome, LoadTextProgressively};
use cs_app::HistoryEngine;
use cs_core::clipboard::{format_size, HistoryItem};
use cs_core::config::AppConfig;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bootstrap::AppRuntime;

const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Serialize)]
struct ListedItem<'a> {
    id: &'a str,
    timestamp_ms: i64,
    active_at_ms: i64,
    title: &'a str,
    size_bytes: usize,
    formats: Vec<&'a str>,
    source_application: Option<&'a str>,
}

impl<'a> From<&'a HistoryItem> for ListedItem<'a> {
    fn from(item: &'a HistoryItem) -> Self {
        Self {
            id: item.id.as_str(),
            timestamp_ms: item.timestamp_ms,
            active_at_ms: item.active_at_ms,
            title: item.title(),
            size_bytes: item.total_size_bytes(),
            formats: item
                .contents
                .iter()
                .flat_map(|c| c.formats.iter().map(|f| f.type_tag.as_str()))
                .collect(),
            source_application: item.source_application.as_ref().and_then(|s| s.label()),
        }
    }
}

/// Run the capture loop until Ctrl-C.
pub async fn watch(runtime: &AppRuntime, config: &AppConfig) -> Result<()> {
    if let Err(err) = runtime.clipboard.start_watching() {
        warn!(error = %err, "clipboard watcher unavailable, polling by fingerprint");
    }
    let load = runtime.engine.spawn_initial_load();

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, shutting down"),
            Err(err) => warn!(error = %err, "failed to listen for interrupt"),
        }
        signal_cancel.cancel();
    });

    runtime
        .engine
        .run(config.capture.poll_interval(), cancel)
        .await;

    runtime.clipboard.stop_watching();
    load.abort();
    Ok(())
}

pub async fn list(engine: &HistoryEngine, limit: Option<usize>, json: bool) -> Result<()> {
    let items = engine.items().await;
    let shown = &items[..limit.unwrap_or(items.len()).min(items.len())];

    if json {
        let listed: Vec<ListedItem<'_>> = shown.iter().map(ListedItem::from).collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("History is empty");
        return Ok(());
    }
    for item in shown {
        println!(
            "{}  {}  {:>9}  {}",
            short_id(item),
            format_timestamp(item.active_at_ms),
            format_size(item.total_size_bytes()),
            item.title()
        );
    }
    Ok(())
}

/// Stream an item's text to stdout chunk by chunk.
pub async fn show(engine: &HistoryEngine, prefix: &str, chunk_chars: usize) -> Result<()> {
    let item = find_item(engine, prefix).await?;
    let Some(content) = engine.text_content(&item.id).await else {
        bail!("item {} has no text content ({})", short_id(&item), item.title());
    };

    let (tx, mut rx) = mpsc::channel(4);
    let cancel = CancellationToken::new();
    let loader = LoadTextProgressively::new(chunk_chars);
    let loading = tokio::spawn({
        let cancel = cancel.clone();
        async move { loader.execute(content, tx, cancel).await }
    });

    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = rx.recv().await {
        if let Err(err) = stdout.write_all(chunk.text.as_bytes()).await {
            cancel.cancel();
            return Err(err).context("failed to write to stdout");
        }
    }
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    match loading.await.context("text loading task panicked")?? {
        LoadOutcome::Completed { .. } => Ok(()),
        LoadOutcome::Unavailable => bail!("text of item {} could not be decoded", short_id(&item)),
        LoadOutcome::Cancelled | LoadOutcome::ReceiverDropped => Ok(()),
    }
}

pub async fn stats(engine: &HistoryEngine, json: bool) -> Result<()> {
    let stats = engine.statistics().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("In memory");
    println!("  items:   {}", stats.memory.item_count);
    println!("  payload: {}", format_size(stats.memory.total_bytes));
    print_range(stats.memory.oldest_timestamp_ms, stats.memory.newest_timestamp_ms);

    match stats.durable {
        Some(durable) => {
            println!("On disk");
            println!("  items:   {}", durable.item_count);
            println!("  payload: {}", format_size(durable.total_bytes as usize));
            println!("  storage: {}", format_size(durable.on_disk_bytes as usize));
            print_range(durable.oldest_timestamp_ms, durable.newest_timestamp_ms);
        }
        None => println!("On disk: unavailable"),
    }
    Ok(())
}

pub async fn clear(engine: &HistoryEngine) -> Result<()> {
    let cleared = engine.clear_all().await;
    engine.flush().await;
    println!("Cleared {} items", cleared);
    Ok(())
}

pub async fn copy(engine: &HistoryEngine, prefix: &str) -> Result<()> {
    let item = find_item(engine, prefix).await?;
    if !engine.copy_to_clipboard(&item.id).await? {
        bail!("item {} disappeared while copying", short_id(&item));
    }
    println!("Copied {}", item.title());
    Ok(())
}

async fn find_item(engine: &HistoryEngine, prefix: &str) -> Result<HistoryItem> {
    let mut matches: Vec<HistoryItem> = engine
        .items()
        .await
        .into_iter()
        .filter(|item| item.id.as_str().starts_with(prefix))
        .collect();

    match matches.len() {
        0 => bail!("no history item matches '{}'", prefix),
        1 => Ok(matches.remove(0)),
        n => bail!("'{}' is ambiguous: {} items match", prefix, n),
    }
}

fn short_id(item: &HistoryItem) -> &str {
    let id = item.id.as_str();
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

fn print_range(oldest: Option<i64>, newest: Option<i64>) {
    if let (Some(oldest), Some(newest)) = (oldest, newest) {
        println!("  oldest:  {}", format_timestamp(oldest));
        println!("  newest:  {}", format_timestamp(newest));
    }
}
