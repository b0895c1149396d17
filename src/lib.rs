//! Clipstack
//!
//! Command-line front end of the clipboard history engine.

pub mod bootstrap;
pub mod cli;
pub mod commands;

use anyhow::Result;
use cli::{Cli, Command};

/// Resolve configuration, wire the engine and run one command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = bootstrap::resolve_config(cli.config.as_deref())?;
    let app_dirs = bootstrap::resolve_default_app_dirs(&config)?;
    bootstrap::init_tracing_subscriber(Some(app_dirs.logs_dir().as_path()))?;

    let runtime = bootstrap::wire_dependencies(&config, &app_dirs)?;
    let engine = &runtime.engine;

    if !matches!(cli.command, Command::Watch) {
        engine.load_history().await?;
    }

    let result = match cli.command {
        Command::Watch => commands::watch(&runtime, &config).await,
        Command::List { limit, json } => commands::list(engine, limit, json).await,
        Command::Show { id, chunk_chars } => commands::show(engine, &id, chunk_chars).await,
        Command::Stats { json } => commands::stats(engine, json).await,
        Command::Clear => commands::clear(engine).await,
        Command::Copy { id } => commands::copy(engine, &id).await,
    };

    engine.flush().await;
    result
}
