use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cs_app::usecases::DEFAULT_CHUNK_CHARS;

/// Clipboard history for the command line.
#[derive(Debug, Parser)]
#[command(name = "clipstack", version, about)]
pub struct Cli {
    /// Config file (default: <config dir>/clipstack/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record clipboard changes until interrupted
    Watch,
    /// List history items, most recent first
    List {
        /// Show at most this many items
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Print the text of one item
    Show {
        /// Item id or a unique prefix of it
        id: String,
        /// Characters fetched per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_CHARS)]
        chunk_chars: usize,
    },
    /// Memory and storage statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Delete the whole history
    Clear,
    /// Put an item back on the system clipboard
    Copy {
        /// Item id or a unique prefix of it
        id: String,
    },
}
