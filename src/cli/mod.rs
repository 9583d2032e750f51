//! CLI interface for supersearch.
//!
//! Provides command-line argument parsing using clap.

use clap::{Parser, Subcommand};

/// Command-line interface for supersearch.
#[derive(Parser)]
#[command(name = "supersearch")]
#[command(author, version, about = "Site search index builder and suggestion engine", long_about = None)]
pub struct Cli {
    /// Log progress to stderr (same as SUPERSEARCH_LOG=info).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the search snapshot from a content export.
    Index {
        /// Content export directory containing content.json.
        #[arg(short, long)]
        source: Option<String>,

        /// Snapshot file to write.
        #[arg(short, long)]
        output: Option<String>,

        /// Comma-separated post types to include (e.g., "post,page").
        #[arg(short = 'T', long)]
        types: Option<String>,
    },

    /// Suggest documents matching a partial query.
    Search {
        /// The partial query string.
        query: String,

        /// Maximum number of suggestions to return.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Snapshot file path or http(s) URL.
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// List every document in the snapshot.
    List {
        /// Snapshot file path or http(s) URL.
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// Interactive search box: each line typed is the new input value.
    ///
    /// Commands: `:open`, `:close`, `:toggle`, `:N` to select the N-th
    /// suggestion, `:quit`.
    Shell {
        /// Maximum number of suggestions shown.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Snapshot file path or http(s) URL.
        #[arg(short, long)]
        snapshot: Option<String>,
    },
}
