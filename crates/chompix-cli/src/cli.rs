use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "chompix")]
#[command(about = "Keep a food diary from the command line, offline or not")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Quick capture: chompix "ate two eggs"
    #[arg(trailing_var_arg = true)]
    pub entry: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new diary entry
    #[command(alias = "new")]
    Add {
        /// Entry text
        text: Vec<String>,
        /// Attach a photo file (stored base64-encoded)
        #[arg(long, value_name = "PATH")]
        photo: Option<PathBuf>,
        /// Override the creation timestamp (ISO-8601)
        #[arg(long, value_name = "ISO8601")]
        at: Option<String>,
        /// When the meal happened (ISO-8601, defaults to the timestamp)
        #[arg(long, value_name = "ISO8601")]
        event_at: Option<String>,
    },
    /// List diary entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries not yet uploaded
        #[arg(long)]
        unsynced: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry locally and, best effort, on the server
    Delete {
        /// Entry ID
        id: String,
    },
    /// Push unsynced entries and pull the server's entry list
    Sync,
    /// Manage the offline response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Export entries
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Precache the configured manifest and activate it
    Warm,
    /// Fetch a URL through the offline cache
    Fetch {
        /// Absolute or site-relative URL
        url: String,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
