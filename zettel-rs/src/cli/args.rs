//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zettel")]
#[command(author, version, about = "Task index for a Markdown Zettelkasten vault", long_about = None)]
pub struct Cli {
    /// Path to the vault (overrides ZETTEL_VAULT and config)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Output as JSON (default)
    #[arg(long, global = true, conflicts_with_all = ["yaml", "toml"])]
    pub json: bool,

    /// Output as YAML
    #[arg(long, global = true, conflicts_with_all = ["json", "toml"])]
    pub yaml: bool,

    /// Output as TOML
    #[arg(long, global = true, conflicts_with_all = ["json", "yaml"])]
    pub toml: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else if self.toml {
            OutputFormat::Toml
        } else {
            OutputFormat::Json
        }
    }

    /// Default log filter when `ZETTEL_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks in the vault
    Tasks(TasksArgs),

    /// Count tags listed under `tags:` sections
    Tags(TagsArgs),

    /// Find notes without any [[links]]
    Orphans,

    /// Watch the vault and keep the task index current
    Watch(WatchArgs),

    /// Task index commands
    Index(IndexArgs),
}

/// Which tasks to show by checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TaskSort {
    /// Path, then line
    #[default]
    Path,
    /// Due date, undated last
    Due,
    /// Open before done
    Status,
}

#[derive(clap::Args, Debug, Default)]
pub struct TasksArgs {
    /// Filter by checkbox state
    #[arg(long, value_enum, default_value_t)]
    pub status: StatusFilter,

    /// Filter by owner (case-insensitive)
    #[arg(long)]
    pub owner: Option<String>,

    /// Filter by project (case-insensitive)
    #[arg(long)]
    pub project: Option<String>,

    /// Filter by priority (case-insensitive)
    #[arg(long)]
    pub priority: Option<String>,

    /// Due strictly before DATE (YYYY-MM-DD or today, tomorrow, +3d, ...)
    #[arg(long)]
    pub due_before: Option<String>,

    /// Due strictly after DATE
    #[arg(long)]
    pub due_after: Option<String>,

    /// Only tasks referencing this note via [[...]]
    #[arg(long)]
    pub links_to: Option<String>,

    /// Only tasks in notes whose vault-relative path matches the glob
    #[arg(long)]
    pub glob: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value_t)]
    pub sort: TaskSort,

    /// Print a plain table instead of structured output
    #[arg(long)]
    pub table: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct TagsArgs {
    /// Sum counts per root segment (`project/a` counts toward `project`)
    #[arg(long)]
    pub roots: bool,
}

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Milliseconds to wait for more events before refreshing
    #[arg(long, default_value_t = 200)]
    pub debounce_ms: u64,
}

#[derive(clap::Args, Debug)]
pub struct IndexArgs {
    #[command(subcommand)]
    pub command: IndexCommands,
}

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Build the index and report its status
    Status,

    /// Discard the index and rebuild it from disk
    Rebuild,
}
