//! zettel - a task index for Markdown Zettelkasten vaults.
//!
//! # Overview
//!
//! zettel reads a directory of Markdown notes and keeps an in-memory index
//! of every checkbox task in it:
//! - Task extraction with `@key(value)` metadata (due, scheduled, priority,
//!   owner, project) and `[[Backlink]]` references
//! - Tag counting for `tags:` sections
//! - Lazy, incremental index updates driven by queued changed paths
//! - Immutable snapshots that never expose a half-applied update
//!
//! # Example
//!
//! ```no_run
//! use zettel::cache::TaskIndex;
//! use zettel::config::IndexConfig;
//!
//! let index = TaskIndex::open("/path/to/vault", IndexConfig::default()).unwrap();
//!
//! // First snapshot walks the whole vault
//! let snapshot = index.acquire_snapshot().unwrap();
//! for task in snapshot.tasks() {
//!     println!("{}:{} {}", task.path.display(), task.line, task.content);
//! }
//!
//! // After an edit, queue the note; the next snapshot re-reads only it
//! index.queue_update("inbox.md");
//! let snapshot = index.acquire_snapshot().unwrap();
//! println!("{} open", snapshot.counts().open);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod sys;
pub mod types;
pub mod vault;

// Re-export main types at crate root
pub use cache::{Snapshot, TaskIndex};
pub use config::Config;
pub use error::{Result, ZettelError};
pub use types::*;
pub use vault::Vault;
