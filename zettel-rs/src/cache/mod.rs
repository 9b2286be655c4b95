//! In-memory task index over a vault.
//!
//! The index is built from a full walk on first use and afterwards kept
//! current by re-examining only the paths queued as changed:
//! - a missing path or a non-note file drops that path's tasks
//! - a note is re-parsed and its tasks replaced
//! - a directory triggers a full rebuild
//!
//! Readers get deep-copied [`Snapshot`]s, so they never observe a partially
//! applied update. Task and note ceilings from [`IndexConfig`] are checked
//! before anything is committed.
//!
//! [`IndexConfig`]: crate::config::IndexConfig

mod index;
mod types;

pub use index::{snapshot_of, TaskIndex};
pub use types::{IndexState, IndexStatus, Snapshot, SnapshotSummary};
