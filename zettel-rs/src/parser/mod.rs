//! Parsers for vault Markdown: tasks, tag sections and backlinks.

pub mod block;
pub mod document;
pub mod tag;
pub mod task;
pub mod wikilink;

pub use block::{scan_blocks, BlockEvent, ListItem};
pub use document::{ParseOutput, Parser};
pub use tag::TagCounts;
pub use task::{extract_metadata, parse_date, parse_task_item, recognize_task, tokenize, MetadataToken};
pub use wikilink::{find_backlinks, has_note_links, Backlink};
