//! CLI command implementations.

pub mod args;
pub mod output;

pub mod index;
pub mod orphans;
pub mod tags;
pub mod tasks;
pub mod watch;

pub use args::{Cli, Commands};
pub use output::Output;
