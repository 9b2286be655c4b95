//! zettel CLI entry point.

use clap::Parser as _;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zettel::cache::TaskIndex;
use zettel::cli::args::{Cli, Commands, IndexCommands};
use zettel::cli::output::Output;
use zettel::cli::{index, orphans, tags, tasks, watch};
use zettel::config::{Config, LOG_ENV};
use zettel::error::{ExitCode as ZettelExitCode, ZettelError};
use zettel::parser::Parser;
use zettel::sys::{Clock, SystemClock};
use zettel::vault::Vault;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(code) => ExitCode::from(code.code() as u8),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Log to stderr, filtered by `ZETTEL_LOG` or else by `-v`/`-q`.
fn init_tracing(cli: &Cli) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(v) if !v.trim().is_empty() => EnvFilter::new(v),
        _ => EnvFilter::new(cli.log_level()),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<ZettelExitCode, ZettelError> {
    // Load config
    let config = Config::load()?;

    // Resolve vault path
    let vault_path = config.resolve_vault_path(cli.vault.as_deref())?;
    let vault = Vault::new(vault_path)?;
    let parser = Parser::new();
    let task_index = TaskIndex::new(vault, parser.clone(), config.index);

    // Create output helper
    let output = Output::new(cli.output_format(), cli.quiet);

    // Dispatch command
    let result = match &cli.command {
        Commands::Tasks(args) => tasks::get_tasks(&task_index, args, SystemClock.today(), &output),
        Commands::Tags(args) => tags::get_tags_vault(task_index.vault(), &parser, args, &output),
        Commands::Orphans => {
            orphans::get_orphans(task_index.vault(), parser.file_system().as_ref(), &output)
        }
        Commands::Watch(args) => watch::watch(&task_index, args, &output),
        Commands::Index(args) => match args.command {
            IndexCommands::Status => index::status(&task_index, &output),
            IndexCommands::Rebuild => index::rebuild(&task_index, &output),
        },
    };

    task_index.close()?;
    result
}
