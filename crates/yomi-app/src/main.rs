use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use yomi_config::Config;

pub mod commands;
pub mod state;

#[cfg(test)]
mod tests;

use self::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "yomi")]
#[command(about = "Offline Japanese dictionary over Yomitan archives")]
struct Cli {
    /// Database file (overrides config and YOMI_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a Yomitan dictionary archive
    Import { archive: PathBuf },
    /// Look up a word, trying every form it could be inflected from
    Search { text: String },
    /// Find the longest word at the start of a sentence
    Scan { text: String },
    /// Show the candidate dictionary forms of a word
    Deinflect { text: String },
    /// List imported dictionaries
    List,
    /// Delete a dictionary and everything imported with it
    Delete { id: i64 },
    /// Include a dictionary in lookups
    Enable { id: i64 },
    /// Exclude a dictionary from lookups
    Disable { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };
    if let Some(db) = cli.db {
        config.store.db_path = db;
    }

    init_tracing(&config, cli.debug);

    let state = Arc::new(
        AppState::new(config).context("Failed to open dictionary store")?,
    );

    run(state, cli.command).await
}

fn init_tracing(config: &Config, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(state: Arc<AppState>, command: Command) -> Result<()> {
    match command {
        Command::Import { archive } => {
            let cancel = CancellationToken::new();

            // Ctrl+C rolls the import back instead of killing the process
            let watcher = tokio::spawn({
                let cancel = cancel.clone();
                async move {
                    if signal::ctrl_c().await.is_ok() {
                        tracing::warn!("Interrupted, cancelling import");
                        cancel.cancel();
                    }
                }
            });

            let result = commands::import::import_archive(&state, archive, cancel).await;
            watcher.abort();

            let dictionary = result?;
            println!(
                "Imported '{}' (revision {}) as dictionary {}",
                dictionary.title, dictionary.revision, dictionary.id
            );
        }
        Command::Search { text } => {
            let output = commands::search::search(&state, &text)?;
            print!("{output}");
        }
        Command::Scan { text } => {
            let output = commands::search::scan(&state, &text)?;
            print!("{output}");
        }
        Command::Deinflect { text } => {
            print!("{}", commands::search::deinflect(&state, &text));
        }
        Command::List => {
            print!("{}", commands::manage::list(&state)?);
        }
        Command::Delete { id } => {
            commands::manage::delete(&state, id)?;
            println!("Deleted dictionary {id}");
        }
        Command::Enable { id } => {
            commands::manage::set_enabled(&state, id, true)?;
            println!("Enabled dictionary {id}");
        }
        Command::Disable { id } => {
            commands::manage::set_enabled(&state, id, false)?;
            println!("Disabled dictionary {id}");
        }
    }

    Ok(())
}
