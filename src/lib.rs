pub mod capture;
pub mod catalog;
pub mod collection;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod identify;
pub mod orchestrator;
pub mod session;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

pub use catalog::{BookCatalog, BookRecord, GoogleBooksClient};
pub use collection::{AddOutcome, Collection};
pub use config::Config;
pub use error::{Result, ScoutError};
pub use identify::{parse_book_response, BookIdentifier, GeminiClient, IdentifiedInfo};
pub use orchestrator::{identify_book, IdentifyOutcome};
pub use session::{IdentifyState, Session};

#[derive(Parser)]
#[command(name = "bookscout")]
#[command(about = "Identify books from cover photos and keep a collection")]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true, env = "BOOKSCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify a book from a cover image
    Identify {
        /// Cover image file (JPEG, PNG, WebP, ...)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        /// Add the found book to the collection
        #[arg(long)]
        save: bool,
    },
    /// Free-text search of the book catalog
    Search {
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Manage the saved collection
    #[command(subcommand)]
    Collection(CollectionCommands),
    /// Report configuration and storage status as JSON
    Health,
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// List saved books
    List,
    /// Show one saved book
    Show { id: String },
    /// Remove a saved book
    Remove { id: String },
}

pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let success = match cli.command {
        Commands::Identify { image, save } => {
            let state = commands::identify::run(&config, &image, save, &mut out).await?;
            state != IdentifyState::Failed
        }
        Commands::Search { query } => {
            commands::search::run(&config, &query.join(" "), &mut out).await?;
            true
        }
        Commands::Collection(CollectionCommands::List) => {
            commands::collection::list(&config, &mut out)?;
            true
        }
        Commands::Collection(CollectionCommands::Show { id }) => {
            commands::collection::show(&config, &id, &mut out)?;
            true
        }
        Commands::Collection(CollectionCommands::Remove { id }) => {
            commands::collection::remove(&config, &id, &mut out)?;
            true
        }
        Commands::Health => commands::health::run(&config, &mut out)?,
    };

    out.flush()?;
    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_identify_with_save() {
        let cli = Cli::try_parse_from(["bookscout", "identify", "cover.jpg", "--save"]).unwrap();
        match cli.command {
            Commands::Identify { image, save } => {
                assert_eq!(image, PathBuf::from("cover.jpg"));
                assert!(save);
            }
            _ => panic!("expected identify"),
        }
    }

    #[test]
    fn test_parse_multi_word_search() {
        let cli = Cli::try_parse_from(["bookscout", "search", "good", "omens"]).unwrap();
        match cli.command {
            Commands::Search { query } => assert_eq!(query.join(" "), "good omens"),
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_collection_remove() {
        let cli = Cli::try_parse_from(["bookscout", "collection", "remove", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Collection(CollectionCommands::Remove { ref id }) if id == "abc"
        ));
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["bookscout", "search"]).is_err());
    }
}
