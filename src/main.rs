//! bulkform CLI application entry point
//!
//! Imports search hits into a local document store, lists them a page at a
//! time with a selection token per row, and applies bulk actions to the rows
//! an operator selects.
//!
//! # Usage
//!
//! ```bash
//! # Load documents
//! bulkform import hits.json --index articles
//!
//! # Show the second page of a listing
//! bulkform list --page 2 --index articles
//!
//! # Delete two rows by the tokens `list` printed, skipping the confirmation
//! bulkform apply -a document_delete -t "$TOKEN_A" "$TOKEN_B" -y
//!
//! # Set a field on every row of every page
//! bulkform apply -a document_set_field --all-pages --set field=meta.status --set value=archived
//! ```
//!
//! # Configuration
//!
//! Defaults are written on first run to the user's config directory
//! (`~/.config/bulkform/config.toml` on Linux); `--config` points elsewhere.

use bulkform::{
    BulkError,
    cli::{Cli, Commands},
    commands::{self, apply::ApplyRequest},
    config::BulkConfig,
    db::Database,
    logging,
    prompt::DialoguerInput,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

type Result<T> = std::result::Result<T, BulkError>;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the parsed command, returning whether it succeeded
fn run(cli: Cli) -> Result<bool> {
    let config_path = match cli.config {
        Some(path) => path,
        None => BulkConfig::config_path()?,
    };
    let mut config = BulkConfig::load_from(&config_path)?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let quiet = cli.quiet;

    if let Commands::Config { command } = &cli.command {
        if let Some(value) = commands::config(&mut config, &config_path, command, quiet)? {
            println!("{value}");
        }
        return Ok(true);
    }

    let db = Arc::new(open_database(&config.database)?);

    match &cli.command {
        Commands::Import { file, index } => {
            commands::import(&db, file, index.as_deref(), quiet)?;
        }
        Commands::List { index_args, .. } => {
            let page = cli.command.page_index().unwrap_or_default();
            commands::list(&db, &config, page, index_args.index.as_deref(), quiet)?;
        }
        Commands::Actions => {
            let backend = Arc::clone(&db) as Arc<dyn bulkform::actions::DocumentBackend>;
            let registry = commands::build_registry(&backend, &config)?;
            commands::actions(&registry, &config, quiet);
        }
        Commands::Apply {
            action,
            tokens,
            all_pages,
            settings,
            yes,
            index_args,
        } => {
            let request = ApplyRequest {
                action_id: action,
                tokens,
                all_pages: *all_pages,
                settings,
                assume_yes: *yes,
                index: index_args.index.as_deref(),
            };
            let outcome = commands::apply(&db, &config, &request, &DialoguerInput::new(), quiet)?;
            return Ok(outcome.is_none_or(|o| o.succeeded));
        }
        Commands::Config { .. } => {}
    }

    Ok(true)
}

fn open_database(path: &Path) -> Result<Database> {
    tracing::debug!(path = %path.display(), "opening document store");
    Database::open(path).map_err(|e| {
        BulkError::InvalidInput(format!("Cannot open document store at '{}': {e}", path.display()))
    })
}
