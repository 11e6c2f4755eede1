//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **import**: Load documents from a JSON file into the local store
//! - **list**: Show one page of a listing with the selection token of each row
//! - **actions**: Show the actions offered on listings
//! - **apply**: Run an action on selected rows (or on every page)
//! - **config**: Read and change configuration values
//!
//! # Examples
//!
//! ```
//! use bulkform::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["bulkform", "apply", "--action", "document_delete", "--all-pages"]);
//! assert!(matches!(cli.command, Commands::Apply { all_pages: true, .. }));
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., page_size=50)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., page_size)
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the location of the configuration file
    Path,
}

/// Listing selection shared by commands that run a query
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexArgs {
    /// Only documents of this index
    #[arg(short = 'i', long = "index", value_name = "NAME")]
    pub index: Option<String>,
}

/// Bulk actions over paginated listings
#[derive(Parser, Debug)]
#[command(name = "bulkform")]
#[command(about = "Apply bulk actions to rows of a search listing", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of the default one
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Load documents from a JSON array of hits
    Import {
        /// File holding `[{"_index": .., "_id": .., "_source": {..}}, ..]`
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Store every document under this index, overriding `_index`
        #[arg(short = 'i', long = "index", value_name = "NAME")]
        index: Option<String>,
    },

    /// Show one page of the listing
    #[command(visible_alias = "ls")]
    List {
        /// Page number, starting at 1
        #[arg(short = 'p', long = "page", default_value_t = 1)]
        page: usize,

        #[command(flatten)]
        index_args: IndexArgs,
    },

    /// Show the actions offered on listings
    Actions,

    /// Apply an action to selected rows
    Apply {
        /// Id of the action to run
        #[arg(short = 'a', long = "action", value_name = "ID")]
        action: String,

        /// Selection token of a row (as printed by `list`)
        #[arg(
            short = 't',
            long = "token",
            value_name = "TOKEN",
            num_args = 1..,
            required_unless_present = "all_pages",
            conflicts_with = "all_pages"
        )]
        tokens: Vec<String>,

        /// Select every row of the listing, across all pages
        #[arg(long = "all-pages")]
        all_pages: bool,

        /// Configuration value for the action (can repeat: --set a=1 --set b=2)
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,

        #[command(flatten)]
        index_args: IndexArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Commands {
    /// Zero-based page of a `list` command
    #[must_use]
    pub const fn page_index(&self) -> Option<usize> {
        match self {
            Self::List { page, .. } => Some(page.saturating_sub(1)),
            _ => None,
        }
    }
}
