//! Bulkform - bulk actions over paginated search listings
//!
//! An operator ticks rows on a listing page (or selects every page at once),
//! picks an action, fills in the action's configuration form if it has one,
//! and the action runs against every selected document.
//!
//! - [`codec`]: opaque selection tokens identifying a row by index and id
//! - [`query`]: the re-executable result query and listing pages
//! - [`selection`]: ticked rows, the all-pages flag, and target resolution
//! - [`actions`]: the action trait, the registry, and built-in actions
//! - [`workflow`]: the two-step selection → configuration → execution flow
//! - [`executor`]: runs an action and reports a single outcome
//! - [`db`]: a sled-backed local document store implementing the query and
//!   document interfaces

use thiserror::Error;

pub mod actions;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod db;
pub mod executor;
pub mod form;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod query;
pub mod render;
pub mod selection;
pub mod workflow;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum BulkError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Listing query error
    #[error("Query error: {0}")]
    QueryError(#[from] query::QueryError),
    /// Selection token error
    #[error("Invalid selection token: {0}")]
    CodecError(#[from] codec::CodecError),
    /// Action registry or execution error
    #[error("Action error: {0}")]
    ActionError(#[from] actions::ActionError),
    /// Workflow transition error
    #[error("{0}")]
    WorkflowError(#[from] workflow::WorkflowError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Prompting the operator failed
    #[error("Input error: {0}")]
    InputError(#[from] prompt::InputError),
    /// Malformed JSON input
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
