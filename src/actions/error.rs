//! Action and registry errors

use crate::form::ValidationErrors;
use thiserror::Error;

/// Errors raised by the registry or by an action while it runs
#[derive(Debug, Error)]
pub enum ActionError {
    /// No action is registered under this id
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// An action is already registered under this id
    #[error("Action already registered: {0}")]
    DuplicateAction(String),

    /// Configuration input was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(ValidationErrors),

    /// The action failed while running; the message is shown as is
    #[error("{0}")]
    Execution(String),

    /// Local document store error
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}
