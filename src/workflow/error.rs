//! Workflow transition errors

use thiserror::Error;

/// Reasons a submission cannot advance the workflow
///
/// The state the submission was applied to is left untouched, so the caller
/// can redisplay it.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The chosen action is not offered on this listing
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A configuration step was requested for an action without one
    #[error("Action '{0}' has no configuration step")]
    ActionNotConfigurable(String),

    /// The submission does not apply to the current step
    #[error("Cannot {input} while {step}")]
    InvalidTransition {
        step: &'static str,
        input: &'static str,
    },

    /// Resolving the targets required a backend call that failed
    #[error("Could not resolve selection: {0}")]
    Query(#[from] crate::query::QueryError),
}
