//! Runs a chosen action against resolved targets
//!
//! The executor hands the whole target list to the action in one call; batching
//! belongs to the action. Whatever the action raises is caught here and turned
//! into a single message on the [`ExecutionOutcome`]. There is no per-item
//! accounting: if an action fails halfway, the outcome still reports the full
//! target count, `succeeded == false`, and the one error message.

use crate::actions::{ActionError, RegisteredAction, ResponseOverride};
use crate::codec::RowIdentifier;
use crate::form::ConfigData;
use serde::{Deserialize, Serialize};

/// Result summary of applying an action to a target list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Number of items the action was applied to
    pub target_count: usize,
    pub succeeded: bool,
    /// Failure reported by the action
    pub error_message: Option<String>,
    /// Status line for the operator, absent for empty selections
    pub status_message: Option<String>,
    /// Where to send the operator instead of the listing
    pub response: Option<ResponseOverride>,
}

impl ExecutionOutcome {
    fn failed(target_count: usize, error: &ActionError) -> Self {
        Self {
            target_count,
            succeeded: false,
            error_message: Some(error.to_string()),
            status_message: None,
            response: None,
        }
    }
}

/// "Action Delete was applied to 3 items."
#[must_use]
pub fn applied_message(label: &str, count: usize) -> String {
    if count == 1 {
        format!("Action {label} was applied to 1 item.")
    } else {
        format!("Action {label} was applied to {count} items.")
    }
}

/// Invokes actions and reports the outcome
#[derive(Debug, Clone, Default)]
pub struct Executor {
    /// Listing location passed along on confirm-route redirects
    destination: Option<String>,
}

impl Executor {
    #[must_use]
    pub const fn new() -> Self {
        Self { destination: None }
    }

    /// Return to `destination` after a confirm-route redirect
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Apply `action` to `targets`
    ///
    /// `config` is the input from the configuration step, if there was one.
    /// It goes through the action's `apply_config` before execution.
    #[must_use]
    pub fn execute(
        &self,
        action: RegisteredAction<'_>,
        targets: &[RowIdentifier],
        config: Option<&ConfigData>,
    ) -> ExecutionOutcome {
        let descriptor = action.descriptor;
        let target_count = targets.len();

        let applied = match config {
            Some(input) => match action.action.apply_config(input) {
                Ok(applied) => applied,
                Err(e) => {
                    tracing::warn!(action = %descriptor.id, error = %e, "configuration rejected");
                    return ExecutionOutcome::failed(target_count, &e);
                }
            },
            None => ConfigData::new(),
        };

        tracing::info!(action = %descriptor.id, targets = target_count, "executing action");

        let result = match action.action.execute(targets, &applied) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(action = %descriptor.id, error = %e, "action failed");
                return ExecutionOutcome::failed(target_count, &e);
            }
        };

        let mut outcome = ExecutionOutcome {
            target_count,
            succeeded: true,
            error_message: None,
            status_message: None,
            response: None,
        };

        if let Some(response) = result {
            outcome.response = Some(response);
        } else if let Some(route) = &descriptor.confirm_route {
            outcome.response = Some(ResponseOverride::Redirect {
                location: route.clone(),
                destination: self.destination.clone(),
            });
        } else if target_count > 0 {
            outcome.status_message = Some(applied_message(&descriptor.label, target_count));
        }

        outcome
    }
}
