//! Two-step bulk action workflow
//!
//! The form an operator works through is modelled as an explicit, serializable
//! [`WorkflowState`] value. Each submission is applied by
//! [`WorkflowController::advance`], which takes the current state by reference
//! and returns the next one, so a rejected submission leaves the caller holding
//! the state it started from.
//!
//! ```text
//!             Apply(configurable)             Configure(valid)
//! Selecting ─────────────────────► Configuring ──────────────► Executed
//!     │      ◄─────────────────────     │ ▲
//!     │              Back               └─┘ Configure(invalid)
//!     │
//!     └──────────── Apply(not configurable) ─────────────────► Executed
//! ```
//!
//! Going back from the configuration step keeps the selection (ticked tokens
//! and the all-pages flag) and the chosen action; configuration input is
//! discarded.

pub mod error;

pub use error::WorkflowError;

use crate::actions::{ActionError, ActionFilter, ActionRegistry, RegisteredAction};
use crate::codec::RowIdentifier;
use crate::executor::{ExecutionOutcome, Executor};
use crate::form::{ConfigData, FormSpec, ValidationErrors};
use crate::query::ResultQuery;
use crate::selection::{SelectionManager, SelectionSet, SelectionSummary};
use serde::{Deserialize, Serialize};

/// Default number of items listed in a confirmation summary
pub const DEFAULT_SUMMARY_LIMIT: usize = 20;

/// Where a bulk form session currently stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Choosing rows and an action
    Selecting {
        selection: SelectionSet,
        /// Action chosen before going back, pre-selected in the chooser
        action_id: Option<String>,
    },

    /// Filling in the chosen action's configuration form
    ConfiguringAction {
        action_id: String,
        selection: SelectionSet,
        /// Input from the last rejected submission
        config: ConfigData,
        errors: ValidationErrors,
    },

    /// The action ran; terminal
    Executed {
        action_id: String,
        outcome: ExecutionOutcome,
    },
}

impl WorkflowState {
    /// Initial state for a fresh listing selection
    #[must_use]
    pub const fn new(selection: SelectionSet) -> Self {
        Self::Selecting {
            selection,
            action_id: None,
        }
    }

    /// Short name of the current step
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::Selecting { .. } => "selecting",
            Self::ConfiguringAction { .. } => "configuring an action",
            Self::Executed { .. } => "executed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }

    /// Selection carried by the state, absent once executed
    #[must_use]
    pub const fn selection(&self) -> Option<&SelectionSet> {
        match self {
            Self::Selecting { selection, .. } | Self::ConfiguringAction { selection, .. } => {
                Some(selection)
            }
            Self::Executed { .. } => None,
        }
    }

    /// Mutable selection, only while still selecting
    pub fn selection_mut(&mut self) -> Option<&mut SelectionSet> {
        match self {
            Self::Selecting { selection, .. } => Some(selection),
            _ => None,
        }
    }

    #[must_use]
    pub fn action_id(&self) -> Option<&str> {
        match self {
            Self::Selecting { action_id, .. } => action_id.as_deref(),
            Self::ConfiguringAction { action_id, .. } | Self::Executed { action_id, .. } => {
                Some(action_id)
            }
        }
    }

    /// Validation errors to show on the configuration form
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::ConfiguringAction { errors, .. } if !errors.is_valid() => Some(errors),
            _ => None,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&ExecutionOutcome> {
        match self {
            Self::Executed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

/// One operator submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Submission {
    /// "Apply to selected items" with the chosen action
    Apply { action_id: String },
    /// "Execute" on the configuration form
    Configure { input: ConfigData },
    /// "Back" from the configuration form
    Back,
}

impl Submission {
    const fn name(&self) -> &'static str {
        match self {
            Self::Apply { .. } => "apply an action",
            Self::Configure { .. } => "submit configuration",
            Self::Back => "go back",
        }
    }
}

/// Drives [`WorkflowState`] transitions for one listing
pub struct WorkflowController<'a> {
    registry: &'a ActionRegistry,
    query: &'a dyn ResultQuery,
    filter: ActionFilter,
    selection: SelectionManager,
    executor: Executor,
    summary_limit: usize,
}

impl<'a> WorkflowController<'a> {
    /// Controller over `registry`, resolving all-pages selections with `query`
    #[must_use]
    pub fn new(registry: &'a ActionRegistry, query: &'a dyn ResultQuery) -> Self {
        Self {
            registry,
            query,
            filter: ActionFilter::default(),
            selection: SelectionManager::default(),
            executor: Executor::new(),
            summary_limit: DEFAULT_SUMMARY_LIMIT,
        }
    }

    /// Offer only the actions passing `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: ActionFilter) -> Self {
        self.filter = filter.normalized();
        self
    }

    /// Cap all-pages resolution at `max_fetch_size` rows
    #[must_use]
    pub fn with_max_fetch_size(mut self, max_fetch_size: usize) -> Self {
        self.selection = SelectionManager::new(max_fetch_size);
        self
    }

    /// List at most `limit` items in confirmation summaries
    #[must_use]
    pub const fn with_summary_limit(mut self, limit: usize) -> Self {
        self.summary_limit = limit;
        self
    }

    #[must_use]
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    /// Actions the operator can choose from
    #[must_use]
    pub fn available_actions(&self) -> Vec<&'a crate::actions::ActionDescriptor> {
        self.registry.visible(&self.filter)
    }

    /// Confirmation summary for the current selection
    #[must_use]
    pub fn summary(&self, state: &WorkflowState) -> Option<SelectionSummary> {
        state
            .selection()
            .and_then(|s| self.selection.summarize(s, self.summary_limit))
    }

    /// Form to show while configuring
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` outside the configuration
    /// step, `UnknownAction` if the action vanished, or
    /// `ActionNotConfigurable` if the action has no form.
    pub fn config_form(&self, state: &WorkflowState) -> Result<FormSpec, WorkflowError> {
        let WorkflowState::ConfiguringAction { action_id, .. } = state else {
            return Err(WorkflowError::InvalidTransition {
                step: state.step(),
                input: "show a configuration form",
            });
        };
        let action = self.configurable(action_id)?;
        Ok(action.action.build_config_form())
    }

    /// Apply `input` to `state`, returning the next state
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError` if the submission is not valid for the current
    /// step, names an action that is not offered, or if resolving an
    /// all-pages selection fails. Invalid configuration is not an error: the
    /// returned state stays at the configuration step and carries the
    /// validation errors.
    pub fn advance(
        &self,
        state: &WorkflowState,
        input: Submission,
    ) -> Result<WorkflowState, WorkflowError> {
        let next = match (state, input) {
            (WorkflowState::Selecting { selection, .. }, Submission::Apply { action_id }) => {
                self.apply(selection, action_id)?
            }
            (
                WorkflowState::ConfiguringAction {
                    action_id,
                    selection,
                    ..
                },
                Submission::Configure { input },
            ) => self.configure(action_id, selection, input)?,
            (
                WorkflowState::ConfiguringAction {
                    action_id,
                    selection,
                    ..
                },
                Submission::Back,
            ) => WorkflowState::Selecting {
                selection: selection.clone(),
                action_id: Some(action_id.clone()),
            },
            (state, input) => {
                return Err(WorkflowError::InvalidTransition {
                    step: state.step(),
                    input: input.name(),
                });
            }
        };

        tracing::debug!(from = state.step(), to = next.step(), "workflow transition");
        Ok(next)
    }

    fn apply(
        &self,
        selection: &SelectionSet,
        action_id: String,
    ) -> Result<WorkflowState, WorkflowError> {
        let action = self.offered(&action_id)?;

        if action.descriptor.configurable {
            return Ok(WorkflowState::ConfiguringAction {
                action_id,
                selection: selection.clone(),
                config: ConfigData::new(),
                errors: ValidationErrors::new(),
            });
        }

        let outcome = self.run(action, selection, None)?;
        Ok(WorkflowState::Executed { action_id, outcome })
    }

    fn configure(
        &self,
        action_id: &str,
        selection: &SelectionSet,
        input: ConfigData,
    ) -> Result<WorkflowState, WorkflowError> {
        let action = self.configurable(action_id)?;

        let errors = action.action.validate_config(&input);
        if !errors.is_valid() {
            tracing::debug!(action = action_id, errors = %errors, "configuration rejected");
            return Ok(WorkflowState::ConfiguringAction {
                action_id: action_id.to_string(),
                selection: selection.clone(),
                config: input,
                errors,
            });
        }

        let outcome = self.run(action, selection, Some(&input))?;
        Ok(WorkflowState::Executed {
            action_id: action_id.to_string(),
            outcome,
        })
    }

    fn run(
        &self,
        action: RegisteredAction<'_>,
        selection: &SelectionSet,
        config: Option<&ConfigData>,
    ) -> Result<ExecutionOutcome, WorkflowError> {
        let targets: Vec<RowIdentifier> = self.selection.resolve_targets(selection, self.query)?;
        Ok(self.executor.execute(action, &targets, config))
    }

    /// Action `id`, provided the current filter offers it
    fn offered(&self, id: &str) -> Result<RegisteredAction<'a>, WorkflowError> {
        if !self.filter.allows(id) {
            return Err(WorkflowError::UnknownAction(id.to_string()));
        }
        self.registry.lookup(id).map_err(|e| match e {
            ActionError::UnknownAction(id) => WorkflowError::UnknownAction(id),
            other => WorkflowError::UnknownAction(other.to_string()),
        })
    }

    fn configurable(&self, id: &str) -> Result<RegisteredAction<'a>, WorkflowError> {
        let action = self.offered(id)?;
        if !action.descriptor.configurable {
            return Err(WorkflowError::ActionNotConfigurable(id.to_string()));
        }
        Ok(action)
    }
}
