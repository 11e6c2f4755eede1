//! Bulk actions and the registry they are chosen from
//!
//! An [`Action`] is the capability a bulk operation needs: a label, an optional
//! configuration form, and an entry point that receives the whole target list.
//! Actions are registered by id in an [`ActionRegistry`] that is built once per
//! session and handed to the workflow, so sessions never share mutable state.
//!
//! # Visibility
//!
//! Which registered actions an operator may pick is controlled by an
//! [`ActionFilter`]: `include` keeps only the selected ids, `exclude` drops
//! them. The default (`exclude` with nothing selected) shows everything.

pub mod backend;
pub mod delete;
pub mod error;
pub mod set_field;

pub use backend::{ConsistencyPolicy, DocumentBackend, set_source_path};
pub use delete::{DELETE_ACTION_ID, DeleteAction};
pub use error::ActionError;
pub use set_field::{SET_FIELD_ACTION_ID, SetFieldAction};

use crate::codec::RowIdentifier;
use crate::form::{ConfigData, FormSpec, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What the caller should do instead of returning to the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseOverride {
    /// Send the operator to another location
    Redirect {
        location: String,
        /// Where to come back to afterwards
        destination: Option<String>,
    },
    /// Show this text in place of the listing
    Message { text: String },
}

/// Operation applicable to a list of documents
pub trait Action: Send + Sync {
    /// Human readable name
    fn label(&self) -> String;

    /// Whether a configuration step precedes execution
    fn is_configurable(&self) -> bool {
        false
    }

    /// Inputs the configuration step asks for
    fn build_config_form(&self) -> FormSpec {
        FormSpec::new()
    }

    /// Validate configuration input, returning an empty set when valid
    fn validate_config(&self, input: &ConfigData) -> ValidationErrors {
        self.build_config_form().check_required(input)
    }

    /// Turn validated input into the configuration `execute` receives
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidConfig` if the input cannot be applied.
    fn apply_config(&self, input: &ConfigData) -> Result<ConfigData, ActionError> {
        Ok(input.clone())
    }

    /// Apply the action to every target
    ///
    /// # Errors
    ///
    /// Any error aborts the batch; the executor reports it as one message.
    fn execute(
        &self,
        targets: &[RowIdentifier],
        config: &ConfigData,
    ) -> Result<Option<ResponseOverride>, ActionError>;
}

/// Registered action as shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub id: String,
    pub label: String,
    pub configurable: bool,
    /// Route to redirect to after a successful run, if any
    pub confirm_route: Option<String>,
}

/// A descriptor paired with its implementation
#[derive(Clone, Copy)]
pub struct RegisteredAction<'a> {
    pub descriptor: &'a ActionDescriptor,
    pub action: &'a dyn Action,
}

impl fmt::Debug for RegisteredAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("descriptor", self.descriptor)
            .finish_non_exhaustive()
    }
}

/// How [`ActionFilter::selected`] is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Only the selected actions
    Include,
    /// All actions except the selected ones
    #[default]
    Exclude,
}

/// Which registered actions are offered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFilter {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub selected: BTreeSet<String>,
}

impl ActionFilter {
    #[must_use]
    pub fn include<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Include,
            selected: ids.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn exclude<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Exclude,
            selected: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Drop blank ids left over from unticked option checkboxes
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.selected.retain(|id| !id.trim().is_empty());
        self
    }

    /// Whether the action `id` passes this filter
    #[must_use]
    pub fn allows(&self, id: &str) -> bool {
        let in_selected = self.selected.contains(id);
        match self.mode {
            FilterMode::Include => in_selected,
            FilterMode::Exclude => !in_selected,
        }
    }
}

struct Entry {
    descriptor: ActionDescriptor,
    action: Box<dyn Action>,
}

/// Ordered table of the actions applicable to a listing
#[derive(Default)]
pub struct ActionRegistry {
    entries: Vec<Entry>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `id`
    ///
    /// # Errors
    ///
    /// Returns `ActionError::DuplicateAction` if `id` is taken.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        action: impl Action + 'static,
    ) -> Result<&mut Self, ActionError> {
        self.register_boxed(id.into(), Box::new(action), None)
    }

    /// Register an action that redirects to `confirm_route` after running
    ///
    /// # Errors
    ///
    /// Returns `ActionError::DuplicateAction` if `id` is taken.
    pub fn register_with_confirm_route(
        &mut self,
        id: impl Into<String>,
        action: impl Action + 'static,
        confirm_route: impl Into<String>,
    ) -> Result<&mut Self, ActionError> {
        self.register_boxed(id.into(), Box::new(action), Some(confirm_route.into()))
    }

    fn register_boxed(
        &mut self,
        id: String,
        action: Box<dyn Action>,
        confirm_route: Option<String>,
    ) -> Result<&mut Self, ActionError> {
        if self.entries.iter().any(|e| e.descriptor.id == id) {
            return Err(ActionError::DuplicateAction(id));
        }

        let descriptor = ActionDescriptor {
            label: action.label(),
            configurable: action.is_configurable(),
            id,
            confirm_route,
        };
        tracing::debug!(id = %descriptor.id, label = %descriptor.label, "registered action");
        self.entries.push(Entry { descriptor, action });
        Ok(self)
    }

    /// Actions offered under `filter`, in registration order
    #[must_use]
    pub fn visible(&self, filter: &ActionFilter) -> Vec<&ActionDescriptor> {
        self.entries
            .iter()
            .map(|e| &e.descriptor)
            .filter(|d| filter.allows(&d.id))
            .collect()
    }

    /// Every registered action, ignoring any filter
    #[must_use]
    pub fn all(&self) -> Vec<&ActionDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Look up a descriptor by id
    ///
    /// # Errors
    ///
    /// Returns `ActionError::UnknownAction` if nothing is registered under `id`.
    pub fn get(&self, id: &str) -> Result<&ActionDescriptor, ActionError> {
        self.lookup(id).map(|r| r.descriptor)
    }

    /// Look up a descriptor together with its implementation
    ///
    /// # Errors
    ///
    /// Returns `ActionError::UnknownAction` if nothing is registered under `id`.
    pub fn lookup(&self, id: &str) -> Result<RegisteredAction<'_>, ActionError> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| RegisteredAction {
                descriptor: &e.descriptor,
                action: e.action.as_ref(),
            })
            .ok_or_else(|| ActionError::UnknownAction(id.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
