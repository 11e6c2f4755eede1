//! Delete documents from the search backend

use super::{Action, ActionError, ConsistencyPolicy, DocumentBackend, ResponseOverride};
use crate::codec::RowIdentifier;
use crate::form::{ConfigData, FormField, FormSpec};
use std::sync::Arc;

/// Registry id of the delete action
pub const DELETE_ACTION_ID: &str = "document_delete";

const CONFIRM_FIELD: &str = "confirm";

/// Deletes every target document, then waits for the deletes to show
///
/// After the batch the backend is polled under a [`ConsistencyPolicy`] until
/// the deleted documents disappear. If some are still visible when the policy
/// runs out, the action still succeeds: the listing may show them for a short
/// while longer.
pub struct DeleteAction {
    backend: Arc<dyn DocumentBackend>,
    consistency: ConsistencyPolicy,
    require_confirmation: bool,
}

impl DeleteAction {
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            consistency: ConsistencyPolicy::default(),
            require_confirmation: false,
        }
    }

    #[must_use]
    pub fn with_consistency(mut self, consistency: ConsistencyPolicy) -> Self {
        self.consistency = consistency;
        self
    }

    /// Ask the operator to tick a confirmation box before deleting
    #[must_use]
    pub fn with_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }
}

impl Action for DeleteAction {
    fn label(&self) -> String {
        "Delete".to_string()
    }

    fn is_configurable(&self) -> bool {
        self.require_confirmation
    }

    fn build_config_form(&self) -> FormSpec {
        if !self.require_confirmation {
            return FormSpec::new();
        }
        FormSpec::new().field(
            FormField::checkbox(CONFIRM_FIELD, "Delete the selected documents")
                .required()
                .describe("This cannot be undone."),
        )
    }

    fn execute(
        &self,
        targets: &[RowIdentifier],
        config: &ConfigData,
    ) -> Result<Option<ResponseOverride>, ActionError> {
        if self.require_confirmation && !config.flag(CONFIRM_FIELD) {
            return Err(ActionError::Execution(
                "Deletion was not confirmed".to_string(),
            ));
        }

        let mut deleted = Vec::with_capacity(targets.len());
        for row in targets {
            if self.backend.delete(row)? {
                deleted.push(row.clone());
            } else {
                tracing::debug!(%row, "document already absent");
            }
        }

        tracing::info!(
            requested = targets.len(),
            deleted = deleted.len(),
            "delete batch finished"
        );

        let lingering = self
            .consistency
            .wait_until_gone(self.backend.as_ref(), &deleted)?;
        if !lingering.is_empty() {
            tracing::warn!(
                count = lingering.len(),
                attempts = self.consistency.max_attempts,
                "deleted documents still visible after consistency wait"
            );
        }

        Ok(None)
    }
}
