//! Set one source field to the same value on every target

use super::{Action, ActionError, DocumentBackend, ResponseOverride};
use crate::codec::RowIdentifier;
use crate::form::{ConfigData, FormField, FormSpec, ValidationErrors};
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Registry id of the set-field action
pub const SET_FIELD_ACTION_ID: &str = "document_set_field";

const FIELD: &str = "field";
const VALUE: &str = "value";

/// Dotted path of plain identifiers, e.g. `meta.status`
const FIELD_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)*$";

/// Writes a text value into a dotted source path of each target document
pub struct SetFieldAction {
    backend: Arc<dyn DocumentBackend>,
}

impl SetFieldAction {
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }
}

impl Action for SetFieldAction {
    fn label(&self) -> String {
        "Set field value".to_string()
    }

    fn is_configurable(&self) -> bool {
        true
    }

    fn build_config_form(&self) -> FormSpec {
        FormSpec::new()
            .field(
                FormField::text(FIELD, "Field")
                    .required()
                    .describe("Dotted path in the document source, e.g. meta.status"),
            )
            .field(FormField::text(VALUE, "Value").required())
    }

    fn validate_config(&self, input: &ConfigData) -> ValidationErrors {
        let mut errors = self.build_config_form().check_required(input);

        if let Some(field) = input.get(FIELD).map(str::trim).filter(|f| !f.is_empty()) {
            match Regex::new(FIELD_PATTERN) {
                Ok(re) if re.is_match(field) => {}
                Ok(_) => errors.add(FIELD, format!("'{field}' is not a valid field path.")),
                Err(e) => errors.add(FIELD, format!("Cannot check field path: {e}")),
            }
        }

        errors
    }

    fn apply_config(&self, input: &ConfigData) -> Result<ConfigData, ActionError> {
        let errors = self.validate_config(input);
        if !errors.is_valid() {
            return Err(ActionError::InvalidConfig(errors));
        }

        let mut applied = ConfigData::new();
        for (name, value) in input.iter() {
            let value = if name == FIELD { value.trim() } else { value };
            applied.set(name, value);
        }
        Ok(applied)
    }

    fn execute(
        &self,
        targets: &[RowIdentifier],
        config: &ConfigData,
    ) -> Result<Option<ResponseOverride>, ActionError> {
        let (Some(field), Some(value)) = (config.get(FIELD), config.get(VALUE)) else {
            return Err(ActionError::Execution(
                "Set field value needs both a field and a value".to_string(),
            ));
        };

        let mut updated = 0;
        for row in targets {
            if self
                .backend
                .set_field(row, field, Value::String(value.to_string()))?
            {
                updated += 1;
            } else {
                tracing::debug!(%row, "document missing, field not set");
            }
        }

        tracing::info!(field, updated, requested = targets.len(), "set field batch finished");
        Ok(None)
    }
}
