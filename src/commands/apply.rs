//! Apply command - run an action on selected rows
//!
//! Walks the workflow the way an operator would on the bulk form: select
//! rows, pick the action, fill in its configuration form if it has one,
//! then execute.

use crate::{
    BulkError,
    actions::DocumentBackend,
    codec::SelectionToken,
    config::BulkConfig,
    db::Database,
    executor::ExecutionOutcome,
    form::{ConfigData, FieldKind, FormSpec, ValidationErrors},
    output,
    prompt::OperatorInput,
    query::Listing,
    selection::SelectionSet,
    workflow::{Submission, WorkflowController, WorkflowError, WorkflowState},
};
use colored::Colorize;
use std::sync::Arc;

type Result<T> = std::result::Result<T, BulkError>;

/// Parsed `apply` arguments
#[derive(Debug, Clone, Default)]
pub struct ApplyRequest<'a> {
    pub action_id: &'a str,
    /// Selection tokens as printed by `list`
    pub tokens: &'a [String],
    pub all_pages: bool,
    /// `key=value` configuration assignments
    pub settings: &'a [String],
    /// Never prompt; fail instead of asking for missing configuration
    pub assume_yes: bool,
    pub index: Option<&'a str>,
}

/// Execute the apply command
///
/// Returns `None` if the operator cancelled before the action ran.
///
/// # Errors
/// Returns an error if the action is not offered, the selection cannot be
/// resolved, configuration is invalid in non-interactive mode, or a prompt fails
pub fn execute(
    db: &Arc<Database>,
    config: &BulkConfig,
    request: &ApplyRequest<'_>,
    input: &dyn OperatorInput,
    quiet: bool,
) -> Result<Option<ExecutionOutcome>> {
    let backend: Arc<dyn DocumentBackend> = Arc::clone(db) as Arc<dyn DocumentBackend>;
    let registry = super::build_registry(&backend, config)?;
    let query = db.query(request.index);

    let listing = Listing::fetch(&query, 0, config.page_size)?;
    let controller = WorkflowController::new(&registry, &query)
        .with_filter(config.actions.clone())
        .with_max_fetch_size(config.max_fetch_size)
        .with_summary_limit(config.page_size);

    let label = controller
        .available_actions()
        .into_iter()
        .find(|a| a.id == request.action_id)
        .map(|a| a.label.clone())
        .ok_or_else(|| WorkflowError::UnknownAction(request.action_id.to_string()))?;

    let mut state = WorkflowState::new(selection_for(&listing, request));

    if !quiet {
        match controller.summary(&state) {
            Some(summary) => println!("{}", output::summary(&summary)),
            None => println!("No items selected."),
        }
    }

    if !request.assume_yes {
        let prompt = format!("Apply {label}?");
        if input.prompt_confirm(&prompt, false)? != Some(true) {
            if !quiet {
                println!("Operation cancelled.");
            }
            return Ok(None);
        }
    }

    let mut submitted = parse_settings(request.settings)?;
    state = controller.advance(
        &state,
        Submission::Apply {
            action_id: request.action_id.to_string(),
        },
    )?;

    while let WorkflowState::ConfiguringAction { errors, .. } = &state {
        if !errors.is_valid() {
            if request.assume_yes {
                return Err(BulkError::InvalidInput(errors.to_string()));
            }
            eprintln!("{}", output::validation_errors(errors));
        } else if request.assume_yes {
            state = controller.advance(&state, Submission::Configure { input: submitted.clone() })?;
            continue;
        }

        let form = controller.config_form(&state)?;
        if !fill_form(&form, errors, &mut submitted, input)? {
            if !quiet {
                println!("Operation cancelled.");
            }
            return Ok(None);
        }
        state = controller.advance(&state, Submission::Configure { input: submitted.clone() })?;
    }

    let Some(outcome) = state.outcome().cloned() else {
        return Err(BulkError::InvalidInput(format!(
            "Workflow stopped while {}",
            state.step()
        )));
    };

    db.flush()?;
    if let Some(message) = output::outcome(&outcome, quiet) {
        if outcome.succeeded {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
    }
    Ok(Some(outcome))
}

fn selection_for(listing: &Listing, request: &ApplyRequest<'_>) -> SelectionSet {
    let mut selection = SelectionSet::for_listing(listing);
    if request.all_pages {
        selection.set_all_pages(true);
    } else {
        for token in request.tokens {
            selection.check(SelectionToken::submitted(token.trim()));
        }
    }
    selection
}

/// Parse `key=value` assignments into configuration input
///
/// # Errors
///
/// Returns `BulkError::InvalidInput` for an assignment without `=`.
pub fn parse_settings(settings: &[String]) -> Result<ConfigData> {
    let mut data = ConfigData::new();
    for setting in settings {
        let (key, value) = ConfigData::parse_assignment(setting).map_err(BulkError::InvalidInput)?;
        data.set(key, value);
    }
    Ok(data)
}

/// Prompt for every field that is missing or was rejected
///
/// Returns `false` if the operator backed out.
fn fill_form(
    form: &FormSpec,
    errors: &ValidationErrors,
    data: &mut ConfigData,
    input: &dyn OperatorInput,
) -> Result<bool> {
    for field in &form.fields {
        let rejected = errors.for_field(&field.name).next().is_some();
        let current = data.get(&field.name).map(str::to_string);
        if current.is_some() && !rejected {
            continue;
        }

        let prompt = match &field.description {
            Some(description) => format!("{} ({})", field.label, description.dimmed()),
            None => field.label.clone(),
        };

        let answer = match field.kind {
            FieldKind::Text => input.prompt_text(&prompt, current.as_deref())?,
            FieldKind::Checkbox => input
                .prompt_confirm(&prompt, data.flag(&field.name))?
                .map(|checked| String::from(if checked { "1" } else { "0" })),
        };

        match answer {
            Some(value) => data.set(field.name.clone(), value),
            None => return Ok(false),
        }
    }
    Ok(true)
}
