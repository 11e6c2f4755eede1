//! Output formatting for CLI display
//!
//! Plain strings come back when `quiet` is set so the output can be piped;
//! otherwise rows, actions and outcomes are indented and coloured.

use crate::actions::{ActionDescriptor, ResponseOverride};
use crate::executor::ExecutionOutcome;
use crate::form::ValidationErrors;
use crate::query::ListingRow;
use crate::render::{FieldRenderer, SourceField};
use crate::selection::SelectionSummary;
use colored::Colorize;

/// Format one listing row with its selection token and extra columns
#[must_use]
pub fn listing_row(entry: &ListingRow, columns: &[SourceField], quiet: bool) -> String {
    let identity = format!("{}:{}", entry.row.index, entry.row.id);
    if quiet {
        return format!("{}\t{identity}", entry.token);
    }

    let mut line = format!("  {}  {}", identity.bold(), entry.token.as_str().dimmed());
    for column in columns {
        let value = column.render(&entry.row.source);
        if !value.is_empty() {
            line.push_str(&format!("  {}={}", column.label(), value));
        }
    }
    line
}

/// Format an action in the chooser
#[must_use]
pub fn action_line(action: &ActionDescriptor, quiet: bool) -> String {
    if quiet {
        return action.id.clone();
    }
    let configurable = if action.configurable {
        " (configurable)".dimmed().to_string()
    } else {
        String::new()
    };
    format!("  {}  {}{configurable}", action.id.cyan(), action.label)
}

/// Format the confirmation summary shown before an action runs
#[must_use]
pub fn summary(summary: &SelectionSummary) -> String {
    let mut lines = vec![summary.heading().bold().to_string()];
    lines.extend(summary.items.iter().map(|item| format!("  - {item}")));
    if let Some(trailer) = summary.trailer() {
        lines.push(format!("  {trailer}"));
    }
    lines.join("\n")
}

/// Format configuration validation errors
#[must_use]
pub fn validation_errors(errors: &ValidationErrors) -> String {
    errors
        .errors()
        .iter()
        .map(|e| format!("  {} {}", "✗".red(), e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format what happened after an action ran
#[must_use]
pub fn outcome(outcome: &ExecutionOutcome, quiet: bool) -> Option<String> {
    if !outcome.succeeded {
        let message = outcome.error_message.as_deref().unwrap_or("Action failed");
        return Some(format!("{} {message}", "Error:".red().bold()));
    }

    match &outcome.response {
        Some(ResponseOverride::Redirect {
            location,
            destination,
        }) => Some(match destination {
            Some(destination) => format!("Continue at {location} (then return to {destination})"),
            None => format!("Continue at {location}"),
        }),
        Some(ResponseOverride::Message { text }) => Some(text.clone()),
        None if quiet => None,
        None => outcome
            .status_message
            .as_ref()
            .map(|message| format!("{} {message}", "✓".green())),
    }
}
