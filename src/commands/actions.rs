//! Actions command - show the actions offered on listings

use crate::{
    actions::{ActionDescriptor, ActionRegistry},
    config::BulkConfig,
    output,
};
use colored::Colorize;

/// Execute the actions command, returning the actions shown
pub fn execute<'a>(
    registry: &'a ActionRegistry,
    config: &BulkConfig,
    quiet: bool,
) -> Vec<&'a ActionDescriptor> {
    let visible = registry.visible(&config.actions.clone().normalized());

    if visible.is_empty() {
        if !quiet {
            println!("No actions are offered with the current filter.");
        }
        return visible;
    }

    if !quiet {
        println!("{}:", config.action_title.bold());
    }
    for action in &visible {
        println!("{}", output::action_line(action, quiet));
    }
    visible
}
