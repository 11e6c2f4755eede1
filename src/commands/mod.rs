//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and runs the operation against the local document store.

pub mod actions;
pub mod apply;
pub mod config;
pub mod import;
pub mod list;

// Re-export execute functions for convenience
pub use actions::execute as actions;
pub use apply::execute as apply;
pub use config::execute as config;
pub use import::execute as import;
pub use list::execute as list;

use crate::BulkError;
use crate::actions::{
    ActionRegistry, DELETE_ACTION_ID, DeleteAction, DocumentBackend, SET_FIELD_ACTION_ID,
    SetFieldAction,
};
use crate::config::BulkConfig;
use std::sync::Arc;

/// Registry of the built-in actions, bound to `backend`
///
/// # Errors
///
/// Returns `BulkError::ActionError` if an id is registered twice.
pub fn build_registry(
    backend: &Arc<dyn DocumentBackend>,
    config: &BulkConfig,
) -> Result<ActionRegistry, BulkError> {
    let mut registry = ActionRegistry::new();
    registry
        .register(
            DELETE_ACTION_ID,
            DeleteAction::new(Arc::clone(backend)).with_consistency(config.consistency),
        )?
        .register(SET_FIELD_ACTION_ID, SetFieldAction::new(Arc::clone(backend)))?;
    Ok(registry)
}
