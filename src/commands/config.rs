//! Config command - read and change configuration values

use crate::{BulkError, cli::ConfigCommands, config::BulkConfig};
use std::path::Path;

type Result<T> = std::result::Result<T, BulkError>;

/// Execute a config subcommand against the file at `path`
///
/// `get` and `path` print nothing themselves; they return the text for the
/// caller to print. `set` reports the change unless `quiet`.
///
/// # Errors
/// Returns an error for unknown keys, unparsable values, or if saving fails
pub fn execute(
    config: &mut BulkConfig,
    path: &Path,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<Option<String>> {
    match command {
        ConfigCommands::Get { key } => {
            Ok(Some(config.get(key)?))
        }
        ConfigCommands::Set { setting } => {
            let (key, value) = setting.split_once('=').ok_or_else(|| {
                BulkError::InvalidInput(format!("Expected KEY=VALUE, got '{setting}'"))
            })?;
            config.set(key.trim(), value.trim())?;
            config.save_to(path)?;
            if !quiet {
                println!("Set {} = {}", key.trim(), config.get(key.trim())?);
            }
            Ok(None)
        }
        ConfigCommands::Path => {
            Ok(Some(path.display().to_string()))
        }
    }
}
