//! Configuration module for bulkform
//!
//! Manages the document store location, listing and re-query sizes, which
//! actions are offered, and the post-delete consistency wait. Configuration
//! is stored in the user's config directory.

use crate::actions::{ActionFilter, ConsistencyPolicy, FilterMode};
use crate::selection::DEFAULT_MAX_FETCH_SIZE;
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted by [`BulkConfig::get`] and [`BulkConfig::set`]
pub const KEYS: &[&str] = &[
    "database",
    "page_size",
    "max_fetch_size",
    "action_title",
    "actions.mode",
    "actions.selected",
    "consistency.max_attempts",
    "consistency.interval_ms",
    "columns",
];

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BulkConfig {
    /// Location of the local document store
    pub database: PathBuf,

    /// Rows per listing page
    pub page_size: usize,

    /// Upper bound on rows fetched when every page is selected
    pub max_fetch_size: usize,

    /// Heading shown above the action chooser
    pub action_title: String,

    /// Which registered actions are offered
    pub actions: ActionFilter,

    /// How long to wait for deletes to become visible
    pub consistency: ConsistencyPolicy,

    /// Dotted source paths shown as listing columns
    pub columns: Vec<String>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            page_size: 20,
            max_fetch_size: DEFAULT_MAX_FETCH_SIZE,
            action_title: "Action".to_string(),
            actions: ActionFilter::default(),
            consistency: ConsistencyPolicy::default(),
            columns: Vec::new(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bulkform")
        .join("index")
}

impl BulkConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("bulkform").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created, or
    /// if the loaded values are out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Reject sizes the workflow cannot run with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Message("page_size must be greater than zero".to_string()));
        }
        if self.max_fetch_size == 0 {
            return Err(ConfigError::Message(
                "max_fetch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Current value of `key` as text
    ///
    /// List values are comma separated.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown key.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        Ok(match key {
            "database" => self.database.display().to_string(),
            "page_size" => self.page_size.to_string(),
            "max_fetch_size" => self.max_fetch_size.to_string(),
            "action_title" => self.action_title.clone(),
            "actions.mode" => match self.actions.mode {
                FilterMode::Include => "include".to_string(),
                FilterMode::Exclude => "exclude".to_string(),
            },
            "actions.selected" => join_list(self.actions.selected.iter()),
            "consistency.max_attempts" => self.consistency.max_attempts.to_string(),
            "consistency.interval_ms" => self.consistency.interval_ms.to_string(),
            "columns" => join_list(self.columns.iter()),
            other => return Err(unknown_key(other)),
        })
    }

    /// Set `key` from text
    ///
    /// List values are comma separated; an empty value clears the list.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown key or a value that doesn't parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "database" => self.database = PathBuf::from(value),
            "page_size" => self.page_size = parse_number(key, value)?,
            "max_fetch_size" => self.max_fetch_size = parse_number(key, value)?,
            "action_title" => self.action_title = value.to_string(),
            "actions.mode" => {
                self.actions.mode = match value.trim().to_lowercase().as_str() {
                    "include" => FilterMode::Include,
                    "exclude" => FilterMode::Exclude,
                    _ => {
                        return Err(ConfigError::Message(format!(
                            "actions.mode must be 'include' or 'exclude', got '{value}'"
                        )));
                    }
                };
            }
            "actions.selected" => self.actions.selected = split_list(value).collect(),
            "consistency.max_attempts" => self.consistency.max_attempts = parse_number(key, value)?,
            "consistency.interval_ms" => self.consistency.interval_ms = parse_number(key, value)?,
            "columns" => self.columns = split_list(value).collect(),
            other => return Err(unknown_key(other)),
        }
        self.validate()
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::Message(format!(
        "Unknown config key '{key}' (expected one of: {})",
        KEYS.join(", ")
    ))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Message(format!("Invalid value for {key}: {e}")))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn join_list<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(",")
}
