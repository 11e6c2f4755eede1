//! Operator input
//!
//! The configuration step and the confirmation before execution ask the
//! operator for input through [`OperatorInput`], so the apply command can be
//! driven by `dialoguer` prompts on a terminal or by scripted answers in tests.

use std::io;

/// Interactive questions the CLI may ask
///
/// `Ok(None)` means the operator backed out of the prompt.
pub trait OperatorInput {
    /// Ask for a line of text
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the terminal cannot be read.
    fn prompt_text(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Ask a yes/no question
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the terminal cannot be read.
    fn prompt_confirm(&self, prompt: &str, default: bool) -> Result<Option<bool>>;
}

/// Result type for operator input
pub type Result<T> = std::result::Result<T, InputError>;

/// Errors that can occur while prompting
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// IO error during input
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input cancelled by the operator
    #[error("Input cancelled by user")]
    Cancelled,
}

/// Terminal prompts using dialoguer
pub struct DialoguerInput {
    theme: dialoguer::theme::ColorfulTheme,
}

impl DialoguerInput {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorInput for DialoguerInput {
    fn prompt_text(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        use dialoguer::Input;

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);

        if let Some(def) = default {
            input = input.default(def.to_string());
        }

        input
            .interact_text()
            .map(Some)
            .map_err(|e| InputError::Io(io::Error::other(e)))
    }

    fn prompt_confirm(&self, prompt: &str, default: bool) -> Result<Option<bool>> {
        use dialoguer::Confirm;

        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(|e| InputError::Io(io::Error::other(e)))
    }
}
