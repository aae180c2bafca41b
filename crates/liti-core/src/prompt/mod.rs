//! Interactive prompt abstraction
//!
//! The workflow asks every question and reports every user-facing message
//! through [`Prompter`], so the same pipeline runs against the cliclack
//! terminal UI or a scripted prompter in tests.

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;

/// Pure input validator: `Ok` carries the accepted (possibly normalized)
/// value, `Err` carries the message shown before re-prompting.
pub type Validator = fn(&str) -> Result<String, String>;

/// One choice of a single-select question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Value returned when selected
    pub value: String,
    /// Label shown to the user
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Single-select question
#[derive(Debug, Clone)]
pub struct SelectQuestion {
    pub message: String,
    pub choices: Vec<Choice>,
    /// Value of the initially highlighted choice
    pub default: Option<String>,
}

/// Free-text question
#[derive(Debug, Clone)]
pub struct InputQuestion {
    pub message: String,
    pub default: Option<String>,
    pub validate: Validator,
}

/// Asks questions and shows progress to the user
pub trait Prompter {
    /// Ask a single-select question and return the chosen value
    fn select(&mut self, question: &SelectQuestion) -> Result<String>;

    /// Ask a free-text question, re-prompting until `validate` accepts
    ///
    /// Returns the value produced by the validator.
    fn input(&mut self, question: &InputQuestion) -> Result<String>;

    /// Ask a yes/no question
    fn confirm(&mut self, message: &str, initial: bool) -> Result<bool>;

    /// Start an indeterminate progress indicator
    fn spinner(&mut self, message: &str) -> Box<dyn Progress>;

    fn info(&mut self, message: &str) -> Result<()>;

    fn success(&mut self, message: &str) -> Result<()>;

    fn error(&mut self, message: &str) -> Result<()>;
}

/// A running progress indicator
pub trait Progress {
    /// Stop the indicator after the operation finished
    fn stop(&mut self, message: &str);

    /// Stop the indicator after the operation failed
    fn fail(&mut self, message: &str);
}

/// Stops its progress indicator when dropped
///
/// Call [`ProgressGuard::finish`] on success; any other exit path (an early
/// `?` return or a panic) stops the indicator in its failed state.
pub struct ProgressGuard {
    progress: Option<Box<dyn Progress>>,
    message: String,
}

impl ProgressGuard {
    pub fn start(prompter: &mut dyn Prompter, message: &str) -> Self {
        Self {
            progress: Some(prompter.spinner(message)),
            message: message.to_string(),
        }
    }

    /// Stop the indicator normally
    pub fn finish(mut self, message: &str) {
        if let Some(mut progress) = self.progress.take() {
            progress.stop(message);
        }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if let Some(mut progress) = self.progress.take() {
            progress.fail(&self.message);
        }
    }
}
