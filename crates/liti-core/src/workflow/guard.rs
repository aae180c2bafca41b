//! Target directory safety check

use crate::prompt::Prompter;
use anyhow::{Context, Result};
use std::path::Path;

/// Entries that do not make a directory "occupied" besides dotfiles
pub const IGNORED_ENTRIES: &[&str] = &["node_modules"];

pub const CONTINUE_MESSAGE: &str =
    "The current directory is not empty. Continue creating the project here?";
pub const CONFIRM_CLEAR_MESSAGE: &str = "Confirm clearing all files in the current directory?";

/// Outcome of the directory check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// The user declined to continue; stop without error
    Abort,
}

/// Whether `path` has nothing but dotfiles and dependency caches
///
/// A missing directory counts as empty.
pub fn is_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }

    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;
    for entry in entries {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with('.') && !IGNORED_ENTRIES.contains(&name.as_ref()) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Decide whether scaffolding into `path` may go ahead
///
/// `force` skips the "continue?" question only; clearing the directory is
/// always confirmed separately. Declining the clear still proceeds into the
/// occupied directory.
pub fn ensure_safe(prompter: &mut dyn Prompter, path: &Path, force: bool) -> Result<GuardDecision> {
    if is_empty(path)? {
        return Ok(GuardDecision::Proceed);
    }

    if !force && !prompter.confirm(CONTINUE_MESSAGE, false)? {
        tracing::debug!(path = %path.display(), "user declined non-empty directory");
        return Ok(GuardDecision::Abort);
    }

    if prompter.confirm(CONFIRM_CLEAR_MESSAGE, false)? {
        empty_dir(path)?;
        tracing::debug!(path = %path.display(), "cleared target directory");
    }

    Ok(GuardDecision::Proceed)
}

/// Remove everything inside `path`, keeping the directory itself
pub fn empty_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()));
    }

    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?
    {
        let entry_path = entry?.path();
        let file_type = std::fs::symlink_metadata(&entry_path)?.file_type();
        let removed = if file_type.is_dir() {
            std::fs::remove_dir_all(&entry_path)
        } else {
            std::fs::remove_file(&entry_path)
        };
        removed.with_context(|| format!("Failed to remove {}", entry_path.display()))?;
    }
    Ok(())
}
