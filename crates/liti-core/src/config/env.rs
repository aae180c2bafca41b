//! User-level environment file

use std::path::{Path, PathBuf};

/// Load `<home>/.env` into the process environment if it exists
///
/// Variables already set in the environment are left alone. Returns the path
/// that was loaded.
pub fn load_user_env() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    load_env_file(&home.join(".env"))
}

fn load_env_file(path: &Path) -> Option<PathBuf> {
    if !path.is_file() {
        return None;
    }
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded user env file");
            Some(path.to_path_buf())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load user env file");
            None
        }
    }
}
