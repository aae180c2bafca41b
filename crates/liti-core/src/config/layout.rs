//! Template cache locations under the user home

use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Subdirectory of the CLI home holding downloaded templates
pub const TEMPLATE_DIR: &str = "template";

/// Subdirectory of the template root the package store writes into
pub const NODE_MODULES: &str = "node_modules";

/// Where acquired template packages live on disk
///
/// Both paths are derived from the CLI home and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    /// Root the template packages are acquired into
    pub target_cache_root: PathBuf,
    /// The package store's own node-module-style storage
    pub package_cache_dir: PathBuf,
}

impl CacheLayout {
    /// Build the layout for a CLI home directory
    pub fn new(cli_home: &Path) -> Self {
        let target_cache_root = cli_home.join(TEMPLATE_DIR);
        let package_cache_dir = target_cache_root.join(NODE_MODULES);
        Self {
            target_cache_root,
            package_cache_dir,
        }
    }

    /// Resolve the layout from the product config and the user home
    ///
    /// The CLI home env override wins when set; a relative override is taken
    /// relative to the home directory.
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let home = dirs::home_dir().ok_or(ScaffoldError::HomeDirNotFound)?;
        let cli_home = std::env::var(config.cli_home_env()).ok();
        Ok(Self::new(&resolve_cli_home(
            &home,
            cli_home.as_deref(),
            config.default_cli_home(),
        )))
    }
}

fn resolve_cli_home(home: &Path, configured: Option<&str>, default: &str) -> PathBuf {
    match configured.filter(|s| !s.trim().is_empty()) {
        Some(dir) => {
            let dir = Path::new(dir);
            if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                home.join(dir)
            }
        }
        None => home.join(default),
    }
}
