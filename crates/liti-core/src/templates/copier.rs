//! Template installation into the target directory

use crate::error::ScaffoldError;
use crate::prompt::{ProgressGuard, Prompter};
use crate::templates::descriptor::{TemplateDescriptor, TemplateKind};
use crate::workflow::CacheHandle;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use walkdir::WalkDir;

/// Folder inside a template package holding the files to copy
pub const TEMPLATE_SUBDIR: &str = "template";

/// Install the cached template into `target_dir`, dispatching on its kind
pub async fn materialize(
    prompter: &mut dyn Prompter,
    handle: &CacheHandle,
    descriptor: &TemplateDescriptor,
    target_dir: &Path,
) -> Result<()> {
    match descriptor.kind {
        TemplateKind::Normal => install_normal(prompter, handle, target_dir).await,
        TemplateKind::Custom => Err(ScaffoldError::CustomTemplateUnsupported {
            package: descriptor.package_name.clone(),
        }
        .into()),
    }
}

async fn install_normal(
    prompter: &mut dyn Prompter,
    handle: &CacheHandle,
    target_dir: &Path,
) -> Result<()> {
    let progress = ProgressGuard::start(prompter, "Installing template...");

    let template_dir = handle.cache_file_path.join(TEMPLATE_SUBDIR);
    tracing::debug!(path = %template_dir.display(), "template source");
    tracing::debug!(path = %target_dir.display(), "target directory");

    let copied = copy_template(&template_dir, target_dir).await?;

    progress.finish(&format!("Copied {} files", copied.len()));
    prompter.success("Template installed")?;
    Ok(())
}

/// Recursively copy `source` into `target`, overwriting existing files
///
/// Both directories are created if missing. Returns the copied file paths
/// relative to `source`.
pub async fn copy_template(source: &Path, target: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(source)
        .await
        .with_context(|| format!("Failed to create directory: {}", source.display()))?;
    fs::create_dir_all(target)
        .await
        .context("Failed to create target directory")?;

    let mut copied_files = Vec::new();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("Template entry outside template directory")?;
        let target_path = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)
                .await
                .with_context(|| format!("Failed to create directory: {}", target_path.display()))?;
            continue;
        }

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::copy(entry.path(), &target_path)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        copied_files.push(relative.to_string_lossy().replace('\\', "/"));
    }

    Ok(copied_files)
}
