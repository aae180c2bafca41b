//! Template package acquisition into the local cache

use crate::config::CacheLayout;
use crate::package::{PackageManager, PackageSpec, TemplatePackage};
use crate::prompt::{ProgressGuard, Prompter};
use crate::templates::TemplateDescriptor;
use anyhow::Result;
use std::path::PathBuf;

/// A template package present in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHandle {
    pub package_name: String,
    /// Version the cache entry holds
    pub version: String,
    /// Directory of the unpacked package
    pub cache_file_path: PathBuf,
}

/// Make sure the descriptor's package is cached and current
///
/// Downloads when absent and updates when present. Errors propagate as-is
/// once the progress indicator has stopped; nothing is retried.
pub async fn acquire(
    prompter: &mut dyn Prompter,
    packages: &dyn PackageManager,
    layout: &CacheLayout,
    descriptor: &TemplateDescriptor,
) -> Result<CacheHandle> {
    let mut package = packages.package(PackageSpec {
        target_path: layout.target_cache_root.clone(),
        store_dir: layout.package_cache_dir.clone(),
        package_name: descriptor.package_name.clone(),
        package_version: descriptor.version.clone(),
    });

    if package.exists().await? {
        run_step(
            prompter,
            package.as_mut(),
            "Updating template...",
            "Template updated",
            Step::Update,
        )
        .await?;
    } else {
        run_step(
            prompter,
            package.as_mut(),
            "Downloading template...",
            "Template downloaded",
            Step::Install,
        )
        .await?;
    }

    tracing::debug!(path = %layout.target_cache_root.display(), "template directory");
    tracing::debug!(path = %layout.package_cache_dir.display(), "template cache directory");

    Ok(CacheHandle {
        package_name: descriptor.package_name.clone(),
        version: package.version().to_string(),
        cache_file_path: package.cache_file_path(),
    })
}

#[derive(Clone, Copy)]
enum Step {
    Install,
    Update,
}

async fn run_step(
    prompter: &mut dyn Prompter,
    package: &mut dyn TemplatePackage,
    running: &str,
    done: &str,
    step: Step,
) -> Result<()> {
    let progress = ProgressGuard::start(prompter, running);
    match step {
        Step::Install => package.install().await?,
        Step::Update => package.update().await?,
    }
    progress.finish(done);

    if package.exists().await? {
        prompter.success(done)?;
    }
    Ok(())
}
