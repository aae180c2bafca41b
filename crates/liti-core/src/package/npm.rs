//! npm registry packages unpacked into an npminstall-style store
//!
//! A package `name@version` lives in `<store>/_<name>@<version>@<name>`, with
//! `/` in scoped names replaced by `_` in the prefix. Tarballs are unpacked
//! into a temporary sibling and renamed into place, so a directory at the
//! final path is always a complete package.

use super::version::{is_exact, normalize_version, resolve_version};
use super::{PackageManager, PackageSpec, TemplatePackage};
use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tar::Archive;
use tokio::fs;
use url::Url;

/// Registry document for one package (only the fields we use)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,

    #[serde(default)]
    pub versions: HashMap<String, VersionMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionMetadata {
    pub dist: Dist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dist {
    pub tarball: String,
}

impl PackageMetadata {
    pub fn resolve(&self, package: &str, requested: &str) -> Result<String> {
        resolve_version(
            package,
            requested,
            &self.dist_tags,
            self.versions.keys().map(String::as_str),
        )
    }
}

/// HTTP client for an npm-compatible registry
#[derive(Clone)]
pub struct NpmRegistry {
    base_url: Url,
    client: reqwest::Client,
}

impl NpmRegistry {
    pub fn new(base_url: Url, user_agent: &str) -> Self {
        Self {
            base_url,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a registry client from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.registry_url_env())
            .unwrap_or_else(|_| config.default_registry_url().to_string());
        let url =
            Url::parse(&url_str).with_context(|| format!("Invalid registry URL: {}", url_str))?;
        Ok(Self::new(url, config.user_agent()))
    }

    /// Metadata URL for a package; scoped names keep their `@` and encode `/`
    pub fn metadata_url(&self, package: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", self.base_url))?
            .pop_if_empty()
            .push(package);
        Ok(url)
    }

    pub async fn metadata(&self, package: &str) -> Result<PackageMetadata> {
        let url = self.metadata_url(package)?;
        tracing::debug!(url = %url, "fetching package metadata");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch package metadata from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch package '{}' from {}: HTTP {}",
                package,
                url,
                response.status()
            );
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse metadata for package '{}'", package))
    }

    pub async fn download(&self, tarball_url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url = tarball_url, "downloading package tarball");
        let response = self
            .client
            .get(tarball_url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", tarball_url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to download {}: HTTP {}",
                tarball_url,
                response.status()
            );
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl PackageManager for NpmRegistry {
    fn package(&self, spec: PackageSpec) -> Box<dyn TemplatePackage> {
        Box::new(NpmPackage::new(self.clone(), spec))
    }
}

/// One package in the store, addressed by `(name, version)`
pub struct NpmPackage {
    registry: NpmRegistry,
    spec: PackageSpec,
    metadata: Option<PackageMetadata>,
}

impl NpmPackage {
    pub fn new(registry: NpmRegistry, spec: PackageSpec) -> Self {
        Self {
            registry,
            spec,
            metadata: None,
        }
    }

    async fn metadata(&mut self) -> Result<&PackageMetadata> {
        if self.metadata.is_none() {
            let metadata = self.registry.metadata(&self.spec.package_name).await?;
            self.metadata = Some(metadata);
        }
        self.metadata
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("metadata for '{}' not loaded", self.spec.package_name))
    }

    /// Ensure the store exists and the version points at one release
    async fn prepare(&mut self) -> Result<()> {
        fs::create_dir_all(&self.spec.store_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create package store {}",
                    self.spec.store_dir.display()
                )
            })?;

        if let Some(exact) = normalize_version(&self.spec.package_version) {
            self.spec.package_version = exact;
            return Ok(());
        }

        let name = self.spec.package_name.clone();
        let requested = self.spec.package_version.clone();
        let resolved = self.metadata().await?.resolve(&name, &requested)?;
        tracing::debug!(package = %name, requested = %requested, resolved = %resolved, "resolved package version");
        self.spec.package_version = resolved;
        Ok(())
    }

    async fn install_version(&mut self, version: &str) -> Result<PathBuf> {
        let name = self.spec.package_name.clone();
        let tarball = {
            let metadata = self.metadata().await?;
            metadata
                .versions
                .get(version)
                .map(|v| v.dist.tarball.clone())
                .ok_or_else(|| ScaffoldError::PackageVersionNotFound {
                    package: name.clone(),
                    requested: version.to_string(),
                })?
        };

        let bytes = self.registry.download(&tarball).await?;
        let dest = cache_dir(&self.spec.store_dir, &name, version);
        unpack_into_store(&bytes, &dest)
            .with_context(|| format!("Failed to unpack {}@{}", name, version))?;
        Ok(dest)
    }
}

#[async_trait]
impl TemplatePackage for NpmPackage {
    async fn exists(&mut self) -> Result<bool> {
        self.prepare().await?;
        Ok(fs::try_exists(self.cache_file_path()).await.unwrap_or(false))
    }

    async fn install(&mut self) -> Result<()> {
        self.prepare().await?;
        let version = self.spec.package_version.clone();
        let dest = self.install_version(&version).await?;
        tracing::debug!(path = %dest.display(), "package installed");
        Ok(())
    }

    async fn update(&mut self) -> Result<()> {
        fs::create_dir_all(&self.spec.store_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create package store {}",
                    self.spec.store_dir.display()
                )
            })?;
        let name = self.spec.package_name.clone();
        let requested = self.spec.package_version.clone();

        // An exact version already in the store has nothing to update.
        if is_exact(&requested) {
            self.prepare().await?;
            if fs::try_exists(self.cache_file_path()).await.unwrap_or(false) {
                return Ok(());
            }
        }

        let resolved = self.metadata().await?.resolve(&name, &requested)?;
        let dest = cache_dir(&self.spec.store_dir, &name, &resolved);
        if !fs::try_exists(&dest).await.unwrap_or(false) {
            self.install_version(&resolved).await?;
        }
        self.spec.package_version = resolved;
        Ok(())
    }

    fn cache_file_path(&self) -> PathBuf {
        cache_dir(
            &self.spec.store_dir,
            &self.spec.package_name,
            &self.spec.package_version,
        )
    }

    fn version(&self) -> &str {
        &self.spec.package_version
    }
}

/// Store directory of `name@version`
pub fn cache_dir(store_dir: &Path, name: &str, version: &str) -> PathBuf {
    let prefix = name.replace('/', "_");
    store_dir.join(format!("_{}@{}@{}", prefix, version, name))
}

/// Unpack a gzip tarball into `dest`, dropping the leading `package/` folder
fn unpack_into_store(tarball: &[u8], dest: &Path) -> Result<()> {
    let staging = staging_dir(dest);
    if staging.exists() {
        std::fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to clear {}", staging.display()))?;
    }
    std::fs::create_dir_all(&staging)
        .with_context(|| format!("Failed to create {}", staging.display()))?;

    let root = match extract_tarball(tarball, &staging).and_then(|()| package_root(&staging)) {
        Ok(root) => root,
        Err(e) => {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }
    };

    if dest.exists() {
        std::fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to replace {}", dest.display()))?;
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::rename(&root, dest)
        .with_context(|| format!("Failed to move package into {}", dest.display()))?;
    std::fs::remove_dir_all(&staging)
        .with_context(|| format!("Failed to clear {}", staging.display()))?;
    Ok(())
}

fn staging_dir(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}

/// Unpack every entry under `dest`, keeping header modes
fn extract_tarball(tarball: &[u8], dest: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(tarball));

    for entry in archive.entries().context("Failed to read package tarball")? {
        let mut entry = entry.context("Failed to read package tarball")?;
        let path = entry.path()?.into_owned();
        if !entry
            .unpack_in(dest)
            .with_context(|| format!("Failed to unpack {}", path.display()))?
        {
            anyhow::bail!("Refusing to unpack entry outside package: {}", path.display());
        }
    }

    Ok(())
}

/// The single top-level folder npm tarballs wrap their contents in
fn package_root(staging: &Path) -> Result<PathBuf> {
    let mut entries = std::fs::read_dir(staging)
        .with_context(|| format!("Failed to read {}", staging.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    match entries.pop() {
        Some(entry) if entries.is_empty() && entry.file_type()?.is_dir() => Ok(entry.path()),
        _ => anyhow::bail!("Package tarball has no single top-level folder"),
    }
}
