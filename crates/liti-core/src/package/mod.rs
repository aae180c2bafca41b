//! Versioned template packages in the local cache
//!
//! This module provides:
//! - The package abstraction the acquisition stage drives (exists/install/update)
//! - An npm-registry backed implementation with an npminstall-style store
//! - Version normalization and resolution

pub mod npm;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub use npm::{NpmPackage, NpmRegistry};
pub use version::{normalize_version, resolve_version};

/// Coordinates of one package in the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Root the package is acquired into
    pub target_path: PathBuf,
    /// The store's node-module-style directory
    pub store_dir: PathBuf,
    pub package_name: String,
    /// Requested version: exact version, dist-tag or range
    pub package_version: String,
}

/// A template package scoped to `(name, version)`
#[async_trait]
pub trait TemplatePackage: Send {
    /// Whether the requested version is present in the store
    async fn exists(&mut self) -> Result<bool>;

    /// Download the package into the store
    async fn install(&mut self) -> Result<()>;

    /// Re-resolve the requested version and fetch it if it is not cached
    async fn update(&mut self) -> Result<()>;

    /// Directory holding the unpacked package
    fn cache_file_path(&self) -> PathBuf;

    /// Version the package currently points at
    fn version(&self) -> &str;
}

/// Opens packages in a store
pub trait PackageManager: Send + Sync {
    fn package(&self, spec: PackageSpec) -> Box<dyn TemplatePackage>;
}
