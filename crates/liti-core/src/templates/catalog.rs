//! Template catalog retrieval from the catalog service or a local file

use super::descriptor::{CatalogEntry, TemplateDescriptor};
use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;
use url::Url;

/// Path of the template listing endpoint, relative to the catalog base URL
const TEMPLATE_ENDPOINT: [&str; 2] = ["project", "template"];

/// A service listing the templates available for scaffolding
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Return the raw catalog records; `None` when the service has none
    async fn entries(&self) -> Result<Option<Vec<CatalogEntry>>>;
}

/// Catalog source - either remote service URL or local file
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Remote(Url),
    Local(PathBuf),
}

impl CatalogSource {
    /// Create a remote catalog source from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.catalog_url_env())
            .unwrap_or_else(|_| config.default_catalog_url().to_string());
        let url =
            Url::parse(&url_str).with_context(|| format!("Invalid catalog URL: {}", url_str))?;
        Ok(Self::Remote(url))
    }

    /// Create a local catalog source from a file path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// Catalog client - reads the template list from a remote or local source
pub struct CatalogClient {
    source: CatalogSource,
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a new client with a custom user agent
    pub fn new(source: CatalogSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a client from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = CatalogSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    /// Create a client reading a local catalog file
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(CatalogSource::local(path), user_agent)
    }

    /// Build the template listing URL, preserving query parameters
    fn endpoint_url(base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .extend(TEMPLATE_ENDPOINT);
        Ok(url)
    }
}

#[async_trait]
impl TemplateCatalog for CatalogClient {
    async fn entries(&self) -> Result<Option<Vec<CatalogEntry>>> {
        match &self.source {
            CatalogSource::Remote(base_url) => {
                let url = Self::endpoint_url(base_url)?;
                tracing::debug!(url = %url, "fetching template catalog");
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch template catalog from {}", url))?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch template catalog from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }

                response
                    .json::<Option<Vec<CatalogEntry>>>()
                    .await
                    .context("Failed to parse template catalog")
            }
            CatalogSource::Local(path) => {
                tracing::debug!(path = %path.display(), "reading local template catalog");
                let content = fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_yaml::from_str(&content).context("Failed to parse template catalog")
            }
        }
    }
}

/// Fetch the catalog snapshot for this run
///
/// Fails with [`ScaffoldError::CatalogEmpty`] when the service returns no
/// templates, with [`ScaffoldError::UnrecognizedTemplateKind`] when a
/// record's `type` cannot be installed, and with
/// [`ScaffoldError::DuplicateTemplate`] when a package is listed twice.
pub async fn fetch_catalog(catalog: &dyn TemplateCatalog) -> Result<Vec<TemplateDescriptor>> {
    let entries = catalog.entries().await?.unwrap_or_default();
    if entries.is_empty() {
        return Err(ScaffoldError::CatalogEmpty.into());
    }

    let descriptors = entries
        .into_iter()
        .map(TemplateDescriptor::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    if let Some(duplicate) = descriptors
        .iter()
        .find(|d| !seen.insert(d.package_name.as_str()))
    {
        return Err(ScaffoldError::DuplicateTemplate {
            package: duplicate.package_name.clone(),
        }
        .into());
    }
    tracing::debug!(count = descriptors.len(), "template catalog loaded");
    Ok(descriptors)
}
