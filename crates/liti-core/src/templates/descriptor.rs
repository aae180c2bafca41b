//! Template catalog records and descriptors

use crate::error::ScaffoldError;
use serde::Deserialize;
use std::fmt;

/// How a template is installed into the target directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Copy the package's `template/` folder
    #[default]
    Normal,
    /// Template ships its own installer
    Custom,
}

impl TemplateKind {
    /// Parse the catalog's `type` field; absent means `Normal`
    pub fn from_catalog(kind: Option<&str>) -> Option<Self> {
        match kind.map(str::trim) {
            None | Some("") => Some(Self::Normal),
            Some(k) if k.eq_ignore_ascii_case("normal") => Some(Self::Normal),
            Some(k) if k.eq_ignore_ascii_case("custom") => Some(Self::Custom),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Normal => "normal",
            TemplateKind::Custom => "custom",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template record as served by the catalog service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Display name of the template
    pub name: String,

    /// npm package the template is published as
    #[serde(rename = "npmName")]
    pub npm_name: String,

    /// Package version (exact version, dist-tag or range)
    pub version: String,

    /// Install strategy, `normal` when absent
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// A template available for this run
///
/// Built once from a [`CatalogEntry`] when the catalog is fetched and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub display_name: String,
    pub package_name: String,
    pub version: String,
    pub kind: TemplateKind,
}

impl TryFrom<CatalogEntry> for TemplateDescriptor {
    type Error = ScaffoldError;

    fn try_from(entry: CatalogEntry) -> Result<Self, Self::Error> {
        let kind = TemplateKind::from_catalog(entry.kind.as_deref()).ok_or_else(|| {
            ScaffoldError::UnrecognizedTemplateKind {
                package: entry.npm_name.clone(),
                kind: entry.kind.clone().unwrap_or_default(),
            }
        })?;

        Ok(Self {
            display_name: entry.name,
            package_name: entry.npm_name,
            version: entry.version,
            kind,
        })
    }
}
