//! Template catalog and installation
//!
//! This module provides:
//! - Catalog record and descriptor types (CatalogEntry, TemplateDescriptor)
//! - Catalog retrieval from the remote service or a local file
//! - Template installation from the package cache into the target directory

pub mod catalog;
pub mod copier;
pub mod descriptor;

pub use catalog::{fetch_catalog, CatalogClient, CatalogSource, TemplateCatalog};
pub use copier::{copy_template, materialize};
pub use descriptor::{CatalogEntry, TemplateDescriptor, TemplateKind};
