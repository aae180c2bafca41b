//! Liti Core - Shared library for the `liti init` scaffolding workflow
//!
//! This library provides the pipeline that turns a remote template catalog
//! into a scaffolded directory: check the target directory, collect project
//! details, fetch the chosen template package into a local cache, and copy
//! it into place.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Catalog retrieval, package cache, template copying
//! - **Layer 2: Workflow Orchestration** - `ScaffoldWorkflow` driving the stages through
//!   the `Prompter`, `TemplateCatalog` and `PackageManager` seams
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompter and the `run` entry point
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use liti_core::{CacheLayout, CatalogClient, InitOptions, NpmRegistry, ScaffoldWorkflow};
//!
//! let catalog = CatalogClient::from_config(&MyConfig)?;
//! let registry = NpmRegistry::from_config(&MyConfig)?;
//! let layout = CacheLayout::from_config(&MyConfig)?;
//! let outcome = ScaffoldWorkflow::new(&mut my_prompter, &catalog, &registry, layout, options)
//!     .run()
//!     .await;
//! ```

pub mod config;
pub mod error;
pub mod package;
pub mod product;
pub mod prompt;
pub mod templates;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{load_user_env, CacheLayout};
pub use error::ScaffoldError;
pub use package::{NpmPackage, NpmRegistry, PackageManager, PackageSpec, TemplatePackage};
pub use product::ProductConfig;
pub use prompt::{Prompter, ProgressGuard};
pub use templates::{
    fetch_catalog, CatalogClient, CatalogEntry, CatalogSource, TemplateCatalog,
    TemplateDescriptor, TemplateKind,
};
pub use workflow::{
    InitOptions, Outcome, ProjectInfo, ScaffoldWorkflow, WorkflowContext, WorkflowState,
};

#[cfg(feature = "tui")]
pub use tui::run;
