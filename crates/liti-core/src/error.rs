//! Error types for liti-core

use thiserror::Error;

/// Scaffolding failures that abort the init workflow.
///
/// Functions in this crate return `anyhow::Result`; these variants are raised
/// through it and can be recovered with `downcast_ref::<ScaffoldError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldError {
    /// The catalog service returned no templates
    #[error("No project templates are available")]
    CatalogEmpty,

    /// A catalog record carries a `type` we cannot install
    #[error("Unrecognized template type '{kind}' for template '{package}'")]
    UnrecognizedTemplateKind { package: String, kind: String },

    /// More than one catalog record publishes the same package
    #[error("Template package '{package}' is listed more than once in the catalog")]
    DuplicateTemplate { package: String },

    /// The selected package name is not in the catalog snapshot
    #[error("Template information not found for '{package}'")]
    MissingTemplateInfo { package: String },

    /// Component scaffolding has no question set yet
    #[error("Creating components is not supported yet")]
    ComponentUnsupported,

    /// Custom template installation has no installer yet
    #[error("Installing custom template '{package}' is not supported yet")]
    CustomTemplateUnsupported { package: String },

    /// The registry has no version matching the request
    #[error("No version of '{package}' matches '{requested}'")]
    PackageVersionNotFound { package: String, requested: String },

    /// The user's home directory could not be determined
    #[error("Could not determine the user home directory")]
    HomeDirNotFound,
}
