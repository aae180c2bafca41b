//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface a CLI binary implements to point the
//! scaffolding workflow at its own catalog service, package registry and
//! cache directory.

/// Configuration trait for a scaffolding CLI product
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Template catalog location
/// - Package registry location
/// - Local cache home
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Default base URL of the template catalog service
    fn default_catalog_url(&self) -> &'static str;

    /// Environment variable name for overriding the catalog URL
    fn catalog_url_env(&self) -> &'static str;

    /// Default npm registry templates are published to
    fn default_registry_url(&self) -> &'static str {
        "https://registry.npmjs.org"
    }

    /// Environment variable name for overriding the registry URL
    fn registry_url_env(&self) -> &'static str;

    /// Cache home directory name, relative to the user home
    fn default_cli_home(&self) -> &'static str;

    /// Environment variable name for overriding the cache home
    fn cli_home_env(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
