//! Product configuration trait for CLI binaries
//!
//! A binary implements this trait once to name itself and to pick the defaults
//! (registry, template catalog, cache directory) the scaffolding core runs with.

/// Public npm registry, used when neither the product nor `CLI_REGISTRY` picks another
pub const NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// Package-manager binaries a template may invoke through `installCommand`/`startCommand`
pub const DEFAULT_COMMAND_ALLOW_LIST: &[&str] = &["npm", "cnpm"];

/// Configuration trait for CLI products
///
/// Each product defines:
/// - Product identity (name, display name)
/// - Where templates and packages come from
/// - The environment variables that override those defaults
/// - Which commands are dispatched to plugin packages
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the binary and log heading)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Directory under the user's home holding the package cache
    fn default_cli_home(&self) -> &'static str;

    /// URL (or local path) of the template catalog
    fn default_template_url(&self) -> &'static str;

    /// Environment variable overriding the template catalog location
    fn template_url_env(&self) -> &'static str {
        "CLI_TEMPLATE_URL"
    }

    /// Environment variable naming the cache directory under the home directory
    fn home_env(&self) -> &'static str {
        "CLI_HOME"
    }

    /// Environment variable overriding the npm registry
    fn registry_env(&self) -> &'static str {
        "CLI_REGISTRY"
    }

    fn default_registry(&self) -> &'static str {
        NPM_REGISTRY
    }

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Programs template commands are allowed to start
    fn command_allow_list(&self) -> &'static [&'static str] {
        DEFAULT_COMMAND_ALLOW_LIST
    }

    /// npm package implementing `command` out-of-process, if any
    ///
    /// `None` runs the built-in implementation unless a target path is set.
    fn command_package(&self, _command: &str) -> Option<&'static str> {
        None
    }

    /// Whether a template's `installCommand` and `startCommand` run after rendering
    fn run_template_commands(&self) -> bool {
        false
    }

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
