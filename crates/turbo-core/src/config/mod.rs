//! Run configuration
//!
//! [`CliConfig`] is assembled once at startup from the product defaults, the
//! environment snapshot and the global flags, then passed by reference to every
//! component. Nothing here mutates the process environment.

pub mod env;

use crate::error::{Error, Result};
use crate::logging::LogLevel;
use crate::product::ProductConfig;
use crate::templates::TemplateSource;
use std::path::{Path, PathBuf};
use url::Url;

pub use env::Env;

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const TARGET_PATH_ENV: &str = "CLI_TARGET_PATH";
/// Published to plugin processes; never read back by this CLI
pub const HOME_PATH_ENV: &str = "CLI_HOME_PATH";

/// Cache directory for plugin command packages, under the CLI home
const DEPENDENCIES_DIR: &str = "dependencies";
/// Cache directory for template packages, under the CLI home
const TEMPLATE_DIR: &str = "template";
const NODE_MODULES: &str = "node_modules";

/// Global flags parsed from the command line
#[derive(Debug, Clone, Default)]
pub struct GlobalFlags {
    pub debug: bool,
    pub target_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub home: PathBuf,
    pub cli_home: PathBuf,
    /// Local package used in place of the cached plugin package
    pub target_path: Option<PathBuf>,
    pub log_level: LogLevel,
    pub registry: Url,
    pub template_source: TemplateSource,
    pub user_agent: String,
    pub command_allow_list: Vec<String>,
    pub run_template_commands: bool,
}

impl CliConfig {
    /// Build the configuration for the current user
    pub fn load<C: ProductConfig>(product: &C, flags: &GlobalFlags) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not determine the user home directory".into()))?;
        let env = Env::capture(&home);
        Self::resolve(product, &home, &env, flags)
    }

    /// Log level for reporting a failure that happened before a config existed
    ///
    /// Reads the same sources as [`CliConfig::load`]; an unknown `LOG_LEVEL`
    /// or a missing home directory falls back instead of failing.
    pub fn fallback_log_level(debug: bool) -> LogLevel {
        let env = match dirs::home_dir() {
            Some(home) => Env::capture(&home),
            None => Env::from_pairs(std::env::vars()),
        };
        lenient_log_level(&env, debug)
    }

    /// Build the configuration from explicit inputs
    pub fn resolve<C: ProductConfig>(
        product: &C,
        home: &Path,
        env: &Env,
        flags: &GlobalFlags,
    ) -> Result<Self> {
        if !home.is_dir() {
            return Err(Error::Config(format!(
                "user home directory does not exist: {}",
                home.display()
            )));
        }

        let cli_home = home.join(
            env.get(product.home_env())
                .unwrap_or_else(|| product.default_cli_home()),
        );

        let log_level = if flags.debug {
            LogLevel::Verbose
        } else {
            match env.get(LOG_LEVEL_ENV) {
                Some(raw) => raw.parse().map_err(Error::Config)?,
                None => LogLevel::default(),
            }
        };

        // An empty --target-path counts as unset, same as an empty variable
        let target_path = flags
            .target_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| env.get(TARGET_PATH_ENV).map(PathBuf::from));

        let registry_raw = env
            .get(product.registry_env())
            .unwrap_or_else(|| product.default_registry());
        let registry = Url::parse(registry_raw)
            .map_err(|e| Error::Config(format!("invalid registry URL '{}': {}", registry_raw, e)))?;

        let template_source = TemplateSource::from_value(
            env.get(product.template_url_env())
                .unwrap_or_else(|| product.default_template_url()),
        )?;

        Ok(Self {
            home: home.to_path_buf(),
            cli_home,
            target_path,
            log_level,
            registry,
            template_source,
            user_agent: product.user_agent().to_string(),
            command_allow_list: product
                .command_allow_list()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            run_template_commands: product.run_template_commands(),
        })
    }

    /// Install root for plugin command packages
    pub fn dependencies_dir(&self) -> PathBuf {
        self.cli_home.join(DEPENDENCIES_DIR)
    }

    pub fn dependencies_store(&self) -> PathBuf {
        self.dependencies_dir().join(NODE_MODULES)
    }

    /// Install root for template packages
    pub fn template_dir(&self) -> PathBuf {
        self.cli_home.join(TEMPLATE_DIR)
    }

    pub fn template_store(&self) -> PathBuf {
        self.template_dir().join(NODE_MODULES)
    }
}

fn lenient_log_level(env: &Env, debug: bool) -> LogLevel {
    if debug {
        return LogLevel::Verbose;
    }
    env.get(LOG_LEVEL_ENV)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}
