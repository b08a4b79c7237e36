//! Turbo Core - Shared library for the `turbo` scaffolding CLI
//!
//! This library provides everything behind `turbo init`: resolving template
//! packages against an npm registry, caching them per version on disk, copying
//! a template into the working directory and rendering its placeholders.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - registry lookups ([`registry`]), the
//!   versioned package cache ([`package`]), template copy/render
//!   ([`templates`]), allow-listed command execution ([`runtime`])
//! - **Layer 2: Workflow Orchestration** - [`ProductConfig`], [`CliConfig`],
//!   the [`commands::Command`] contract with `init`, and plugin dispatch
//!   ([`exec`])
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based [`commands::Prompter`]
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use turbo_core::{CliConfig, GlobalFlags, Package, PackageOptions, RegistryClient};
//!
//! let config = CliConfig::load(&MyProduct, &GlobalFlags::default())?;
//! let mut package = Package::new(
//!     PackageOptions {
//!         name: "@turbo-cli-dev/template-vue3".into(),
//!         version: "latest".into(),
//!         target_path: config.template_dir(),
//!         store_dir: Some(config.template_store()),
//!     },
//!     RegistryClient::from_config(&config),
//! )?;
//! if !package.exists().await? {
//!     package.install().await?;
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod package;
pub mod product;
pub mod project;
pub mod registry;
pub mod runtime;
pub mod templates;
pub mod version;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use commands::{Command, InitArgs, InitCommand, InitOutcome, Prompter};
pub use config::{CliConfig, GlobalFlags};
pub use error::{Error, Result};
pub use exec::{resolve_plugin, run_plugin, PluginInvocation};
pub use logging::LogLevel;
pub use package::{Package, PackageOptions};
pub use product::ProductConfig;
pub use project::{ProjectInfo, ProjectType};
pub use registry::RegistryClient;
pub use runtime::{check_command, exec_command};
pub use templates::{TemplateFetcher, TemplateInfo, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::ClackPrompter;
