//! Out-of-process command dispatch
//!
//! A command runs in a plugin process when a target path is configured or the
//! product maps it to a plugin package. The plugin is a [`Package`] whose
//! entry point is spawned with the parent's standard streams, so interactive
//! plugins can prompt, and receives one [`PluginInvocation`] serialized as JSON
//! in its last command-line argument. Its exit code becomes the CLI's.

use crate::config::{CliConfig, HOME_PATH_ENV, TARGET_PATH_ENV};
use crate::error::{Error, Result};
use crate::package::{Package, PackageOptions, LATEST};
use crate::product::ProductConfig;
use crate::registry::RegistryClient;
use crate::runtime::check_node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Payload passed to a plugin as its last argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInvocation {
    pub command: String,
    pub args: Vec<String>,
    pub options: BTreeMap<String, serde_json::Value>,
}

impl PluginInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Plugin package for `command`, or `None` to run the built-in implementation
///
/// A configured target path is used as-is (direct mode) and must exist. A
/// product-mapped package is installed into, or updated within, the
/// dependencies cache.
pub async fn resolve_plugin<C: ProductConfig>(
    product: &C,
    config: &CliConfig,
    command: &str,
) -> Result<Option<Package>> {
    let registry = RegistryClient::from_config(config);
    let mapped = product.command_package(command);

    if let Some(target_path) = &config.target_path {
        let name = mapped.unwrap_or(command);
        let mut package = Package::new(
            PackageOptions {
                name: name.to_string(),
                version: LATEST.to_string(),
                target_path: target_path.clone(),
                store_dir: None,
            },
            registry,
        )?;
        if !package.exists().await? {
            return Err(Error::NotFound(format!(
                "target path {} does not exist",
                target_path.display()
            )));
        }
        tracing::debug!(target = %target_path.display(), command, "dispatching to local package");
        return Ok(Some(package));
    }

    let Some(name) = mapped else {
        return Ok(None);
    };

    let mut package = Package::new(
        PackageOptions {
            name: name.to_string(),
            version: LATEST.to_string(),
            target_path: config.dependencies_dir(),
            store_dir: Some(config.dependencies_store()),
        },
        registry,
    )?;

    if package.exists().await? {
        package.update().await?;
    } else {
        package.install().await?;
    }
    tracing::debug!(package = name, version = %package.version(), command, "dispatching to plugin package");
    Ok(Some(package))
}

/// Spawn the plugin's entry point and wait for it; returns its exit code
pub async fn run_plugin(
    config: &CliConfig,
    package: &Package,
    invocation: &PluginInvocation,
) -> Result<i32> {
    let entry = package.entry_point_path()?.ok_or_else(|| {
        Error::NotFound(format!(
            "{} declares no entry point in {}",
            package.name(),
            package.root_path().display()
        ))
    })?;

    let payload = serde_json::to_string(invocation)
        .map_err(|e| Error::Config(format!("cannot encode plugin invocation: {}", e)))?;

    let mut command = entry_command(&entry)?;
    command
        .arg(payload)
        .env(HOME_PATH_ENV, &config.cli_home)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(target_path) = &config.target_path {
        command.env(TARGET_PATH_ENV, target_path);
    }

    tracing::debug!(entry = %entry.display(), command = %invocation.command, "spawning plugin");
    let mut child = command
        .spawn()
        .map_err(|e| Error::Install(format!("failed to start {}: {}", entry.display(), e)))?;

    let status = child
        .wait()
        .await
        .map_err(|e| Error::Install(format!("failed to wait for {}: {}", entry.display(), e)))?;

    let code = status.code().unwrap_or(1);
    tracing::debug!(code, "plugin exited");
    Ok(code)
}

/// `node <entry>` for JavaScript entry points, the entry itself otherwise
fn entry_command(entry: &Path) -> Result<TokioCommand> {
    let is_js = entry
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "js" | "cjs" | "mjs"));

    if !is_js {
        return Ok(TokioCommand::new(entry));
    }

    let node = check_node();
    if !node.available {
        return Err(Error::NotFound(format!(
            "{} is required to run {}",
            node.name,
            entry.display()
        )));
    }
    tracing::trace!(version = ?node.version, "using node");
    let mut command = TokioCommand::new("node");
    command.arg(entry);
    Ok(command)
}
