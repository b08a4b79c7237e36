//! Template package fetching and installation into a project directory

use super::copier::copy_template;
use super::ignore::IgnoreSet;
use super::manifest::{TemplateInfo, TemplateType};
use super::render::{render_dir, Renderer};
use crate::config::CliConfig;
use crate::error::{Error, Result};
use crate::package::{Package, PackageOptions};
use crate::project::ProjectInfo;
use crate::registry::RegistryClient;
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Directory inside a template package holding the project files
pub const TEMPLATE_SUBDIR: &str = "template";

/// What [`fetch_template`] had to do to make the package available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not cached before; downloaded now
    Installed,
    /// Cached, and a newer version was downloaded
    Updated,
    /// Cached and already the newest version
    UpToDate,
}

/// Resolve the template's package in the template cache, installing or
/// updating it as needed
pub async fn fetch_template(
    config: &CliConfig,
    template: &TemplateInfo,
) -> Result<(Package, FetchOutcome)> {
    let mut package = Package::new(
        PackageOptions {
            name: template.npm_name.clone(),
            version: template.version.clone(),
            target_path: config.template_dir(),
            store_dir: Some(config.template_store()),
        },
        RegistryClient::from_config(config),
    )?;

    let outcome = if package.exists().await? {
        if package.update().await? {
            FetchOutcome::Updated
        } else {
            FetchOutcome::UpToDate
        }
    } else {
        package.install().await?;
        FetchOutcome::Installed
    };

    tracing::debug!(
        package = %package.name(),
        version = %package.version(),
        outcome = ?outcome,
        "template package ready"
    );
    Ok((package, outcome))
}

/// Lifecycle of one template installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    NormalInstalling,
    CustomInstalling,
    Installed,
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallState::NotInstalled => "not installed",
            InstallState::NormalInstalling => "installing",
            InstallState::CustomInstalling => "installing (custom)",
            InstallState::Installed => "installed",
            InstallState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Installs one template into one project directory
#[derive(Debug)]
pub struct TemplateInstaller<'a> {
    template: &'a TemplateInfo,
    project: &'a ProjectInfo,
    state: InstallState,
}

impl<'a> TemplateInstaller<'a> {
    pub fn new(template: &'a TemplateInfo, project: &'a ProjectInfo) -> Self {
        Self {
            template,
            project,
            state: InstallState::NotInstalled,
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Dispatch on the template type; `Failed` is terminal
    pub async fn install(&mut self, package_root: &Path, target_dir: &Path) -> Result<()> {
        if self.state != InstallState::NotInstalled {
            return Err(Error::Install(format!(
                "template {} is already {}",
                self.template.npm_name, self.state
            )));
        }

        let result = match self.template.kind {
            TemplateType::Normal => {
                self.state = InstallState::NormalInstalling;
                install_normal(package_root, target_dir, self.template, self.project)
                    .await
                    .map(|_| ())
            }
            TemplateType::Custom => {
                self.state = InstallState::CustomInstalling;
                install_custom(package_root, target_dir, self.template, self.project).await
            }
        };

        self.state = if result.is_ok() {
            InstallState::Installed
        } else {
            InstallState::Failed
        };
        result
    }
}

/// Copy the package's `template/` directory into `target_dir` and render it
///
/// Returns the number of rendered files.
pub async fn install_normal(
    package_root: &Path,
    target_dir: &Path,
    template: &TemplateInfo,
    project: &ProjectInfo,
) -> Result<usize> {
    let source = package_root.join(TEMPLATE_SUBDIR);
    if !source.is_dir() {
        return Err(Error::NotFound(format!(
            "{} has no {}/ directory at {}",
            template.npm_name,
            TEMPLATE_SUBDIR,
            package_root.display()
        )));
    }
    fs::create_dir_all(target_dir)
        .await
        .map_err(|e| Error::io(target_dir, e))?;

    let copied = copy_template(&source, target_dir).await?;
    tracing::info!(files = copied.len(), template = %template.npm_name, "template copied");

    let ignore = IgnoreSet::new(&template.ignore);
    let renderer = Renderer::new(&project.render_context())?;
    render_dir(target_dir, &ignore, renderer).await
}

/// Template-provided install logic has no defined contract yet
pub async fn install_custom(
    _package_root: &Path,
    _target_dir: &Path,
    template: &TemplateInfo,
    _project: &ProjectInfo,
) -> Result<()> {
    Err(Error::Unsupported(format!(
        "template {} uses the custom install strategy, which is not supported",
        template.npm_name
    )))
}
