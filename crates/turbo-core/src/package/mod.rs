//! Versioned package cache
//!
//! A [`Package`] pins one npm package to a location on disk. Two modes:
//!
//! - **Cache mode** (`store_dir` set): files live in a version-qualified entry
//!   under the shared store (see [`store`]), installed and updated from the
//!   registry on demand.
//! - **Direct mode** (no `store_dir`): `target_path` already holds the package,
//!   typically a local checkout passed with `--target-path`. Nothing is
//!   downloaded.
//!
//! Registry and filesystem failures propagate unchanged; nothing is retried.

pub mod manifest;
pub mod store;
pub mod tarball;

use crate::error::{Error, Result};
use crate::registry::RegistryClient;
use crate::version;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Version sentinel resolved against the registry on first use
pub const LATEST: &str = "latest";

/// Construction options for [`Package`]
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub name: String,
    /// Exact semver or [`LATEST`]
    pub version: String,
    pub target_path: PathBuf,
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    version: String,
    target_path: PathBuf,
    store_dir: Option<PathBuf>,
    registry: RegistryClient,
}

impl Package {
    pub fn new(options: PackageOptions, registry: RegistryClient) -> Result<Self> {
        if options.name.trim().is_empty() {
            return Err(Error::Config("package name must not be empty".into()));
        }
        if options.target_path.as_os_str().is_empty() {
            return Err(Error::Config(format!(
                "target path for {} must not be empty",
                options.name
            )));
        }

        let version = if options.version.trim().is_empty() {
            LATEST.to_string()
        } else {
            options.version
        };

        Ok(Self {
            name: options.name,
            version,
            target_path: options.target_path,
            store_dir: options.store_dir.filter(|p| !p.as_os_str().is_empty()),
            registry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current version; still [`LATEST`] until [`prepare`](Self::prepare) resolves it
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn store_dir(&self) -> Option<&Path> {
        self.store_dir.as_deref()
    }

    pub fn is_cache_mode(&self) -> bool {
        self.store_dir.is_some()
    }

    /// Create the store directory and pin a [`LATEST`] version to a concrete one
    ///
    /// Idempotent: once the version is concrete no further lookups happen.
    pub async fn prepare(&mut self) -> Result<()> {
        if let Some(store_dir) = &self.store_dir {
            fs::create_dir_all(store_dir)
                .await
                .map_err(|e| Error::io(store_dir, e))?;
        }

        if self.version == LATEST {
            let latest = self.resolve_latest().await?;
            tracing::debug!(package = %self.name, version = %latest, "pinned latest version");
            self.version = latest;
        }

        Ok(())
    }

    /// Cache entry for the current version (cache mode only)
    pub fn cache_entry_path(&self) -> Option<PathBuf> {
        self.cache_entry_for(&self.version)
    }

    /// Cache entry for an arbitrary version of this package (cache mode only)
    pub fn cache_entry_for(&self, version: &str) -> Option<PathBuf> {
        self.store_dir
            .as_deref()
            .map(|store| store::cache_entry_path(store, &self.name, version))
    }

    /// Directory the package files are read from in the current mode
    pub fn root_path(&self) -> PathBuf {
        self.cache_entry_path()
            .unwrap_or_else(|| self.target_path.clone())
    }

    /// Whether the package is present locally
    ///
    /// Cache mode prepares first (which may hit the registry to pin
    /// [`LATEST`]) and then checks the cache entry; direct mode only checks
    /// `target_path`. A missing path is `Ok(false)`, never an error.
    pub async fn exists(&mut self) -> Result<bool> {
        if self.is_cache_mode() {
            self.prepare().await?;
            Ok(self
                .cache_entry_path()
                .is_some_and(|entry| entry.exists()))
        } else {
            Ok(self.target_path.exists())
        }
    }

    /// Download and unpack the current version into the store
    pub async fn install(&mut self) -> Result<()> {
        self.prepare().await?;
        let version = self.version.clone();
        self.install_version(&version).await
    }

    /// Move to the newest published version, downloading it only if not cached
    ///
    /// Returns `true` when a download happened. The in-memory version is the
    /// latest one afterwards either way, so repeated calls converge without
    /// re-downloading.
    pub async fn update(&mut self) -> Result<bool> {
        self.prepare().await?;

        let latest = self.resolve_latest().await?;
        let entry = self.require_cache_entry(&latest)?;

        let installed = if entry.exists() {
            tracing::debug!(package = %self.name, version = %latest, "latest version already cached");
            false
        } else {
            if version::is_newer(&latest, &self.version) {
                tracing::info!(
                    package = %self.name,
                    from = %self.version,
                    to = %latest,
                    "updating package"
                );
            }
            self.install_version(&latest).await?;
            true
        };

        self.version = latest;
        Ok(installed)
    }

    /// Absolute path of the entry point declared in the package manifest
    ///
    /// Searches from the cache entry (cache mode) or `target_path` (direct
    /// mode) upwards for a `package.json`. Pure read.
    pub fn entry_point_path(&self) -> Result<Option<PathBuf>> {
        manifest::entry_point(&self.root_path())
    }

    async fn resolve_latest(&self) -> Result<String> {
        self.registry
            .resolve_latest(&self.name)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no published versions of {} on {}",
                    self.name,
                    self.registry.base_url()
                ))
            })
    }

    fn require_cache_entry(&self, version: &str) -> Result<PathBuf> {
        self.cache_entry_for(version).ok_or_else(|| {
            Error::Config(format!(
                "{} has no store directory; packages at a target path are not installed",
                self.name
            ))
        })
    }

    async fn install_version(&self, version: &str) -> Result<()> {
        let entry = self.require_cache_entry(version)?;
        if version::parse_version(version).is_err() {
            return Err(Error::Config(format!(
                "cannot install {}@{}: not a semver version",
                self.name, version
            )));
        }

        tracing::info!(package = %self.name, version, "installing package");

        let dist = self.registry.dist(&self.name, version).await?;
        let bytes = self.registry.download(&dist).await?;
        tarball::verify_integrity(&bytes, &dist)?;

        // Extract next to the entry and swap it in, so an interrupted install
        // never leaves a half-populated cache entry behind
        let staging = staging_path(&entry);
        let staging_for_task = staging.clone();
        let unpacked = tokio::task::spawn_blocking(move || {
            if staging_for_task.exists() {
                std::fs::remove_dir_all(&staging_for_task)
                    .map_err(|e| Error::io(&staging_for_task, e))?;
            }
            tarball::unpack(&bytes, &staging_for_task)
        })
        .await
        .map_err(|e| Error::Install(format!("extraction task failed: {}", e)))
        .and_then(|result| result);
        if let Err(e) = unpacked {
            discard_staging(&staging).await;
            return Err(e);
        }

        if entry.exists() {
            if let Err(e) = fs::remove_dir_all(&entry).await {
                discard_staging(&staging).await;
                return Err(Error::io(&entry, e));
            }
        }
        promote_staging(&staging, &entry).await?;

        if let Some(store_dir) = &self.store_dir {
            link_into_store(store_dir, &self.name, &entry).await?;
        }

        tracing::debug!(entry = %entry.display(), "package installed");
        Ok(())
    }
}

fn staging_path(entry: &Path) -> PathBuf {
    let name = entry
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    entry.with_file_name(format!(".{}.partial-{}", name, std::process::id()))
}

/// Rename `staging` to `entry`
///
/// When another process created `entry` first, its copy is kept and ours is
/// dropped.
async fn promote_staging(staging: &Path, entry: &Path) -> Result<()> {
    match fs::rename(staging, entry).await {
        Ok(()) => Ok(()),
        Err(e) if entry.exists() => {
            tracing::debug!(entry = %entry.display(), error = %e, "cache entry installed concurrently, keeping it");
            discard_staging(staging).await;
            Ok(())
        }
        Err(e) => {
            discard_staging(staging).await;
            Err(Error::io(entry, e))
        }
    }
}

async fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %staging.display(), error = %e, "failed to remove staging directory");
        }
    }
}

/// Point `<store_dir>/<name>` at the freshly installed entry
#[cfg(unix)]
async fn link_into_store(store_dir: &Path, name: &str, entry: &Path) -> Result<()> {
    let link = store::link_path(store_dir, name);
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    if fs::symlink_metadata(&link).await.is_ok() {
        fs::remove_file(&link)
            .await
            .map_err(|e| Error::io(&link, e))?;
    }
    fs::symlink(entry, &link)
        .await
        .map_err(|e| Error::io(&link, e))
}

#[cfg(not(unix))]
async fn link_into_store(_store_dir: &Path, _name: &str, _entry: &Path) -> Result<()> {
    Ok(())
}
