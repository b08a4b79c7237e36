//! `package.json` discovery and entry point resolution

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

/// The fields of `package.json` the CLI reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// Declared entry point, relative to the manifest directory
    #[serde(default)]
    pub main: Option<String>,
}

impl PackageManifest {
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Install(format!("malformed {}: {}", path.display(), e)))
    }
}

/// Nearest directory at or above `start` that holds a `package.json`
pub fn find_package_root(start: &Path) -> Option<PathBuf> {
    let start = std::path::absolute(start).ok()?;
    start
        .ancestors()
        .find(|dir| dir.join(MANIFEST_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Absolute path of the entry point declared by the package containing `start`
///
/// `Ok(None)` when no manifest is found or it declares no `main`. A manifest
/// that exists but cannot be parsed is an error.
pub fn entry_point(start: &Path) -> Result<Option<PathBuf>> {
    let Some(root) = find_package_root(start) else {
        tracing::debug!(start = %start.display(), "no package.json found");
        return Ok(None);
    };

    let manifest = PackageManifest::read(&root)?;
    let Some(main) = manifest.main.filter(|m| !m.trim().is_empty()) else {
        tracing::debug!(root = %root.display(), "package.json declares no main");
        return Ok(None);
    };

    Ok(Some(normalize_path(&root.join(main.replace('\\', "/")))))
}

/// Collapse `.` and `..` components without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
