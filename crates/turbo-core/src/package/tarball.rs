//! Package tarball verification and extraction
//!
//! npm tarballs are gzip'd tar archives whose entries all live under a single
//! root folder (`package/` for anything published by the npm CLI). That root
//! is stripped so the package files land directly in the cache entry.

use crate::error::{Error, Result};
use crate::registry::Dist;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha512};
use std::path::{Component, Path, PathBuf};
use tar::Archive;

/// Check `bytes` against the `sha512-` entries of the dist integrity string
///
/// Nothing to check (no integrity, or only non-sha512 algorithms) passes.
pub fn verify_integrity(bytes: &[u8], dist: &Dist) -> Result<()> {
    let Some(integrity) = dist.integrity.as_deref() else {
        tracing::debug!(tarball = %dist.tarball, "no integrity published, skipping check");
        return Ok(());
    };

    let expected: Vec<&str> = integrity
        .split_whitespace()
        .filter_map(|entry| entry.strip_prefix("sha512-"))
        .map(|digest| digest.split('?').next().unwrap_or(digest))
        .collect();

    if expected.is_empty() {
        tracing::debug!(integrity, "no sha512 digest in integrity, skipping check");
        return Ok(());
    }

    let computed = STANDARD.encode(Sha512::digest(bytes));
    if expected.iter().any(|digest| *digest == computed) {
        Ok(())
    } else {
        Err(Error::Install(format!(
            "integrity check failed for {}\n\
             \n\
             Expected: sha512-{}\n\
             Got:      sha512-{}",
            dist.tarball,
            expected.join(" sha512-"),
            computed
        )))
    }
}

/// Extract a gzip'd tarball into `dest_dir`, stripping the shared root folder
pub fn unpack(bytes: &[u8], dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir).map_err(|e| Error::io(dest_dir, e))?;

    let strip_prefix = common_root(bytes)?;

    let mut archive = Archive::new(GzDecoder::new(bytes));
    let entries = archive
        .entries()
        .map_err(|e| Error::Install(format!("failed to read tarball entries: {}", e)))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::Install(format!("failed to read tarball entry: {}", e)))?;
        let entry_path = entry
            .path()
            .map_err(|e| Error::Install(format!("invalid tarball entry path: {}", e)))?
            .into_owned();

        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::Install(format!(
                "refusing to extract path with parent directory or absolute reference: {}",
                entry_path.display()
            )));
        }

        let relative_path = match &strip_prefix {
            Some(prefix) => match entry_path.strip_prefix(prefix) {
                Ok(p) if p.as_os_str().is_empty() => continue,
                Ok(p) => p.to_path_buf(),
                Err(_) => entry_path.clone(),
            },
            None => entry_path.clone(),
        };

        let output_path = dest_dir.join(&relative_path);
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            std::fs::create_dir_all(&output_path).map_err(|e| Error::io(&output_path, e))?;
        } else if entry_type.is_file() {
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            entry
                .unpack(&output_path)
                .map_err(|e| Error::io(&output_path, e))?;
        } else {
            // Links and special files are never part of a published package
            tracing::debug!(path = %entry_path.display(), "skipping non-regular tarball entry");
        }
    }

    Ok(())
}

/// Root folder shared by every entry, if there is one and it contains files
fn common_root(bytes: &[u8]) -> Result<Option<PathBuf>> {
    let mut archive = Archive::new(GzDecoder::new(bytes));
    let entries = archive
        .entries()
        .map_err(|e| Error::Install(format!("failed to read tarball entries: {}", e)))?;

    let mut common: Option<PathBuf> = None;
    let mut has_nested_entries = false;

    for entry in entries {
        let entry =
            entry.map_err(|e| Error::Install(format!("failed to read tarball entry: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| Error::Install(format!("invalid tarball entry path: {}", e)))?;

        if path.components().count() > 1 {
            has_nested_entries = true;
        }

        let Some(first) = path.components().next() else {
            continue;
        };
        let root = PathBuf::from(first.as_os_str());

        match &common {
            None => common = Some(root),
            Some(existing) if existing != &root => return Ok(None),
            Some(_) => {}
        }
    }

    Ok(if has_nested_entries { common } else { None })
}
