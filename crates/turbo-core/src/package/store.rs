//! On-disk layout of the shared package store
//!
//! ```text
//! <store_dir>/
//!   .store/
//!     <escaped-name>@<version>/
//!       node_modules/
//!         <name>/            # extracted package (cache entry)
//!   <name> -> .store/...     # link created for the install root
//! ```
//!
//! The layout matches what `npminstall` produces, so caches written by the
//! Node tooling are picked up as-is.

use std::path::{Path, PathBuf};

const STORE_DIR: &str = ".store";
const PACKAGE_ROOT: &str = "node_modules";

/// Replace the scope separator so the name fits in one path segment
pub fn escape_name(name: &str) -> String {
    name.replace('/', "+")
}

/// Directory holding the extracted files of `name@version`
///
/// Pure function of its inputs; this is the cache key.
pub fn cache_entry_path(store_dir: &Path, name: &str, version: &str) -> PathBuf {
    let mut path = store_dir
        .join(STORE_DIR)
        .join(format!("{}@{}", escape_name(name), version))
        .join(PACKAGE_ROOT);
    for segment in name.split('/') {
        path.push(segment);
    }
    path
}

/// Where the install root exposes the package (`<store_dir>/<name>`)
pub fn link_path(store_dir: &Path, name: &str) -> PathBuf {
    let mut path = store_dir.to_path_buf();
    for segment in name.split('/') {
        path.push(segment);
    }
    path
}
