//! Registry metadata document (`GET <registry>/<name>`)

use serde::Deserialize;
use std::collections::BTreeMap;

/// The subset of an npm packument the CLI reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDocument {
    #[serde(default)]
    pub name: String,

    /// Published versions keyed by semver string
    #[serde(default)]
    pub versions: BTreeMap<String, VersionMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionMetadata {
    #[serde(default)]
    pub dist: Option<Dist>,
}

/// Where to download one version and how to check it
#[derive(Debug, Clone, Deserialize)]
pub struct Dist {
    pub tarball: String,

    /// Subresource-integrity string, e.g. `sha512-<base64>`
    #[serde(default)]
    pub integrity: Option<String>,
}
