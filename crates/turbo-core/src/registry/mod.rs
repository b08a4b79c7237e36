//! npm-compatible registry lookups
//!
//! Resolves published versions of a package and the tarball for a given
//! version. The registry base URL is fixed per client; build a second client to
//! query a different registry.

pub mod document;

use crate::config::CliConfig;
use crate::error::{Error, Result};
use crate::version::parse_version;
use semver::Version;
use url::Url;

pub use document::{Dist, PackageDocument, VersionMetadata};

/// Client for one registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: Url,
    client: reqwest::Client,
}

impl RegistryClient {
    pub fn new(base_url: Url, user_agent: &str) -> Self {
        Self {
            base_url,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.registry.clone(), &config.user_agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Metadata URL for a package; a scope separator is sent as `%2F`
    pub fn package_url(&self, name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("registry URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Fetch the full metadata document for `name`
    pub async fn package_document(&self, name: &str) -> Result<PackageDocument> {
        if name.is_empty() {
            return Err(Error::Config("package name must not be empty".into()));
        }

        let url = self.package_url(name)?;
        tracing::debug!(%url, "fetching registry metadata");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::registry_with(format!("failed to reach {}", url), e))?;

        if !response.status().is_success() {
            return Err(Error::registry(format!(
                "failed to fetch {} from {}: HTTP {}",
                name,
                url,
                response.status()
            )));
        }

        response
            .json::<PackageDocument>()
            .await
            .map_err(|e| Error::registry_with(format!("invalid registry metadata for {}", name), e))
    }

    /// All published version strings of `name`
    pub async fn list_versions(&self, name: &str) -> Result<Vec<String>> {
        let document = self.package_document(name).await?;
        Ok(document.versions.into_keys().collect())
    }

    /// Highest published version by semver precedence, `None` if nothing is published
    pub async fn resolve_latest(&self, name: &str) -> Result<Option<String>> {
        let versions = self.list_versions(name).await?;
        let latest = latest_version(&versions);
        tracing::debug!(package = name, latest = ?latest, "resolved latest version");
        Ok(latest)
    }

    /// Download location for an exact version
    pub async fn dist(&self, name: &str, version: &str) -> Result<Dist> {
        let document = self.package_document(name).await?;
        document
            .versions
            .get(version)
            .and_then(|meta| meta.dist.clone())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{}@{} is not published on {}",
                    name, version, self.base_url
                ))
            })
    }

    /// Download the tarball a [`Dist`] points at
    pub async fn download(&self, dist: &Dist) -> Result<Vec<u8>> {
        tracing::debug!(tarball = %dist.tarball, "downloading package tarball");

        let response = self
            .client
            .get(&dist.tarball)
            .send()
            .await
            .map_err(|e| Error::Install(format!("failed to download {}: {}", dist.tarball, e)))?;

        if !response.status().is_success() {
            return Err(Error::Install(format!(
                "failed to download {}: HTTP {}",
                dist.tarball,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Install(format!("failed to read {}: {}", dist.tarball, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Pick the semver-greatest entry; strings that are not semver are ignored
pub fn latest_version<S: AsRef<str>>(versions: &[S]) -> Option<String> {
    let mut parsed: Vec<(Version, &str)> = versions
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            parse_version(raw).ok().map(|v| (v, raw))
        })
        .collect();

    parsed.sort_by(|a, b| b.0.cmp(&a.0));
    parsed.first().map(|(_, raw)| raw.to_string())
}
