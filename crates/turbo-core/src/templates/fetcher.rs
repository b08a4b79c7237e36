//! Template catalog fetching from a remote URL or a local file
//!
//! The catalog is a JSON or YAML list of [`TemplateInfo`] entries. It is read
//! once per run and never modified.

use super::manifest::{CatalogDocument, TemplateInfo};
use crate::config::CliConfig;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tokio::fs;
use url::Url;

/// File name looked up when the local source is a directory
pub const CATALOG_FILE: &str = "catalog.yaml";

/// Template source - either remote URL or local file/directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// `http(s)://` values are remote, anything else is a local path
    pub fn from_value(value: &str) -> Result<Self> {
        if value.starts_with("http://") || value.starts_with("https://") {
            let url = Url::parse(value)
                .map_err(|e| Error::Config(format!("invalid template URL '{}': {}", value, e)))?;
            Ok(Self::Remote(url))
        } else {
            Ok(Self::Local(PathBuf::from(value)))
        }
    }
}

/// Template catalog fetcher
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.template_source.clone(), &config.user_agent)
    }

    /// Fetch every template in the catalog; an empty catalog is an error
    pub async fn fetch_catalog(&self) -> Result<Vec<TemplateInfo>> {
        let content = match &self.source {
            TemplateSource::Remote(url) => {
                tracing::debug!(%url, "fetching template catalog");
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| {
                        Error::registry_with(format!("failed to fetch template catalog from {}", url), e)
                    })?;

                if !response.status().is_success() {
                    return Err(Error::registry(format!(
                        "failed to fetch template catalog from {}: HTTP {}",
                        url,
                        response.status()
                    )));
                }

                response.text().await.map_err(|e| {
                    Error::registry_with(format!("failed to read template catalog from {}", url), e)
                })?
            }
            TemplateSource::Local(path) => {
                let file = if path.is_dir() {
                    path.join(CATALOG_FILE)
                } else {
                    path.clone()
                };
                tracing::debug!(path = %file.display(), "reading local template catalog");
                fs::read_to_string(&file)
                    .await
                    .map_err(|e| Error::io(&file, e))?
            }
        };

        let templates = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str::<CatalogDocument>(&content)
                .map_err(|e| Error::registry(format!("failed to parse template catalog: {}", e)))?
                .into_templates()
        };

        if templates.is_empty() {
            return Err(Error::NotFound("no project templates are available".into()));
        }

        Ok(templates)
    }

    /// Get the template source
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }
}
