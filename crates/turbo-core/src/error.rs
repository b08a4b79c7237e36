//! Error kinds surfaced by the scaffolding core
//!
//! Library components return [`Result`]; the orchestration layer wraps these in
//! `anyhow` with extra context before they reach the top-level handler.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid options when building a component
    #[error("configuration error: {0}")]
    Config(String),

    /// Registry lookup failed (network error or non-success response)
    #[error("registry error: {message}")]
    Registry {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Package download, verification or extraction failed
    #[error("install error: {0}")]
    Install(String),

    /// Something required was not there (catalog, entry point, version, binary)
    #[error("{0}")]
    NotFound(String),

    /// User-supplied value rejected by a validator
    #[error("{0}")]
    Validation(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Template-supplied command whose program is not on the allow-list
    #[error("command rejected: '{0}' is not an allowed command")]
    CommandRejected(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
            source: None,
        }
    }

    pub fn registry_with(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Registry {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
