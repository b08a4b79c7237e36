//! Semver parsing helpers shared by the registry lookup and project prompts

use crate::error::{Error, Result};
use semver::Version;

/// Parse version string, accepting a leading `v` and surrounding whitespace
pub fn parse_version(version_str: &str) -> Result<Version> {
    let trimmed = version_str.trim();
    let cleaned = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    Version::parse(cleaned)
        .map_err(|e| Error::Validation(format!("invalid version '{}': {}", version_str, e)))
}

/// Canonical form of a version string, `None` if it is not semver
pub fn normalize_version(version_str: &str) -> Option<String> {
    parse_version(version_str).ok().map(|v| v.to_string())
}

/// True when `candidate` is strictly newer than `current`; unparsable input compares as not newer
pub fn is_newer(candidate: &str, current: &str) -> bool {
    match (parse_version(candidate), parse_version(current)) {
        (Ok(candidate), Ok(current)) => candidate > current,
        _ => false,
    }
}
