//! Project metadata collected by the init wizard

use crate::error::{Error, Result};
use crate::version::normalize_version;
use heck::ToKebabCase;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PROJECT_VERSION: &str = "1.0.0";

/// What is being scaffolded; also the tag a template must carry to be offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Project,
    Component,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Project => "project",
            ProjectType::Component => "component",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectType::Project => "Project",
            ProjectType::Component => "Component",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated scaffolding parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub kind: ProjectType,
    pub project_name: String,
    pub project_version: String,
    /// `npmName` of the chosen template
    pub project_template: String,
    /// Required for components, `None` for projects
    pub component_description: Option<String>,
    pub class_name: String,
}

impl ProjectInfo {
    pub fn new(
        kind: ProjectType,
        project_name: &str,
        project_version: &str,
        project_template: &str,
        component_description: Option<&str>,
    ) -> Result<Self> {
        validate_name(project_name)?;
        let project_version = validate_version(project_version)?;

        let component_description = match kind {
            ProjectType::Component => {
                let description = component_description.unwrap_or_default();
                validate_description(description)?;
                Some(description.trim().to_string())
            }
            ProjectType::Project => None,
        };

        if project_template.trim().is_empty() {
            return Err(Error::Validation("a template must be selected".into()));
        }

        Ok(Self {
            kind,
            project_name: project_name.to_string(),
            project_version,
            project_template: project_template.to_string(),
            component_description,
            class_name: class_name(project_name),
        })
    }

    /// Variables available to template files
    pub fn render_context(&self) -> TemplateContext {
        let description = self.component_description.clone().unwrap_or_default();
        TemplateContext {
            kind: self.kind,
            project_name: self.project_name.clone(),
            name: self.project_name.clone(),
            class_name: self.class_name.clone(),
            project_version: self.project_version.clone(),
            version: self.project_version.clone(),
            project_template: self.project_template.clone(),
            component_description: description.clone(),
            description,
        }
    }
}

/// Render context; `name`, `version` and `description` alias the long names
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext {
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub project_name: String,
    pub name: String,
    pub class_name: String,
    pub project_version: String,
    pub version: String,
    pub project_template: String,
    pub component_description: String,
    pub description: String,
}

/// Project names start with a letter, end with a letter or digit, and every
/// `-` or `_` is followed by a letter.
///
/// Valid: `a`, `a-b`, `a_b`, `a-b1-c1`. Invalid: `1`, `a_`, `a-`, `a_1`, `a-1`.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(first) = bytes.first() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| match b {
        b'-' | b'_' => bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic),
        b => b.is_ascii_alphanumeric(),
    })
}

pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "'{}' is not a valid name: use letters, digits, '-' or '_', start with a letter, \
             and follow each '-' or '_' with a letter",
            name
        )))
    }
}

/// Normalized semver for a user-entered version (`v1.0.0` becomes `1.0.0`)
pub fn validate_version(version: &str) -> Result<String> {
    normalize_version(version)
        .ok_or_else(|| Error::Validation(format!("'{}' is not a valid version", version)))
}

pub fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        Err(Error::Validation("component description must not be empty".into()))
    } else {
        Ok(())
    }
}

/// Kebab-case class name derived from the project name, no leading dash
pub fn class_name(project_name: &str) -> String {
    project_name
        .to_kebab_case()
        .trim_start_matches('-')
        .to_string()
}
