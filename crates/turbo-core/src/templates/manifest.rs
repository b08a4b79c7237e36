//! Template catalog entry types and parsing

use crate::project::ProjectType;
use serde::{Deserialize, Serialize};

/// How a template package is turned into project files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// Copy the package's `template/` directory and render it
    #[default]
    Normal,
    /// Template-provided install logic; not supported yet
    Custom,
}

/// One scaffoldable template published as an npm package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    /// Display name
    pub name: String,

    /// npm package holding the template
    pub npm_name: String,

    /// Exact version, or `latest`
    pub version: String,

    /// Project types this template can create
    #[serde(default)]
    pub tag: Vec<ProjectType>,

    #[serde(default, rename = "type")]
    pub kind: TemplateType,

    /// Dependency install command run in the new project (e.g. `npm install`)
    #[serde(default)]
    pub install_command: Option<String>,

    /// Command starting the new project (e.g. `npm run serve`)
    #[serde(default)]
    pub start_command: Option<String>,

    /// Glob patterns (relative to the project root) excluded from rendering
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl TemplateInfo {
    pub fn supports(&self, kind: ProjectType) -> bool {
        self.tag.contains(&kind)
    }
}

/// Catalog payload: a bare list or `{ templates: [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    List(Vec<TemplateInfo>),
    Wrapped { templates: Vec<TemplateInfo> },
}

impl CatalogDocument {
    pub fn into_templates(self) -> Vec<TemplateInfo> {
        match self {
            CatalogDocument::List(templates) => templates,
            CatalogDocument::Wrapped { templates } => templates,
        }
    }
}

/// Templates usable for `kind`, in catalog order
pub fn templates_for(catalog: &[TemplateInfo], kind: ProjectType) -> Vec<&TemplateInfo> {
    catalog.iter().filter(|t| t.supports(kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"[
        {
            "name": "Vue 3 standard",
            "npmName": "@turbo-cli-dev/template-vue3",
            "version": "1.0.0",
            "tag": ["project"],
            "type": "normal",
            "installCommand": "npm install",
            "startCommand": "npm run serve",
            "ignore": ["**/public/**"]
        },
        {
            "name": "Component library",
            "npmName": "@turbo-cli-dev/template-components",
            "version": "latest",
            "tag": ["component"]
        },
        {
            "name": "Scripted",
            "npmName": "@turbo-cli-dev/template-scripted",
            "version": "0.1.0",
            "tag": ["project", "component"],
            "type": "custom"
        }
    ]"#;

    #[test]
    fn test_parse_json_catalog() {
        let catalog: CatalogDocument = serde_yaml::from_str(CATALOG_JSON).unwrap();
        let templates = catalog.into_templates();

        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].npm_name, "@turbo-cli-dev/template-vue3");
        assert_eq!(templates[0].install_command.as_deref(), Some("npm install"));
        assert_eq!(templates[0].ignore, vec!["**/public/**"]);
        assert_eq!(templates[1].kind, TemplateType::Normal);
        assert!(templates[1].ignore.is_empty());
        assert_eq!(templates[2].kind, TemplateType::Custom);
    }

    #[test]
    fn test_parse_wrapped_yaml_catalog() {
        let yaml = "templates:\n  - name: Demo\n    npmName: demo-template\n    version: 1.0.0\n    tag: [project]\n";
        let catalog: CatalogDocument = serde_yaml::from_str(yaml).unwrap();
        let templates = catalog.into_templates();
        assert_eq!(templates.len(), 1);
        assert!(templates[0].supports(ProjectType::Project));
    }

    #[test]
    fn test_filter_by_tag() {
        let templates = serde_yaml::from_str::<CatalogDocument>(CATALOG_JSON)
            .unwrap()
            .into_templates();

        let projects: Vec<_> = templates_for(&templates, ProjectType::Project)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(projects, vec!["Vue 3 standard", "Scripted"]);

        let components = templates_for(&templates, ProjectType::Component);
        assert_eq!(components.len(), 2);
    }
}
