//! `init`: scaffold a project or component from a catalog template

use super::{Choice, Command, NoteKind, Prompter};
use crate::config::CliConfig;
use crate::error::Error;
use crate::project::{self, ProjectInfo, ProjectType, DEFAULT_PROJECT_VERSION};
use crate::runtime::exec_command;
use crate::templates::{
    fetch_template, templates_for, FetchOutcome, TemplateFetcher, TemplateInfo, TemplateInstaller,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

const NODE_MODULES: &str = "node_modules";

#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    pub project_name: Option<String>,
    /// Skip the first "continue?" prompt for a non-empty directory
    pub force: bool,
    /// Directory the project is created in
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct InitState {
    /// Only kept when valid; an invalid name is asked for again
    pub project_name: Option<String>,
    pub force: bool,
    pub directory: PathBuf,
}

/// How a run of `init` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(ProjectInfo),
    /// The user declined to continue in a non-empty directory
    Cancelled,
}

pub struct InitCommand<'a, P: Prompter> {
    config: &'a CliConfig,
    prompter: P,
}

impl<'a, P: Prompter> InitCommand<'a, P> {
    pub fn new(config: &'a CliConfig, prompter: P) -> Self {
        Self { config, prompter }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Returns `false` when the user wants to stop
    async fn prepare_directory(&mut self, state: &InitState) -> Result<bool> {
        if is_dir_empty(&state.directory).await? {
            return Ok(true);
        }

        if !state.force {
            let proceed = self.prompter.confirm(
                "The current directory is not empty. Continue creating the project?",
                false,
            )?;
            if !proceed {
                return Ok(false);
            }
        }

        let wipe = self.prompter.confirm(
            "Delete every file in the current directory? This cannot be undone.",
            false,
        )?;
        if wipe {
            empty_dir(&state.directory).await?;
            self.prompter
                .note(NoteKind::Info, &format!("Emptied {}", state.directory.display()))?;
        }
        Ok(true)
    }

    fn collect_project_info(
        &mut self,
        state: &InitState,
        catalog: &[TemplateInfo],
    ) -> Result<ProjectInfo> {
        let types = [ProjectType::Project, ProjectType::Component];
        let type_choices: Vec<Choice> = types
            .iter()
            .map(|t| Choice::new(t.display_name(), ""))
            .collect();
        let kind = types[self.prompter.select("Select what to create", &type_choices)?];

        let templates = templates_for(catalog, kind);
        if templates.is_empty() {
            return Err(Error::NotFound(format!("no {} templates are available", kind)).into());
        }

        let label = kind.display_name();
        let name = match &state.project_name {
            Some(name) => name.clone(),
            None => self.prompter.input(
                &format!("{} name", label),
                None,
                name_validator,
            )?,
        };

        let version = self.prompter.input(
            &format!("{} version", label),
            Some(DEFAULT_PROJECT_VERSION),
            version_validator,
        )?;

        let description = match kind {
            ProjectType::Component => Some(self.prompter.input(
                "Component description",
                None,
                description_validator,
            )?),
            ProjectType::Project => None,
        };

        let template_choices: Vec<Choice> = templates
            .iter()
            .map(|t| Choice::new(&t.name, format!("{}@{}", t.npm_name, t.version)))
            .collect();
        let template = templates[self
            .prompter
            .select(&format!("Select a {} template", kind), &template_choices)?];

        Ok(ProjectInfo::new(
            kind,
            &name,
            &version,
            &template.npm_name,
            description.as_deref(),
        )?)
    }

    async fn install_template(
        &mut self,
        state: &InitState,
        template: &TemplateInfo,
        project: &ProjectInfo,
    ) -> Result<()> {
        self.prompter.progress_start("Downloading template...");
        let (package, outcome) = match fetch_template(self.config, template).await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.prompter.progress_fail("Template download failed");
                return Err(e).with_context(|| format!("failed to fetch {}", template.npm_name));
            }
        };
        self.prompter.progress_stop(match outcome {
            FetchOutcome::Installed => "Template downloaded",
            FetchOutcome::Updated => "Template updated",
            FetchOutcome::UpToDate => "Template is up to date",
        });

        self.prompter.progress_start("Installing template...");
        let mut installer = TemplateInstaller::new(template, project);
        if let Err(e) = installer.install(&package.root_path(), &state.directory).await {
            self.prompter.progress_fail("Template installation failed");
            return Err(e).context("failed to install the template");
        }
        self.prompter.progress_stop("Template installed");

        if self.config.run_template_commands {
            self.run_template_commands(state, template).await?;
        }
        Ok(())
    }

    async fn run_template_commands(&mut self, state: &InitState, template: &TemplateInfo) -> Result<()> {
        let allow_list = self.config.command_allow_list.as_slice();
        if let Some(install) = &template.install_command {
            exec_command(install, &state.directory, allow_list)
                .await
                .context("dependency installation failed")?;
        }
        if let Some(start) = &template.start_command {
            exec_command(start, &state.directory, allow_list)
                .await
                .context("start command failed")?;
        }
        Ok(())
    }
}

impl<P: Prompter> Command for InitCommand<'_, P> {
    type Args = InitArgs;
    type State = InitState;
    type Output = InitOutcome;

    fn init(&self, args: InitArgs) -> Result<InitState> {
        let project_name = args
            .project_name
            .filter(|name| project::is_valid_name(name));
        tracing::debug!(?project_name, force = args.force, directory = %args.directory.display(), "init arguments");

        Ok(InitState {
            project_name,
            force: args.force,
            directory: args.directory,
        })
    }

    async fn exec(&mut self, state: InitState) -> Result<InitOutcome> {
        self.prompter.intro("Create a new project")?;

        let catalog = TemplateFetcher::from_config(self.config)
            .fetch_catalog()
            .await
            .context("failed to load the template catalog")?;

        if !self.prepare_directory(&state).await? {
            self.prompter.outro("Cancelled")?;
            return Ok(InitOutcome::Cancelled);
        }

        let project = self.collect_project_info(&state, &catalog)?;
        tracing::debug!(?project, "project info");

        let template = catalog
            .iter()
            .find(|t| t.npm_name == project.project_template)
            .ok_or_else(|| Error::NotFound(format!("template {} not found", project.project_template)))?;

        self.install_template(&state, template, &project).await?;

        self.prompter.outro(&format!(
            "Created {} {}@{}",
            project.kind, project.project_name, project.project_version
        ))?;
        Ok(InitOutcome::Created(project))
    }
}

/// Empty means no entries besides dotfiles and `node_modules`
pub async fn is_dir_empty(dir: &Path) -> Result<bool> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(Error::io(dir, e).into()),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io(dir, e))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with('.') && name != NODE_MODULES {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Remove everything inside `dir`, keeping `dir` itself
async fn empty_dir(dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| Error::io(dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io(dir, e))?
    {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| Error::io(&path, e))?;
        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        removed.map_err(|e| Error::io(&path, e))?;
    }
    Ok(())
}

fn name_validator(value: &str) -> std::result::Result<(), String> {
    project::validate_name(value).map_err(|e| e.to_string())
}

fn version_validator(value: &str) -> std::result::Result<(), String> {
    project::validate_version(value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn description_validator(value: &str) -> std::result::Result<(), String> {
    project::validate_description(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{Answer, ScriptedPrompter};
    use crate::config::{Env, GlobalFlags};
    use crate::package::tarball::tests::{npm_tarball, sri};
    use crate::product::testing::TestProduct;

    const CATALOG: &str = "\
- name: Demo
  npmName: demo-template
  version: 1.0.0
  tag: [project]
- name: Widget
  npmName: widget-template
  version: 1.0.0
  tag: [component]
";

    struct Fixture {
        home: tempfile::TempDir,
        workdir: tempfile::TempDir,
        config: CliConfig,
    }

    fn fixture(catalog: &str, registry: &str) -> Fixture {
        let home = tempfile::tempdir().unwrap();
        let catalog_path = home.path().join("catalog.yaml");
        std::fs::write(&catalog_path, catalog).unwrap();

        let env = Env::from_pairs([
            ("CLI_REGISTRY", registry.to_string()),
            ("CLI_TEMPLATE_URL", catalog_path.display().to_string()),
        ]);
        let config =
            CliConfig::resolve(&TestProduct, home.path(), &env, &GlobalFlags::default()).unwrap();

        Fixture {
            home,
            workdir: tempfile::tempdir().unwrap(),
            config,
        }
    }

    fn args(fixture: &Fixture, name: Option<&str>, force: bool) -> InitArgs {
        InitArgs {
            project_name: name.map(str::to_string),
            force,
            directory: fixture.workdir.path().to_path_buf(),
        }
    }

    async fn serve_template(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
        let tarball = npm_tarball(&[
            ("package.json", r#"{"name":"demo-template","version":"1.0.0"}"#),
            (
                "template/package.json",
                "{\n  \"name\": \"<%= name %>\",\n  \"version\": \"<%= version %>\"\n}\n",
            ),
            ("template/README.md", "# <%= projectName %>\n"),
            ("template/static/logo.txt", "no placeholders here\n"),
        ]);
        let document = format!(
            r#"{{"name":"demo-template","versions":{{"1.0.0":{{"dist":{{"tarball":"{}/demo-template-1.0.0.tgz","integrity":"{}"}}}}}}}}"#,
            server.url(),
            sri(&tarball)
        );
        vec![
            server
                .mock("GET", "/demo-template")
                .with_status(200)
                .with_body(document)
                .create_async()
                .await,
            server
                .mock("GET", "/demo-template-1.0.0.tgz")
                .with_status(200)
                .with_body(tarball)
                .create_async()
                .await,
        ]
    }

    #[tokio::test]
    async fn test_init_in_empty_directory() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = serve_template(&mut server).await;
        let fx = fixture(CATALOG, &server.url());

        let prompter = ScriptedPrompter::new([
            Answer::Select("Project"),
            Answer::Input(""),
            Answer::Select("Demo"),
        ]);
        let mut command = InitCommand::new(&fx.config, prompter);
        let outcome = command.run(args(&fx, Some("demo"), false)).await.unwrap();

        let InitOutcome::Created(project) = outcome else {
            panic!("expected a created project");
        };
        assert_eq!(project.project_name, "demo");
        assert_eq!(project.project_version, "1.0.0");

        let prompter = command.prompter();
        assert_eq!(prompter.remaining(), 0);
        assert!(!prompter.asked.iter().any(|q| q.contains("not empty")));

        let dir = fx.workdir.path();
        assert_eq!(
            std::fs::read_to_string(dir.join("package.json")).unwrap(),
            "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\"\n}\n"
        );
        assert_eq!(std::fs::read_to_string(dir.join("README.md")).unwrap(), "# demo\n");
        assert!(dir.join("static/logo.txt").is_file());
        assert!(fx.home.path().join(".turbo-test/template/node_modules/.store").is_dir());
    }

    #[tokio::test]
    async fn test_declining_non_empty_directory_cancels() {
        let fx = fixture(CATALOG, "http://127.0.0.1:1");
        std::fs::write(fx.workdir.path().join("notes.txt"), "keep me").unwrap();

        let prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        let mut command = InitCommand::new(&fx.config, prompter);
        let outcome = command.run(args(&fx, Some("demo"), false)).await.unwrap();

        assert_eq!(outcome, InitOutcome::Cancelled);
        assert_eq!(command.prompter().asked.len(), 1);
        assert!(fx.workdir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_force_still_asks_before_emptying() {
        let fx = fixture(CATALOG, "http://127.0.0.1:1");
        let dir = fx.workdir.path();
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::write(dir.join("src/old.js"), "").unwrap();
        std::fs::write(dir.join(".env"), "").unwrap();

        let state = InitState {
            project_name: None,
            force: true,
            directory: dir.to_path_buf(),
        };
        let mut command = InitCommand::new(&fx.config, ScriptedPrompter::new([Answer::Confirm(true)]));

        assert!(command.prepare_directory(&state).await.unwrap());
        assert_eq!(command.prompter().asked.len(), 1);
        assert!(command.prompter().asked[0].contains("Delete"));
        assert!(std::fs::read_dir(dir).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_declining_wipe_keeps_files() {
        let fx = fixture(CATALOG, "http://127.0.0.1:1");
        let dir = fx.workdir.path();
        std::fs::write(dir.join("main.js"), "").unwrap();

        let state = InitState {
            project_name: None,
            force: false,
            directory: dir.to_path_buf(),
        };
        let mut command = InitCommand::new(
            &fx.config,
            ScriptedPrompter::new([Answer::Confirm(true), Answer::Confirm(false)]),
        );

        assert!(command.prepare_directory(&state).await.unwrap());
        assert!(dir.join("main.js").exists());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_fatal() {
        let fx = fixture("[]", "http://127.0.0.1:1");
        let mut command = InitCommand::new(&fx.config, ScriptedPrompter::default());

        let err = command.run(args(&fx, Some("demo"), false)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotFound(_))
        ));
        assert!(command.prompter().asked.is_empty());
    }

    #[test]
    fn test_invalid_name_argument_is_dropped() {
        let fx = fixture(CATALOG, "http://127.0.0.1:1");
        let command = InitCommand::new(&fx.config, ScriptedPrompter::default());

        let state = command.init(args(&fx, Some("1test"), false)).unwrap();
        assert_eq!(state.project_name, None);

        let state = command.init(args(&fx, Some("my-app"), true)).unwrap();
        assert_eq!(state.project_name.as_deref(), Some("my-app"));
        assert!(state.force);
    }

    #[test]
    fn test_wizard_reprompts_and_filters_by_tag() {
        let fx = fixture(CATALOG, "http://127.0.0.1:1");
        let catalog: Vec<TemplateInfo> = serde_yaml::from_str(CATALOG).unwrap();
        let state = InitState {
            project_name: None,
            force: false,
            directory: fx.workdir.path().to_path_buf(),
        };

        let prompter = ScriptedPrompter::new([
            Answer::Select("Component"),
            Answer::Input("test_1"),
            Answer::Input("button"),
            Answer::Input("1.0"),
            Answer::Input("v2.0.0"),
            Answer::Input(""),
            Answer::Input("A clickable button"),
            Answer::Select("Widget"),
        ]);
        let mut command = InitCommand::new(&fx.config, prompter);
        let info = command.collect_project_info(&state, &catalog).unwrap();

        assert_eq!(info.kind, ProjectType::Component);
        assert_eq!(info.project_name, "button");
        assert_eq!(info.project_version, "2.0.0");
        assert_eq!(info.project_template, "widget-template");
        assert_eq!(info.component_description.as_deref(), Some("A clickable button"));
        assert_eq!(command.prompter().rejected_inputs, vec!["test_1", "1.0", ""]);
    }

    #[test]
    fn test_type_without_templates() {
        let fx = fixture(CATALOG, "http://127.0.0.1:1");
        let catalog: Vec<TemplateInfo> = serde_yaml::from_str(
            "- name: Demo\n  npmName: demo-template\n  version: 1.0.0\n  tag: [project]\n",
        )
        .unwrap();
        let state = InitState {
            project_name: Some("button".into()),
            force: false,
            directory: fx.workdir.path().to_path_buf(),
        };
        let mut command =
            InitCommand::new(&fx.config, ScriptedPrompter::new([Answer::Select("Component")]));

        let err = command.collect_project_info(&state, &catalog).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dir_empty_ignores_dotfiles_and_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_dir_empty(dir.path()).await.unwrap());

        std::fs::write(dir.path().join(".gitignore"), "").unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        assert!(is_dir_empty(dir.path()).await.unwrap());

        std::fs::write(dir.path().join("index.js"), "").unwrap();
        assert!(!is_dir_empty(dir.path()).await.unwrap());

        assert!(is_dir_empty(&dir.path().join("missing")).await.unwrap());
    }
}
