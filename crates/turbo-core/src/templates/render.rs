//! In-place placeholder rendering of copied template files
//!
//! Templates use EJS-style tags so they don't collide with the `{{ }}` syntax
//! of the frameworks they scaffold:
//!
//! ```text
//! <%= name %>                 variable
//! <%_ if description %> ... <%_ endif %>    block
//! <%# note %>                 comment
//! ```
//!
//! Undefined variables are errors. Files that are not UTF-8 are left as copied.

use super::ignore::IgnoreSet;
use crate::error::{Error, Result};
use crate::project::TemplateContext;
use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;
use walkdir::WalkDir;

/// Renders template text with a fixed project context
pub struct Renderer {
    env: Environment<'static>,
    context: Value,
}

impl Renderer {
    pub fn new(context: &TemplateContext) -> Result<Self> {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters("<%=", "%>")
            .block_delimiters("<%_", "%>")
            .comment_delimiters("<%#", "%>")
            .build()
            .map_err(|e| Error::Config(format!("invalid template syntax: {}", e)))?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        Ok(Self {
            env,
            context: Value::from_serialize(context),
        })
    }

    /// Render one file's contents; `path` only labels errors
    pub fn render(&self, path: &Path, source: &str) -> Result<String> {
        self.env
            .render_str(source, &self.context)
            .map_err(|e| Error::Install(format!("failed to render {}: {}", path.display(), e)))
    }
}

/// Render every non-ignored file under `root` in place
///
/// Files are rendered concurrently. The first failure aborts the remaining
/// renders and is returned; files already written stay rendered. Returns the
/// number of files rewritten.
pub async fn render_dir(root: &Path, ignore: &IgnoreSet, renderer: Renderer) -> Result<usize> {
    let files = collect_files(root, ignore)?;
    let renderer = Arc::new(renderer);
    let mut tasks = JoinSet::new();

    for path in files {
        let renderer = Arc::clone(&renderer);
        tasks.spawn(async move { render_file(&renderer, path).await });
    }

    let mut rendered = 0;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .map_err(|e| Error::Install(format!("render task failed: {}", e)))?;
        if outcome? {
            rendered += 1;
        }
    }

    tracing::debug!(files = rendered, root = %root.display(), "rendered template files");
    Ok(rendered)
}

fn collect_files(root: &Path, ignore: &IgnoreSet) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|entry| {
        let pruned = entry.file_type().is_dir()
            && entry
                .path()
                .strip_prefix(root)
                .is_ok_and(|relative| ignore.is_ignored_dir(relative));
        if pruned {
            tracing::trace!(path = %entry.path().display(), "skipping ignored directory");
        }
        !pruned
    });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io(path, e.into())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if ignore.is_ignored(relative) {
            tracing::trace!(path = %relative.display(), "skipping ignored file");
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

/// `Ok(false)` when the file was skipped as binary
async fn render_file(renderer: &Renderer, path: PathBuf) -> Result<bool> {
    let bytes = fs::read(&path).await.map_err(|e| Error::io(&path, e))?;
    let Ok(source) = String::from_utf8(bytes) else {
        tracing::debug!(path = %path.display(), "skipping non-UTF-8 file");
        return Ok(false);
    };

    let output = renderer.render(&path, &source)?;
    fs::write(&path, output)
        .await
        .map_err(|e| Error::io(&path, e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ProjectInfo, ProjectType};

    fn context() -> TemplateContext {
        ProjectInfo::new(ProjectType::Project, "demo", "1.0.0", "demo-template", None)
            .unwrap()
            .render_context()
    }

    #[test]
    fn test_render_variables_and_aliases() {
        let renderer = Renderer::new(&context()).unwrap();
        let out = renderer
            .render(
                Path::new("package.json"),
                "{\"name\": \"<%= projectName %>\", \"version\": \"<%= version %>\"}\n",
            )
            .unwrap();
        assert_eq!(out, "{\"name\": \"demo\", \"version\": \"1.0.0\"}\n");
    }

    #[test]
    fn test_framework_braces_untouched() {
        let renderer = Renderer::new(&context()).unwrap();
        let out = renderer
            .render(Path::new("App.vue"), "<h1>{{ title }}</h1><%# note %><%= className %>")
            .unwrap();
        assert_eq!(out, "<h1>{{ title }}</h1>demo");
    }

    #[test]
    fn test_blocks() {
        let info = ProjectInfo::new(ProjectType::Component, "btn", "0.1.0", "t", Some("A button"))
            .unwrap();
        let renderer = Renderer::new(&info.render_context()).unwrap();
        let out = renderer
            .render(
                Path::new("README.md"),
                "<%_ if description %>desc: <%= description %><%_ endif %>",
            )
            .unwrap();
        assert_eq!(out, "desc: A button");
    }

    #[test]
    fn test_undefined_variable_fails() {
        let renderer = Renderer::new(&context()).unwrap();
        let err = renderer
            .render(Path::new("bad.txt"), "<%= author %>")
            .unwrap_err();
        assert!(matches!(err, Error::Install(_)));
        assert!(err.to_string().contains("bad.txt"));
    }

    #[tokio::test]
    async fn test_render_dir_skips_ignored_and_binary() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        std::fs::create_dir_all(root.join("public")).unwrap();
        std::fs::write(root.join("src/main.js"), "// <%= name %>@<%= version %>").unwrap();
        std::fs::write(root.join("node_modules/lib/index.js"), "<%= missing %>").unwrap();
        std::fs::write(root.join("public/index.html"), "<%= missing %>").unwrap();
        std::fs::write(root.join("logo.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let ignore = IgnoreSet::new(&["public/**"]);
        let rendered = render_dir(root, &ignore, Renderer::new(&context()).unwrap())
            .await
            .unwrap();

        assert_eq!(rendered, 1);
        assert_eq!(
            std::fs::read_to_string(root.join("src/main.js")).unwrap(),
            "// demo@1.0.0"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("public/index.html")).unwrap(),
            "<%= missing %>"
        );
        assert_eq!(std::fs::read(root.join("logo.bin")).unwrap(), vec![0xff, 0xfe, 0x00]);
    }

    #[tokio::test]
    async fn test_render_dir_leaves_git_internals_alone() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join(".git/hooks")).unwrap();
        std::fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        std::fs::write(root.join(".git/hooks/pre-commit"), "<%= missing %>").unwrap();
        std::fs::write(root.join(".gitignore"), "node_modules/\n").unwrap();
        std::fs::write(root.join("index.js"), "<%= name %>").unwrap();

        let before = std::fs::metadata(root.join(".git/HEAD")).unwrap().modified().unwrap();
        let rendered = render_dir(
            root,
            &IgnoreSet::new::<&str>(&[]),
            Renderer::new(&context()).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(rendered, 2);
        assert_eq!(std::fs::read_to_string(root.join("index.js")).unwrap(), "demo");
        assert_eq!(
            std::fs::metadata(root.join(".git/HEAD")).unwrap().modified().unwrap(),
            before
        );
    }

    #[test]
    fn test_collect_files_prunes_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("node_modules/a/b")).unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("node_modules/a/b/x.js"), "").unwrap();
        std::fs::write(root.join("assets/logo.svg"), "").unwrap();
        std::fs::write(root.join("assets/data.json"), "").unwrap();

        let files = collect_files(root, &IgnoreSet::new(&["**/*.{svg,png}"])).unwrap();
        assert_eq!(files, vec![root.join("assets/data.json")]);
    }

    #[tokio::test]
    async fn test_render_dir_fails_on_any_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.txt"), "<%= name %>").unwrap();
        std::fs::write(dir.path().join("broken.txt"), "<%= nope %>").unwrap();

        let result = render_dir(
            dir.path(),
            &IgnoreSet::new::<&str>(&[]),
            Renderer::new(&context()).unwrap(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("broken.txt"));
    }
}
