//! Recursive template directory copy

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Copy every file under `source` into `target_dir`, replacing existing files
///
/// Returns the copied paths relative to `target_dir`. Symlinks are followed so
/// the project receives plain files.
pub async fn copy_template(source: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target_dir)
        .await
        .map_err(|e| Error::io(target_dir, e))?;

    let mut copied = Vec::new();

    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| Error::Install(format!("{} escapes the template", entry.path().display())))?;
        let target_path = target_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)
                .await
                .map_err(|e| Error::io(&target_path, e))?;
            continue;
        }

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        fs::copy(entry.path(), &target_path)
            .await
            .map_err(|e| Error::io(&target_path, e))?;
        copied.push(relative.to_path_buf());
    }

    tracing::debug!(files = copied.len(), target = %target_dir.display(), "copied template files");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("src/components")).unwrap();
        std::fs::write(src.path().join("package.json"), "{}").unwrap();
        std::fs::write(src.path().join("src/components/App.vue"), "<template/>").unwrap();

        let mut copied = copy_template(src.path(), dst.path()).await.unwrap();
        copied.sort();

        assert_eq!(
            copied,
            vec![
                PathBuf::from("package.json"),
                PathBuf::from("src/components/App.vue")
            ]
        );
        assert!(dst.path().join("src/components/App.vue").is_file());
    }

    #[tokio::test]
    async fn test_copy_overwrites_existing() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("README.md"), "new").unwrap();
        std::fs::write(dst.path().join("README.md"), "old").unwrap();
        std::fs::write(dst.path().join("keep.txt"), "untouched").unwrap();

        copy_template(src.path(), dst.path()).await.unwrap();

        assert_eq!(std::fs::read_to_string(dst.path().join("README.md")).unwrap(), "new");
        assert_eq!(std::fs::read_to_string(dst.path().join("keep.txt")).unwrap(), "untouched");
    }

    #[tokio::test]
    async fn test_missing_source_is_error() {
        let dst = tempfile::tempdir().unwrap();
        let missing = dst.path().join("nope");
        assert!(matches!(
            copy_template(&missing, &dst.path().join("out")).await,
            Err(Error::Io { .. })
        ));
    }
}
