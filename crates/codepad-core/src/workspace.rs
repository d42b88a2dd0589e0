//! Workspace management for project-based editing.
//!
//! The workspace is the folder shown in the file tree. Git commands run in
//! its root and new folders are created under it.

use std::path::{Component, Path, PathBuf};

use crate::{CoreError, CoreResult};

/// Represents a workspace (project folder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Root directory of the workspace
    root: PathBuf,

    /// Workspace name
    name: String,
}

impl Workspace {
    /// Opens a workspace from a directory.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let root = path.canonicalize().map_err(|source| CoreError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

        if !root.is_dir() {
            return Err(CoreError::InvalidOperation(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Workspace")
            .to_string();

        Ok(Self { root, name })
    }

    /// Creates `base/name` if needed and opens it.
    pub fn create_project_in(base: &Path, name: &str) -> CoreResult<Self> {
        let path = base.join(checked_name(name)?);
        create_dir_all(&path)?;
        tracing::info!(path = %path.display(), "created project");
        Self::open(path)
    }

    /// Creates `~/name` if needed and opens it.
    pub fn create_project(name: &str) -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::InvalidOperation("home directory not found".into()))?;
        Self::create_project_in(&home, name)
    }

    /// Returns the workspace root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a folder under the root, like `mkdir -p`.
    pub fn create_folder(&self, name: &str) -> CoreResult<PathBuf> {
        let path = self.root.join(checked_name(name)?);
        create_dir_all(&path)?;
        tracing::debug!(path = %path.display(), "created folder");
        Ok(path)
    }

    /// Resolves a path relative to the workspace root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Returns true if the path is in the workspace.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().starts_with(&self.root)
    }
}

/// Accepts a relative name that stays below its parent.
fn checked_name(name: &str) -> CoreResult<&Path> {
    let path = Path::new(name);
    let inside = !name.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside {
        return Err(CoreError::InvalidOperation(format!(
            "`{name}` is not a valid folder name"
        )));
    }
    Ok(path)
}

fn create_dir_all(path: &Path) -> CoreResult<()> {
    std::fs::create_dir_all(path).map_err(|source| CoreError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_open() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        assert_eq!(ws.root(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_open_rejects_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "").unwrap();

        assert!(Workspace::open(&file).is_err());
        assert!(matches!(
            Workspace::open(dir.path().join("missing")),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_folder_is_idempotent() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();

        let created = ws.create_folder("src/utils").unwrap();
        assert!(created.is_dir());
        assert_eq!(ws.create_folder("src/utils").unwrap(), created);
    }

    #[test]
    fn test_create_folder_stays_inside_root() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();

        assert!(ws.create_folder("../escape").is_err());
        assert!(ws.create_folder("/abs").is_err());
        assert!(ws.create_folder("  ").is_err());
    }

    #[test]
    fn test_create_project_in() {
        let dir = tempdir().unwrap();
        let ws = Workspace::create_project_in(dir.path(), "demo").unwrap();

        assert_eq!(ws.name(), "demo");
        assert!(ws.root().is_dir());
        assert!(ws.contains(ws.resolve("main.py")));
    }
}
