//! Whole-file reads and writes.
//!
//! Saves go through a temporary file in the target directory that is then
//! renamed over the target, so a failed write never leaves a truncated file
//! behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{CoreError, CoreResult};

/// Reads a whole file as text.
pub fn read_text(path: &Path) -> CoreResult<String> {
    std::fs::read_to_string(path).map_err(|source| CoreError::NotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// The path a session is keyed by: symlinks and `..` resolved where the
/// file (or at least its directory) exists, plain absolute otherwise.
pub fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return Ok(canonical);
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        if !parent.as_os_str().is_empty() {
            if let Ok(dir) = std::fs::canonicalize(parent) {
                return Ok(dir.join(name));
            }
        }
    }
    std::path::absolute(path)
}

/// Replaces the file at `path` with `text`.
pub fn write_text(path: &Path, text: &str) -> CoreResult<()> {
    write_atomic(path, text).map_err(|source| CoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, text: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;

    // Keep the mode of a file we are overwriting
    if let Ok(metadata) = std::fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");

        write_text(&path, "print('hi')\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "print('hi')\n");

        write_text(&path, "x").unwrap();
        assert_eq!(read_text(&path).unwrap(), "x");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_resolve_path_collapses_parent_components() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("a");
        std::fs::create_dir(&sub).unwrap();
        let file = sub.join("b.py");
        std::fs::write(&file, "").unwrap();

        let expected = file.canonicalize().unwrap();
        assert_eq!(resolve_path(&sub.join("..").join("a").join("b.py")).unwrap(), expected);

        // Not written yet: the directory is still resolved
        let fresh = dir.path().join("a").join("..").join("a").join("new.py");
        assert_eq!(
            resolve_path(&fresh).unwrap(),
            sub.canonicalize().unwrap().join("new.py")
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().join("missing.py")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir.py");

        let err = write_text(&path, "x").unwrap_err();
        assert!(matches!(err, CoreError::Write { path: p, .. } if p == path));
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        write_text(&path, "new").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
