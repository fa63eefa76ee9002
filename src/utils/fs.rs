//! Filesystem helpers with force-delete semantics.

use std::fs;
use std::io;
use std::path::Path;

/// Remove a file, treating a missing file as success.
///
/// Returns `true` if a file was actually removed.
pub fn remove_file_force(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Copy `from` to `to`, creating parent directories of `to` first.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)
}

/// Write `contents` to `path`, creating parent directories first.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_file_force_missing() {
        let dir = TempDir::new().unwrap();
        let removed = remove_file_force(&dir.path().join("nope.js")).unwrap();
        assert!(!removed);
    }

    #[test]
    fn test_remove_file_force_existing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(&file, "x").unwrap();

        assert!(remove_file_force(&file).unwrap());
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_file_force_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("app.js");
        fs::create_dir(&sub).unwrap();

        assert!(remove_file_force(&sub).is_err());
        assert!(sub.is_dir());
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.css");
        let to = dir.path().join("build/css/nested/a.css");
        fs::write(&from, "body {}").unwrap();

        copy_file(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "body {}");
    }
}
