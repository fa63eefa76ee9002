//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `absolutize` - lexical absolute form, works for paths that don't exist yet
//! - `to_posix` - `/`-separated string form used in the manifest

use std::path::{Component, Path, PathBuf};

/// Make a path absolute without touching the filesystem.
///
/// Joins relative paths onto cwd, then folds `.` and `..` lexically.
/// Never resolves symlinks, so two paths built this way can be compared
/// with `strip_prefix` reliably.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join path components with `/`, regardless of platform.
///
/// `None` if any component is not valid UTF-8.
pub fn to_posix(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        if let Component::Normal(s) = component {
            parts.push(s.to_str()?);
        }
    }
    Some(parts.join("/"))
}
