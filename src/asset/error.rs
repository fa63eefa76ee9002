//! Versioning error types.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that fail a versioning run.
///
/// Deleting a file that is already gone is never an error and has no variant.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("no source files to version")]
    EmptySources,

    #[error("`{path}` is not inside the public directory `{root}`")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("`{path}` is not valid UTF-8 and can't be a manifest key")]
    NonUtf8Path { path: PathBuf },

    #[error("manifest `{path}` is not a flat JSON object of strings")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("hash length must be between {min} and {max}, got {0}", min = crate::utils::hash::MIN_LEN, max = crate::utils::hash::MAX_LEN)]
    InvalidHashLength(usize),

    #[error("IO error on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy `{from}` to `{to}`")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VersionError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wrap a failed copy with both of its paths.
    pub fn copy(from: &Path, to: &Path, source: io::Error) -> Self {
        Self::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    }
}

/// Attach a path to IO results, in the style of `anyhow::Context`.
pub trait IoPathExt<T> {
    fn at(self, path: &Path) -> Result<T, VersionError>;
}

impl<T> IoPathExt<T> for io::Result<T> {
    #[inline]
    fn at(self, path: &Path) -> Result<T, VersionError> {
        self.map_err(|e| VersionError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_version_error_display() {
        let err = VersionError::OutsideRoot {
            path: PathBuf::from("assets/app.js"),
            root: PathBuf::from("public"),
        };
        let display = err.to_string();
        assert!(display.contains("assets/app.js"));
        assert!(display.contains("public"));

        let err = VersionError::InvalidHashLength(2);
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result.at(Path::new("public/build/app.js")).unwrap_err();
        assert!(err.to_string().contains("public/build/app.js"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_copy_error_names_both_paths() {
        let err = VersionError::copy(
            Path::new("public/app.js"),
            Path::new("public/build/app.js"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = err.to_string();
        assert!(display.contains("`public/app.js`"));
        assert!(display.contains("`public/build/app.js`"));
    }
}
