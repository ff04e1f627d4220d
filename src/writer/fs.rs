//! Filesystem collaborator.
//!
//! The writer never touches `std::fs` directly; everything goes through
//! [`FileSystem`] so tests can observe the exact sequence of mutations.

use std::fmt::Debug;
use std::path::Path;

use tracing::trace;

use crate::error::{Error, Result};

/// The filesystem primitives the emission pipeline relies on.
pub trait FileSystem: Debug + Send + Sync {
    /// True if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn mkdir(&self, path: &Path) -> Result<()>;

    /// Remove `path` recursively. Succeeds if it does not exist.
    fn rmdir(&self, path: &Path) -> Result<()>;

    /// Copy `from` over `to`.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Write `contents` to `path`, replacing any existing file.
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        trace!(path = %path.display(), "mkdir");
        std::fs::create_dir_all(path).map_err(|err| Error::fs("create directory", path, err))
    }

    fn rmdir(&self, path: &Path) -> Result<()> {
        trace!(path = %path.display(), "rmdir");
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::fs("remove directory", path, err)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        trace!(from = %from.display(), to = %to.display(), "copy");
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|err| Error::fs("copy", from, err))
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        trace!(path = %path.display(), bytes = contents.len(), "write");
        std::fs::write(path, contents).map_err(|err| Error::fs("write", path, err))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        trace!(path = %path.display(), "remove");
        std::fs::remove_file(path).map_err(|err| Error::fs("remove", path, err))
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rmdir_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        LocalFs.rmdir(&dir.path().join("nope")).unwrap();
    }

    #[test]
    fn test_mkdir_write_copy_remove() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        LocalFs.mkdir(&nested).unwrap();
        let file = nested.join("x.ts");
        LocalFs.write_file(&file, "export {};\n").unwrap();
        assert!(LocalFs.exists(&file));

        let copy = nested.join("y.ts");
        LocalFs.copy_file(&file, &copy).unwrap();
        assert_eq!(std::fs::read_to_string(&copy).unwrap(), "export {};\n");

        LocalFs.remove_file(&file).unwrap();
        assert!(!LocalFs.exists(&file));
        LocalFs.rmdir(&dir.path().join("a")).unwrap();
        assert!(!LocalFs.exists(&nested));
    }
}
