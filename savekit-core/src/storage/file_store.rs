//! Raw file access for save files.
//!
//! The store knows nothing about encodings: it moves opaque bytes between
//! memory and a path.
//!
//! # Atomic Write Pattern
//!
//! [`FsFileStore::write`] never leaves a partial file behind:
//!
//! 1. Write data to a temporary file next to the target
//! 2. `fsync` the temporary file
//! 3. Atomically rename the temporary file onto the target name
//! 4. `fsync` the parent directory (Unix)
//!
//! Readers observe either the old content or the new content.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{SaveLoadError, SaveLoadResult};

const TEMP_SUFFIX: &str = ".tmp";

/// Byte-level storage backend used by the manager.
pub trait FileStore: Send + Sync {
    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::NotFound`] if the file does not exist and
    /// [`SaveLoadError::FileSystem`] for any other I/O failure.
    fn read(&self, path: &Path) -> SaveLoadResult<Vec<u8>>;

    /// Writes `bytes` to `path`, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::FileSystem`] if the write fails.
    fn write(&self, path: &Path, bytes: &[u8]) -> SaveLoadResult<()>;

    /// Deletes the file at `path`.
    ///
    /// Returns `Ok(false)` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Only returns an error for actual I/O failures.
    fn delete(&self, path: &Path) -> SaveLoadResult<bool>;

    /// Checks whether a file exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self, path: &Path) -> SaveLoadResult<bool>;

    /// Lists the names of the files stored directly in `dir`.
    ///
    /// A missing directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    fn list(&self, dir: &Path) -> SaveLoadResult<Vec<String>>;
}

/// Local filesystem implementation of [`FileStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileStore;

impl FsFileStore {
    /// Returns `true` for the temporary files left by in-flight writes.
    #[must_use]
    pub fn is_temp_file(name: &str) -> bool {
        name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
    }

    fn temp_path(path: &Path) -> SaveLoadResult<PathBuf> {
        let name = path.file_name().ok_or_else(|| {
            SaveLoadError::InvalidFilename(format!("'{}' has no file name", path.display()))
        })?;
        Ok(path.with_file_name(format!(".{}{TEMP_SUFFIX}", name.to_string_lossy())))
    }

    #[cfg(unix)]
    fn sync_parent(path: &Path) -> SaveLoadResult<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| {
                SaveLoadError::io(format!("sync of directory '{}'", parent.display()), e)
            })
    }

    #[cfg(not(unix))]
    fn sync_parent(_path: &Path) -> SaveLoadResult<()> {
        // Directories cannot be opened for sync here; rename is still atomic.
        Ok(())
    }
}

impl FileStore for FsFileStore {
    fn read(&self, path: &Path) -> SaveLoadResult<Vec<u8>> {
        match fs::read(path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(SaveLoadError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(SaveLoadError::io(format!("read of '{}'", path.display()), e)),
        }
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> SaveLoadResult<()> {
        let temp_path = Self::temp_path(path)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| {
                SaveLoadError::io(format!("creation of '{}'", temp_path.display()), e)
            })?;

        let written = file.write_all(bytes).and_then(|()| file.sync_all());
        drop(file);
        if let Err(e) = written {
            discard_temp(&temp_path);
            return Err(SaveLoadError::io(
                format!("write of '{}'", temp_path.display()),
                e,
            ));
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            discard_temp(&temp_path);
            return Err(SaveLoadError::io(
                format!(
                    "rename of '{}' to '{}'",
                    temp_path.display(),
                    path.display()
                ),
                e,
            ));
        }

        Self::sync_parent(path)
    }

    fn delete(&self, path: &Path) -> SaveLoadResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => {
                Self::sync_parent(path)?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SaveLoadError::io(
                format!("delete of '{}'", path.display()),
                e,
            )),
        }
    }

    fn exists(&self, path: &Path) -> SaveLoadResult<bool> {
        path.try_exists().map_err(|e| {
            SaveLoadError::io(format!("existence check of '{}'", path.display()), e)
        })
    }

    fn list(&self, dir: &Path) -> SaveLoadResult<Vec<String>> {
        let list_error =
            |e| SaveLoadError::io(format!("listing of '{}'", dir.display()), e);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_error(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(list_error)?;
            if !entry.file_type().map_err(list_error)?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !Self::is_temp_file(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }
}

fn discard_temp(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != ErrorKind::NotFound {
            log::warn!(
                "failed to remove temporary file '{}': {e}",
                temp_path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("slot");
        let store = FsFileStore;

        store.write(&path, b"first").expect("write");
        assert_eq!(store.read(&path).expect("read"), b"first");

        store.write(&path, b"second, longer").expect("overwrite");
        assert_eq!(store.read(&path).expect("read"), b"second, longer");
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("slot");
        FsFileStore.write(&path, b"data").expect("write");

        let names: Vec<_> = fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("slot")]);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing");
        match FsFileStore.read(&path) {
            Err(SaveLoadError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("slot");
        let store = FsFileStore;

        store.write(&path, b"data").expect("write");
        assert!(store.exists(&path).expect("exists"));
        assert!(store.delete(&path).expect("delete"));
        assert!(!store.exists(&path).expect("exists"));
        assert!(!store.delete(&path).expect("second delete"));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent").join("slot");
        match FsFileStore.write(&path, b"data") {
            Err(SaveLoadError::FileSystem { .. }) => {}
            other => panic!("expected file system error, got {other:?}"),
        }
    }

    #[test]
    fn test_list_skips_directories_and_temp_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsFileStore;
        store.write(&dir.path().join("b"), b"2").expect("write");
        store.write(&dir.path().join("a"), b"1").expect("write");
        fs::write(dir.path().join(".c.tmp"), b"partial").expect("write temp");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");

        let mut names = store.list(dir.path()).expect("list");
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert!(store
            .list(&dir.path().join("absent"))
            .expect("list missing")
            .is_empty());
    }

    #[test]
    fn test_temp_file_names() {
        let temp = FsFileStore::temp_path(Path::new("/saves/slot1")).expect("temp");
        assert_eq!(temp, Path::new("/saves/.slot1.tmp"));
        assert!(FsFileStore::is_temp_file(".slot1.tmp"));
        assert!(!FsFileStore::is_temp_file("slot1.tmp"));
        assert!(!FsFileStore::is_temp_file(".hidden"));
    }
}
