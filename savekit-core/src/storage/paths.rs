//! Save path helpers.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::FsFileStore;
use crate::error::{SaveLoadError, SaveLoadResult};

/// Resolved location of the save files for one configuration.
///
/// Layout: `<resolved base>/<save subdirectory>/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePaths {
    save_dir: PathBuf,
}

impl SavePaths {
    /// Computes the save directory without touching the filesystem.
    ///
    /// An absolute `base_directory` is used as-is. A relative one is placed under
    /// the platform's local data directory, or the working directory when the
    /// platform has none.
    #[must_use]
    pub fn new(base_directory: impl AsRef<Path>, save_subdirectory: impl AsRef<Path>) -> Self {
        let base = base_directory.as_ref();
        let base = if base.is_absolute() {
            base.to_path_buf()
        } else {
            dirs::data_local_dir().map_or_else(|| base.to_path_buf(), |root| root.join(base))
        };
        Self {
            save_dir: base.join(save_subdirectory),
        }
    }

    /// Computes the save directory and makes sure it exists.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::FileSystem`] if the directory cannot be created.
    pub fn resolve(
        base_directory: impl AsRef<Path>,
        save_subdirectory: impl AsRef<Path>,
    ) -> SaveLoadResult<PathBuf> {
        let paths = Self::new(base_directory, save_subdirectory);
        paths.ensure_dir()?;
        Ok(paths.save_dir)
    }

    /// Returns the save directory.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Creates the save directory if needed. Safe to call concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::FileSystem`] if the directory cannot be created.
    pub fn ensure_dir(&self) -> SaveLoadResult<()> {
        fs::create_dir_all(&self.save_dir).map_err(|e| {
            SaveLoadError::io(
                format!("creation of save directory '{}'", self.save_dir.display()),
                e,
            )
        })
    }

    /// Returns the path of the save file called `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::InvalidFilename`] unless `filename` names a
    /// single entry directly inside the save directory.
    pub fn file_path(&self, filename: &str) -> SaveLoadResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.save_dir.join(filename))
    }
}

fn validate_filename(filename: &str) -> SaveLoadResult<()> {
    if filename.is_empty() {
        return Err(SaveLoadError::InvalidFilename(
            "filename must not be empty".to_string(),
        ));
    }
    if filename.contains(['/', '\\']) {
        return Err(SaveLoadError::InvalidFilename(format!(
            "'{filename}' contains a path separator"
        )));
    }
    if FsFileStore::is_temp_file(filename) {
        return Err(SaveLoadError::InvalidFilename(format!(
            "'{filename}' is reserved for in-flight writes"
        )));
    }
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SaveLoadError::InvalidFilename(format!(
            "'{filename}' does not name a file"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_base_is_kept() {
        let root = std::env::temp_dir().join("savekit-paths");
        let paths = SavePaths::new(&root, "SaveData");
        assert_eq!(paths.save_dir(), root.join("SaveData"));
        assert_eq!(
            paths.file_path("Testfile").expect("path"),
            root.join("SaveData").join("Testfile")
        );
    }

    #[test]
    fn test_relative_base_is_not_left_relative_when_data_dir_exists() {
        let paths = SavePaths::new("GameData", "SaveData");
        if let Some(root) = dirs::data_local_dir() {
            assert_eq!(paths.save_dir(), root.join("GameData").join("SaveData"));
        } else {
            assert_eq!(paths.save_dir(), Path::new("GameData").join("SaveData"));
        }
    }

    #[test]
    fn test_same_filename_maps_to_same_path() {
        let paths = SavePaths::new(std::env::temp_dir(), "SaveData");
        assert_eq!(
            paths.file_path("slot.sav").expect("first"),
            paths.file_path("slot.sav").expect("second")
        );
    }

    #[test]
    fn test_rejects_filenames_outside_save_dir() {
        let paths = SavePaths::new(std::env::temp_dir(), "SaveData");
        for name in ["", ".", "..", "a/b", "..\\b", "/etc/passwd", ".slot.tmp"] {
            match paths.file_path(name) {
                Err(SaveLoadError::InvalidFilename(_)) => {}
                other => panic!("expected invalid filename for '{name}', got {other:?}"),
            }
        }
        paths.file_path(".hidden").expect("dotfiles are plain names");
        paths.file_path("slot.tmp").expect("only dotted temp names are reserved");
    }

    #[test]
    fn test_resolve_creates_directory_idempotently() {
        let root = tempfile::tempdir().expect("tempdir");
        let first = SavePaths::resolve(root.path(), "nested/SaveData").expect("resolve");
        assert!(first.is_dir());
        let second = SavePaths::resolve(root.path(), "nested/SaveData").expect("resolve again");
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_fails_when_base_is_a_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"not a directory").expect("write");
        match SavePaths::resolve(&blocker, "SaveData") {
            Err(SaveLoadError::FileSystem { .. }) => {}
            other => panic!("expected file system error, got {other:?}"),
        }
    }
}
