//! The save/load orchestrator.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use serde::{de::DeserializeOwned, Serialize};

use crate::config::{Configuration, StrategyKind};
use crate::crypto::EncryptionCodec;
use crate::error::{SaveLoadError, SaveLoadResult};
use crate::storage::{FileStore, FsFileStore, SavePaths};
use crate::strategy::value::{from_value, serializes_as_struct, to_value};
use crate::strategy::{BinaryStrategy, Encrypted, SerializationStrategy, StructuredTextStrategy};

/// The strategy a manager dispatches to: the closed set of built-ins plus one
/// slot for a caller-supplied implementation.
enum Dispatch {
    Binary(BinaryStrategy),
    StructuredText(StructuredTextStrategy),
    EncryptedBinary(Encrypted<BinaryStrategy>),
    EncryptedStructuredText(Encrypted<StructuredTextStrategy>),
    Custom(OnceLock<Box<dyn SerializationStrategy>>),
}

impl Dispatch {
    fn for_config(config: &Configuration) -> SaveLoadResult<Self> {
        let codec = || {
            EncryptionCodec::from_passphrase(config.encryption_key(), config.encryption_salt())
        };
        Ok(match config.strategy_kind() {
            StrategyKind::Binary => Self::Binary(BinaryStrategy),
            StrategyKind::StructuredText => Self::StructuredText(StructuredTextStrategy),
            StrategyKind::EncryptedBinary => {
                Self::EncryptedBinary(Encrypted::new(BinaryStrategy, codec()?))
            }
            StrategyKind::EncryptedStructuredText => {
                Self::EncryptedStructuredText(Encrypted::new(StructuredTextStrategy, codec()?))
            }
            StrategyKind::Custom => Self::Custom(OnceLock::new()),
        })
    }

    fn strategy(&self) -> SaveLoadResult<&dyn SerializationStrategy> {
        match self {
            Self::Binary(s) => Ok(s),
            Self::StructuredText(s) => Ok(s),
            Self::EncryptedBinary(s) => Ok(s),
            Self::EncryptedStructuredText(s) => Ok(s),
            Self::Custom(slot) => slot
                .get()
                .map(|s| &**s as &dyn SerializationStrategy)
                .ok_or_else(|| {
                    SaveLoadError::Configuration(
                        "custom strategy selected but none has been bound".to_string(),
                    )
                }),
        }
    }
}

/// Saves and loads values as individual files under one save directory.
///
/// Bound to a single [`Configuration`] for its whole lifetime. Every operation
/// is synchronous and self-contained. Concurrent operations on the *same*
/// filename must be serialized by the caller.
///
/// ```rust,no_run
/// use savekit_core::{SaveLoadManager, StrategyKind};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Progress {
///     level: u32,
/// }
///
/// # fn main() -> Result<(), savekit_core::SaveLoadError> {
/// let manager = SaveLoadManager::create("GameData", "SaveData", StrategyKind::Binary, "", "")?;
/// manager.save(&Progress { level: 3 }, "progress")?;
/// let progress: Option<Progress> = manager.load("progress")?;
/// assert_eq!(progress.map(|p| p.level), Some(3));
/// # Ok(())
/// # }
/// ```
pub struct SaveLoadManager {
    config: Configuration,
    paths: SavePaths,
    store: Arc<dyn FileStore>,
    dispatch: Dispatch,
}

impl SaveLoadManager {
    /// Builds a manager writing to the local filesystem.
    ///
    /// `encryption_key` and `encryption_salt` are only used by the encrypted
    /// strategy kinds. With [`StrategyKind::Custom`], call
    /// [`Self::bind_custom_strategy`] before the first save or load.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Configuration`] if the configuration is invalid.
    pub fn create(
        base_directory: impl Into<PathBuf>,
        save_subdirectory: impl Into<PathBuf>,
        strategy_kind: StrategyKind,
        encryption_key: &str,
        encryption_salt: &str,
    ) -> SaveLoadResult<Self> {
        Self::from_config(
            Configuration::new(base_directory, save_subdirectory, strategy_kind)
                .with_encryption(encryption_key, encryption_salt),
        )
    }

    /// Builds a manager writing to the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Configuration`] if the configuration is invalid.
    pub fn from_config(config: Configuration) -> SaveLoadResult<Self> {
        Self::with_file_store(config, Arc::new(FsFileStore))
    }

    /// Builds a manager on top of a caller-supplied storage backend.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Configuration`] if the configuration is invalid.
    pub fn with_file_store(
        config: Configuration,
        store: Arc<dyn FileStore>,
    ) -> SaveLoadResult<Self> {
        config.validate()?;
        let dispatch = Dispatch::for_config(&config)?;
        let paths = SavePaths::new(config.base_directory(), config.save_subdirectory());
        log::debug!(
            "save/load manager for '{}' using {}",
            paths.save_dir().display(),
            config.strategy_kind()
        );
        Ok(Self {
            config,
            paths,
            store,
            dispatch,
        })
    }

    /// Binds the implementation used by [`StrategyKind::Custom`].
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Configuration`] if the manager is not configured
    /// for a custom strategy or one has already been bound.
    pub fn bind_custom_strategy(
        &self,
        strategy: impl SerializationStrategy + 'static,
    ) -> SaveLoadResult<()> {
        let Dispatch::Custom(slot) = &self.dispatch else {
            return Err(SaveLoadError::Configuration(format!(
                "cannot bind a custom strategy to a manager using {}",
                self.config.strategy_kind()
            )));
        };
        slot.set(Box::new(strategy)).map_err(|_| {
            SaveLoadError::Configuration("custom strategy is already bound".to_string())
        })
    }

    /// Returns the configuration this manager was built with.
    #[must_use]
    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    /// Returns the directory save files are written to.
    #[must_use]
    pub fn save_directory(&self) -> &Path {
        self.paths.save_dir()
    }

    /// Returns the path of the save file called `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::InvalidFilename`] if `filename` does not name a
    /// single file inside the save directory.
    pub fn save_path(&self, filename: &str) -> SaveLoadResult<PathBuf> {
        self.paths.file_path(filename)
    }

    /// Encodes `value` and writes it to `filename`, replacing any previous save.
    ///
    /// # Errors
    ///
    /// Fails if no custom strategy is bound, the filename is invalid, the value
    /// cannot be encoded or encrypted, or the file cannot be written.
    pub fn save<T: Serialize + ?Sized>(&self, value: &T, filename: &str) -> SaveLoadResult<()> {
        let strategy = self.dispatch.strategy()?;
        let path = self.paths.file_path(filename)?;
        let bytes = strategy.encode(&to_value(value)?)?;

        self.paths.ensure_dir()?;
        self.store.write(&path, &bytes)?;
        log::debug!(
            "saved '{filename}' ({}, {} bytes)",
            self.config.strategy_kind(),
            bytes.len()
        );
        Ok(())
    }

    /// Loads a freshly built `T` from `filename`.
    ///
    /// Returns `Ok(None)` if there is no such save.
    ///
    /// # Errors
    ///
    /// Fails if no custom strategy is bound, the file cannot be read or
    /// decrypted, or its content does not decode into a `T`.
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> SaveLoadResult<Option<T>> {
        let strategy = self.dispatch.strategy()?;
        let Some(bytes) = self.read_existing(filename)? else {
            return Ok(None);
        };
        let tree = strategy
            .decode(&bytes)
            .inspect_err(|err| self.note_decode_failure(filename, err))?;
        let value = from_value(&tree)?;
        log::debug!("loaded '{filename}' ({})", self.config.strategy_kind());
        Ok(Some(value))
    }

    /// Decodes `filename` onto `existing`, keeping the instance in place.
    ///
    /// Returns `Ok(false)` and leaves `existing` untouched if there is no such
    /// save. On any error `existing` is also left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_overwrite<T: Serialize + DeserializeOwned>(
        &self,
        existing: &mut T,
        filename: &str,
    ) -> SaveLoadResult<bool> {
        let strategy = self.dispatch.strategy()?;
        let Some(bytes) = self.read_existing(filename)? else {
            return Ok(false);
        };
        *existing = self.decode_onto(strategy, &bytes, existing, filename)?;
        log::debug!("loaded '{filename}' in place ({})", self.config.strategy_kind());
        Ok(true)
    }

    /// Saves a long-lived object shared with other holders.
    ///
    /// Holds the read lock while encoding.
    ///
    /// # Errors
    ///
    /// Same as [`Self::save`], plus [`SaveLoadError::Poisoned`].
    pub fn save_managed_object<T: Serialize>(
        &self,
        object: &RwLock<T>,
        filename: &str,
    ) -> SaveLoadResult<()> {
        let guard = object
            .read()
            .map_err(|_| SaveLoadError::Poisoned(format!("saving '{filename}'")))?;
        self.save(&*guard, filename)
    }

    /// Refreshes a long-lived shared object from `filename` in place.
    ///
    /// The object is updated behind its lock, so every holder of the same
    /// `RwLock` (for example through an `Arc`) observes the loaded state.
    /// Returns `Ok(false)` and leaves the object untouched if there is no such save.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_overwrite`], plus [`SaveLoadError::Poisoned`].
    pub fn load_managed_object_overwrite<T: Serialize + DeserializeOwned>(
        &self,
        object: &RwLock<T>,
        filename: &str,
    ) -> SaveLoadResult<bool> {
        let strategy = self.dispatch.strategy()?;
        let Some(bytes) = self.read_existing(filename)? else {
            return Ok(false);
        };
        let mut guard = object
            .write()
            .map_err(|_| SaveLoadError::Poisoned(format!("loading '{filename}'")))?;
        *guard = self.decode_onto(strategy, &bytes, &*guard, filename)?;
        log::debug!(
            "refreshed managed object from '{filename}' ({})",
            self.config.strategy_kind()
        );
        Ok(true)
    }

    /// Deletes the save called `filename`.
    ///
    /// Returns `Ok(false)` if there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Fails if the filename is invalid or the file cannot be removed.
    pub fn delete_save(&self, filename: &str) -> SaveLoadResult<bool> {
        let path = self.paths.file_path(filename)?;
        let removed = self.store.delete(&path)?;
        log::debug!("delete of '{filename}' removed={removed}");
        Ok(removed)
    }

    /// Checks whether a save called `filename` exists.
    ///
    /// # Errors
    ///
    /// Fails if the filename is invalid or existence cannot be determined.
    pub fn exists(&self, filename: &str) -> SaveLoadResult<bool> {
        let path = self.paths.file_path(filename)?;
        self.store.exists(&path)
    }

    /// Lists the saves currently present, sorted by name.
    ///
    /// # Errors
    ///
    /// Fails if the save directory exists but cannot be listed.
    pub fn saved_files(&self) -> SaveLoadResult<Vec<String>> {
        let mut names = self.store.list(self.paths.save_dir())?;
        names.sort();
        Ok(names)
    }

    fn read_existing(&self, filename: &str) -> SaveLoadResult<Option<Vec<u8>>> {
        let path = self.paths.file_path(filename)?;
        match self.store.read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.is_not_found() => {
                log::debug!("no save named '{filename}'");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn decode_onto<T: Serialize + DeserializeOwned>(
        &self,
        strategy: &dyn SerializationStrategy,
        bytes: &[u8],
        current: &T,
        filename: &str,
    ) -> SaveLoadResult<T> {
        // Only struct fields are overlaid; maps and enums are replaced whole.
        let decoded = if serializes_as_struct(current) {
            let mut tree = to_value(current)?;
            strategy.decode_into(bytes, &mut tree).map(|()| tree)
        } else {
            strategy.decode(bytes)
        };
        let tree = decoded.inspect_err(|err| self.note_decode_failure(filename, err))?;
        from_value(&tree)
    }

    fn note_decode_failure(&self, filename: &str, err: &SaveLoadError) {
        if let SaveLoadError::Decryption(_) = err {
            log::warn!(
                "could not decrypt '{filename}' ({}): {err}",
                self.config.strategy_kind()
            );
        }
    }
}

impl std::fmt::Debug for SaveLoadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let custom_bound = match &self.dispatch {
            Dispatch::Custom(slot) => Some(slot.get().is_some()),
            _ => None,
        };
        f.debug_struct("SaveLoadManager")
            .field("config", &self.config)
            .field("save_dir", &self.paths.save_dir())
            .field("custom_bound", &custom_bound)
            .finish_non_exhaustive()
    }
}
