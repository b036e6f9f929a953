//! Local save/load of application state.
//!
//! A [`SaveLoadManager`] is bound to one [`Configuration`]: a base directory, a
//! save subdirectory and a [`StrategyKind`]. Each saved value becomes one file
//! at `<base>/<subdirectory>/<filename>`:
//!
//! ```text
//! value -> SerializationStrategy::encode -> [EncryptionCodec::encrypt] -> FileStore::write
//! ```
//!
//! Loading reverses the chain. A missing file is reported as absence
//! (`Ok(None)` / `Ok(false)`), never as an error.
//!
//! Values that other parts of the program hold on to can be refreshed in place
//! with [`SaveLoadManager::load_overwrite`] and
//! [`SaveLoadManager::load_managed_object_overwrite`].

pub mod config;
pub mod crypto;
pub mod error;
pub mod manager;
pub mod storage;
pub mod strategy;

/// Bridge from the `log` facade to a host-provided logger.
pub mod logger;

pub use config::{Configuration, StrategyKind};
pub use crypto::{EncryptionCodec, FileKey};
pub use error::{SaveLoadError, SaveLoadResult};
pub use manager::SaveLoadManager;
pub use storage::{FileStore, FsFileStore, SavePaths};
pub use strategy::{
    BinaryStrategy, Encrypted, SerializationStrategy, StructuredTextStrategy, Value,
};
