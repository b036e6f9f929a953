//! Manager configuration.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use zeroize::Zeroizing;

use crate::error::{SaveLoadError, SaveLoadResult};

/// Selects the serialization strategy a manager dispatches to.
///
/// Parses from and displays as snake case, so hosts can pick a strategy from
/// a settings string:
///
/// ```rust
/// use savekit_core::StrategyKind;
///
/// let kind: StrategyKind = "encrypted_structured_text".parse().unwrap();
/// assert_eq!(kind, StrategyKind::EncryptedStructuredText);
/// assert!(kind.is_encrypted());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StrategyKind {
    /// Compact CBOR encoding.
    #[default]
    Binary,
    /// Pretty-printed JSON encoding.
    StructuredText,
    /// CBOR encoding sealed with the configured key.
    EncryptedBinary,
    /// JSON encoding sealed with the configured key.
    EncryptedStructuredText,
    /// Caller-supplied strategy, bound once with `bind_custom_strategy`.
    Custom,
}

impl StrategyKind {
    /// Returns `true` if files written under this kind are encrypted.
    #[must_use]
    pub const fn is_encrypted(self) -> bool {
        matches!(self, Self::EncryptedBinary | Self::EncryptedStructuredText)
    }
}

/// Configuration bound to a `SaveLoadManager` for its whole lifetime.
#[derive(Clone)]
pub struct Configuration {
    base_directory: PathBuf,
    save_subdirectory: PathBuf,
    strategy_kind: StrategyKind,
    encryption_key: Zeroizing<String>,
    encryption_salt: Zeroizing<String>,
}

impl Configuration {
    /// Builds a configuration without encryption material.
    #[must_use]
    pub fn new(
        base_directory: impl Into<PathBuf>,
        save_subdirectory: impl Into<PathBuf>,
        strategy_kind: StrategyKind,
    ) -> Self {
        Self {
            base_directory: base_directory.into(),
            save_subdirectory: save_subdirectory.into(),
            strategy_kind,
            encryption_key: Zeroizing::new(String::new()),
            encryption_salt: Zeroizing::new(String::new()),
        }
    }

    /// Sets the passphrase and salt used by the encrypted strategy kinds.
    #[must_use]
    pub fn with_encryption(
        mut self,
        encryption_key: impl Into<String>,
        encryption_salt: impl Into<String>,
    ) -> Self {
        self.encryption_key = Zeroizing::new(encryption_key.into());
        self.encryption_salt = Zeroizing::new(encryption_salt.into());
        self
    }

    /// Base directory; relative paths resolve under the platform data directory.
    #[must_use]
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Subdirectory of the base directory holding the save files.
    #[must_use]
    pub fn save_subdirectory(&self) -> &Path {
        &self.save_subdirectory
    }

    /// Selected strategy kind.
    #[must_use]
    pub const fn strategy_kind(&self) -> StrategyKind {
        self.strategy_kind
    }

    pub(crate) fn encryption_key(&self) -> &str {
        &self.encryption_key
    }

    pub(crate) fn encryption_salt(&self) -> &str {
        &self.encryption_salt
    }

    /// Checks the directory pair and the encryption material.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Configuration`] if the subdirectory is empty,
    /// absolute or escapes the base directory, or if an encrypted kind has no key.
    pub fn validate(&self) -> SaveLoadResult<()> {
        if self.save_subdirectory.as_os_str().is_empty() {
            return Err(SaveLoadError::Configuration(
                "save subdirectory must not be empty".to_string(),
            ));
        }
        let escapes = self
            .save_subdirectory
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SaveLoadError::Configuration(format!(
                "save subdirectory '{}' must be a relative path inside the base directory",
                self.save_subdirectory.display()
            )));
        }
        if self.strategy_kind.is_encrypted() && self.encryption_key.is_empty() {
            return Err(SaveLoadError::Configuration(format!(
                "strategy '{}' requires a non-empty encryption key",
                self.strategy_kind
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_directory", &self.base_directory)
            .field("save_subdirectory", &self.save_subdirectory)
            .field("strategy_kind", &self.strategy_kind)
            .field("encryption_key", &"[REDACTED]")
            .field("encryption_salt", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_strategy_kind_string_round_trip() {
        for kind in StrategyKind::iter() {
            let parsed: StrategyKind = kind.to_string().parse().expect("parse");
            assert_eq!(parsed, kind);
        }
        assert_eq!(StrategyKind::StructuredText.to_string(), "structured_text");
        assert!("xml".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_strategy_kind_serde_names() {
        let json = serde_json::to_string(&StrategyKind::EncryptedBinary).expect("ser");
        assert_eq!(json, "\"encrypted_binary\"");
        let kind: StrategyKind = serde_json::from_str("\"custom\"").expect("de");
        assert_eq!(kind, StrategyKind::Custom);
    }

    #[test]
    fn test_validate_rejects_escaping_subdirectory() {
        for sub in ["", "../outside", "/abs/path", "a/../../b"] {
            let config = Configuration::new("GameData", sub, StrategyKind::Binary);
            match config.validate() {
                Err(SaveLoadError::Configuration(_)) => {}
                other => panic!("expected configuration error for '{sub}', got {other:?}"),
            }
        }
        Configuration::new("GameData", "SaveData/slots", StrategyKind::Binary)
            .validate()
            .expect("nested relative subdirectory is valid");
    }

    #[test]
    fn test_validate_requires_key_for_encrypted_kinds() {
        let config = Configuration::new("GameData", "SaveData", StrategyKind::EncryptedBinary);
        assert!(matches!(
            config.validate(),
            Err(SaveLoadError::Configuration(_))
        ));
        config
            .with_encryption("passphrase", "")
            .validate()
            .expect("empty salt is allowed");
    }

    #[test]
    fn test_debug_redacts_encryption_material() {
        let config = Configuration::new("GameData", "SaveData", StrategyKind::EncryptedBinary)
            .with_encryption("hunter2", "pepper");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("pepper"));
        assert!(debug.contains("[REDACTED]"));
    }
}
