//! Common test utilities shared across integration tests.
#![allow(missing_docs)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use savekit_core::{
    SaveLoadError, SaveLoadManager, SaveLoadResult, SerializationStrategy, StrategyKind, Value,
};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

pub const BASE_DIRECTORY: &str = "GameData";
pub const SAVE_DIRECTORY: &str = "SaveData";
pub const TEST_ENCRYPTION_KEY: &str = "SaveLoadTestEncryptionKey";
pub const TEST_ENCRYPTION_SALT: &str = "SaveLoadTestEncryptionSalt";

/// Compact JSON, bound as the custom strategy in tests.
pub struct CompactJsonStrategy;

impl SerializationStrategy for CompactJsonStrategy {
    fn encode(&self, value: &Value) -> SaveLoadResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|err| SaveLoadError::Serialization(err.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> SaveLoadResult<Value> {
        serde_json::from_slice(bytes).map_err(|err| SaveLoadError::Deserialization(err.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveLoadTestObject {
    #[serde(rename = "listOfStrings")]
    pub list_of_strings: Vec<String>,
    pub count: i32,
}

impl SaveLoadTestObject {
    pub fn sample() -> Self {
        Self {
            list_of_strings: vec!["one".to_string(), "two".to_string()],
            count: 10,
        }
    }
}

/// A long-lived object other parts of a program keep references to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveLoadTestManagedObject {
    #[serde(rename = "textValue")]
    pub text_value: String,
    pub pt: [f32; 3],
    pub rot: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Weapon {
    Sword { damage: u32 },
    Bow { range: u32 },
}

/// A save with nested collections and an enum field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveLoadTestPlayer {
    pub inventory: BTreeMap<String, u32>,
    pub quests: Vec<String>,
    pub hotbar: HashMap<u32, String>,
    pub weapon: Weapon,
}

impl SaveLoadTestPlayer {
    pub fn saved() -> Self {
        Self {
            inventory: BTreeMap::from([("potion".to_string(), 1)]),
            quests: vec!["intro".to_string()],
            hotbar: HashMap::from([(1, "bow".to_string())]),
            weapon: Weapon::Bow { range: 5 },
        }
    }

    pub fn stale() -> Self {
        Self {
            inventory: BTreeMap::from([
                ("potion".to_string(), 4),
                ("stale_key".to_string(), 99),
            ]),
            quests: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            hotbar: HashMap::from([(1, "sword".to_string()), (2, "torch".to_string())]),
            weapon: Weapon::Sword { damage: 5 },
        }
    }
}

pub fn temp_root() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

pub fn create_manager(root: &Path, kind: StrategyKind) -> SaveLoadManager {
    create_manager_with_key(root, kind, TEST_ENCRYPTION_KEY)
}

pub fn create_manager_with_key(root: &Path, kind: StrategyKind, key: &str) -> SaveLoadManager {
    let manager = SaveLoadManager::create(
        root.join(BASE_DIRECTORY),
        SAVE_DIRECTORY,
        kind,
        key,
        TEST_ENCRYPTION_SALT,
    )
    .expect("create manager");
    if kind == StrategyKind::Custom {
        manager
            .bind_custom_strategy(CompactJsonStrategy)
            .expect("bind custom strategy");
    }
    manager
}
