// Persisted settings behind a tiny key-value interface, so the controller layer never
// cares where the API key actually lives.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::errors::SettingsError;

pub const API_KEY_SETTING: &str = "elevenlabs_api_key";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

// A flat JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    // A missing or unreadable file just means nothing has been saved yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("ignoring unreadable settings file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// The key to use for requests: an explicit override (env) beats the stored value.
pub fn resolve_api_key(store: &dyn KeyValueStore, env_override: Option<&str>) -> Option<String> {
    env_override
        .map(str::to_string)
        .or_else(|| store.get(API_KEY_SETTING))
        .filter(|k| !k.trim().is_empty())
}
