// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port for DAE Stage tools.

use crate::{config_port::ConfigPort, prefs::EditorPrefs};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Key under which editor preferences are stored.
pub const PREFS_KEY: &str = "editor_prefs";

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// Key contains characters that cannot name a stored blob.
    #[error("invalid config key {0:?}")]
    InvalidKey(String),
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Returns `Ok(())` when `key` is a non-empty `[A-Za-z0-9_-]` identifier.
pub fn validate_key(key: &str) -> Result<(), ConfigError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidKey(key.to_owned()))
    }
}

/// Serializes config values as JSON and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the inner store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing or empty.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        validate_key(key)?;
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        validate_key(key)?;
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}

impl<S> ConfigPort for ConfigService<S>
where
    S: ConfigStore,
{
    fn load_prefs(&self) -> Option<EditorPrefs> {
        match self.load::<EditorPrefs>(PREFS_KEY) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable editor prefs");
                None
            }
        }
    }

    fn save_prefs(&self, prefs: &EditorPrefs) {
        if let Err(err) = self.save(PREFS_KEY, prefs) {
            tracing::warn!(error = %err, "failed to persist editor prefs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        blobs: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl ConfigStore for MemStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.blobs
                .borrow()
                .get(key)
                .cloned()
                .ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.blobs.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn missing_key_loads_as_none() {
        let svc = ConfigService::new(MemStore::default());
        let v: Option<u32> = svc.load("absent").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn blank_blob_loads_as_none() {
        let svc = ConfigService::new(MemStore::default());
        svc.store().save_raw("blank", b"  \n").unwrap();
        let v: Option<u32> = svc.load("blank").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn rejects_path_like_keys() {
        let svc = ConfigService::new(MemStore::default());
        let err = svc.save("../escape", &1u32).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(_)));
        assert!(validate_key("").is_err());
        assert!(validate_key("editor_prefs-2").is_ok());
    }

    #[test]
    fn prefs_port_persists_grid_size() {
        let svc = ConfigService::new(MemStore::default());
        assert!(svc.load_prefs().is_none());
        let mut prefs = EditorPrefs::default();
        prefs.scene.grid_size = 250.0;
        svc.save_prefs(&prefs);
        let back = svc.load_prefs().unwrap();
        assert_eq!(back.scene.grid_size, 250.0);
    }

    #[test]
    fn corrupt_prefs_fall_back_to_none() {
        let svc = ConfigService::new(MemStore::default());
        svc.store().save_raw(PREFS_KEY, b"{not json").unwrap();
        assert!(svc.load_prefs().is_none());
    }
}
