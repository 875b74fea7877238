//! Key-value storage for persisted SKU tokens.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use parking_lot::Mutex;
use thiserror::Error;

/// INI section holding all account values.
pub const STORE_SECTION: &str = "navigation.accounts";

/// Errors from token storage backends.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Failed to read the backing file.
    #[error("failed to read token store {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// Failed to write the backing file.
    #[error("failed to write token store {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Persistent string storage keyed by name.
///
/// Implementations use interior mutability so a single store can be shared
/// between the accounts component and anything else that reads tokens.
pub trait TokenStore: Send + Sync {
    /// Returns the stored value, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;

    /// Removes a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), TokenStoreError>;
}

/// In-memory token store, for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Token store persisted as an INI file.
///
/// The whole file is rewritten on every change; the number of entries is
/// tiny and writes only happen on token rotation.
#[derive(Debug)]
pub struct IniTokenStore {
    path: PathBuf,
    ini: Mutex<Ini>,
}

impl IniTokenStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TokenStoreError> {
        let path = path.into();
        let ini = if path.exists() {
            Ini::load_from_file(&path).map_err(|e| TokenStoreError::Read {
                path: path.clone(),
                reason: e.to_string(),
            })?
        } else {
            Ini::new()
        };

        tracing::debug!(path = %path.display(), "Opened token store");
        Ok(Self {
            path,
            ini: Mutex::new(ini),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, ini: &Ini) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| TokenStoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        ini.write_to_file(&self.path)
            .map_err(|source| TokenStoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

impl TokenStore for IniTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.ini
            .lock()
            .get_from(Some(STORE_SECTION), key)
            .map(str::to_string)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        let mut ini = self.ini.lock();
        ini.with_section(Some(STORE_SECTION)).set(key, value);
        self.persist(&ini)
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        let mut ini = self.ini.lock();
        if ini.delete_from(Some(STORE_SECTION), key).is_none() {
            return Ok(());
        }
        self.persist(&ini)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get("a"), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a"), Some("1".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_memory_store_with_entries() {
        let store = MemoryTokenStore::with_entries([("k", "v")]);
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_ini_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = IniTokenStore::open(dir.path().join("missing.ini")).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_ini_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("accounts.ini");

        let store = IniTokenStore::open(&path).unwrap();
        store.set("navigation.accounts.mau.skutoken", "abc123").unwrap();
        drop(store);

        let reopened = IniTokenStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("navigation.accounts.mau.skutoken").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_ini_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.ini");

        let store = IniTokenStore::open(&path).unwrap();
        store.set("token", "x").unwrap();
        store.remove("token").unwrap();
        store.remove("never-set").unwrap();

        let reopened = IniTokenStore::open(&path).unwrap();
        assert_eq!(reopened.get("token"), None);
    }
}
