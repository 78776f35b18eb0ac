//! Persistence for the stage state record.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;
use thiserror::Error;

use crate::state::StageState;

/// Well-known key the single stage record lives under. The suffix versions
/// the record layout; bump it when a field changes meaning.
pub const STORAGE_KEY: &str = "checklist-stage:v1";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for stage state storage backends.
pub trait StateStore: Send + Sync {
    /// Save a record.
    fn save(&self, key: &str, state: &StageState) -> StorageResult<()>;

    /// Load a record.
    fn load(&self, key: &str) -> StorageResult<StageState>;

    /// Delete a record.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a record exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Loads the stage record under [`STORAGE_KEY`], normalized, with defaults
/// when nothing usable is stored.
///
/// A missing record is the normal first-launch case. Any other failure
/// (unreadable file, corrupt JSON) is logged and also falls back, so a
/// damaged record can never prevent startup.
pub fn load_or_default(store: &dyn StateStore) -> StageState {
    match store.load(STORAGE_KEY) {
        Ok(state) => state.normalize(),
        Err(StorageError::NotFound(_)) => StageState::default(),
        Err(err) => {
            log::warn!("failed to load stage state: {err}; starting from defaults");
            StageState::default()
        }
    }
}

/// File-based store.
///
/// Keeps each record as a JSON file in a base directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Creates a store over the given base directory, creating the
    /// directory if it does not exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Creates a store in the platform's local data directory.
    ///
    /// On Unix: `~/.local/share/fusen/`
    /// On Windows: `%LOCALAPPDATA%\fusen\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("could not determine a data directory".to_string()))?;

        Self::new(base.join("fusen"))
    }

    /// Returns the base directory.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn record_path(&self, key: &str) -> PathBuf {
        // Sanitize the key to be safe for filenames.
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }
}

impl StateStore for FileStore {
    fn save(&self, key: &str, state: &StageState) -> StorageResult<()> {
        let path = self.record_path(key);
        let json = serde_json::to_string(state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("failed to write {}: {}", path.display(), e)))
    }

    fn load(&self, key: &str) -> StorageResult<StageState> {
        let path = self.record_path(key);
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.record_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.record_path(key).exists())
    }
}

/// In-memory store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, StageState>>,
}

impl MemoryStore {
    /// Creates a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save(&self, key: &str, state: &StageState) -> StorageResult<()> {
        self.records.write().insert(key.to_string(), state.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<StageState> {
        self.records
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.records.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.records.read().contains_key(key))
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_the_record() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let state = StageState {
            raw_text: "Buy milk\nWalk dog".to_string(),
            ..StageState::default()
        };

        store.save(STORAGE_KEY, &state).unwrap();
        let loaded = store.load(STORAGE_KEY).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let result = store.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let state = StageState::default();
        store.save(STORAGE_KEY, &state).unwrap();

        // The colon in the well-known key must not reach the filesystem.
        assert!(dir.path().join("checklist-stage_v1.json").exists());
        assert!(store.exists(STORAGE_KEY).unwrap());
    }

    #[test]
    fn file_store_delete_removes_the_record() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.save(STORAGE_KEY, &StageState::default()).unwrap();
        assert!(store.exists(STORAGE_KEY).unwrap());

        store.delete(STORAGE_KEY).unwrap();
        assert!(!store.exists(STORAGE_KEY).unwrap());
        // Deleting again is not an error.
        store.delete(STORAGE_KEY).unwrap();
    }

    #[test]
    fn memory_store_round_trips_the_record() {
        let store = MemoryStore::new();
        assert!(!store.exists(STORAGE_KEY).unwrap());

        store.save(STORAGE_KEY, &StageState::default()).unwrap();
        assert!(store.exists(STORAGE_KEY).unwrap());
        assert_eq!(store.load(STORAGE_KEY).unwrap(), StageState::default());

        store.delete(STORAGE_KEY).unwrap();
        assert!(matches!(store.load(STORAGE_KEY), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn load_or_default_normalizes_stored_garbage() {
        let store = MemoryStore::new();
        let state = StageState {
            outline_width: 5.0,
            text_color: "not-a-color".to_string(),
            ..StageState::default()
        };
        store.save(STORAGE_KEY, &state).unwrap();

        let loaded = load_or_default(&store);
        assert_eq!(loaded.outline_width, 4.0);
        assert_eq!(loaded.text_color, StageState::default().text_color);
    }

    #[test]
    fn load_or_default_survives_a_corrupt_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        std::fs::write(dir.path().join("checklist-stage_v1.json"), "{ not json").unwrap();

        let loaded = load_or_default(&store);
        assert_eq!(loaded, StageState::default());
    }

    #[test]
    fn load_or_default_on_an_empty_store_is_the_default() {
        let store = MemoryStore::new();
        assert_eq!(load_or_default(&store), StageState::default());
    }
}
