//! Key/value persistence for the calendar.
//!
//! The event store only needs "read a text value by key" and "replace a text
//! value by key", so backends are small: [`MemoryStorage`] for tests and
//! [`FileStorage`], which keeps each key in its own JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage key holding the serialized events.
pub const EVENTS_KEY: &str = "calendarEvents";

/// Storage key that receives the raw stored events when they could not be
/// read in full, before the first write replaces them.
pub const EVENTS_BACKUP_KEY: &str = "calendarEvents-corrupt";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("storage is read-only")]
    ReadOnly,
}

pub trait KeyValueStore {
    /// `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }

    /// Reject every write, for exercising failed persists.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write to a sibling file first so readers never see a partial value.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(StorageError::Io { path, source });
        }

        log::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get(EVENTS_KEY).unwrap(), None);
        storage.set(EVENTS_KEY, "{}").unwrap();
        assert_eq!(storage.get(EVENTS_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn read_only_memory_storage_rejects_writes() {
        let mut storage = MemoryStorage::with_value(EVENTS_KEY, "{}");
        storage.set_read_only(true);
        assert!(matches!(
            storage.set(EVENTS_KEY, "[]"),
            Err(StorageError::ReadOnly)
        ));
        assert_eq!(storage.value(EVENTS_KEY), Some("{}"));
    }

    #[test]
    fn file_storage_missing_key_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("not-created-yet"));
        assert_eq!(storage.get(EVENTS_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        storage.set(EVENTS_KEY, r#"{"a":1}"#).unwrap();
        storage.set(EVENTS_KEY, r#"{"b":2}"#).unwrap();

        let path = storage.path_for(EVENTS_KEY).unwrap();
        assert_eq!(path.file_name().unwrap(), "calendarEvents.json");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"b":2}"#);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        // A non-empty directory where the file should go cannot be replaced.
        let path = storage.path_for(EVENTS_KEY).unwrap();
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        assert!(matches!(
            storage.set(EVENTS_KEY, "{}"),
            Err(StorageError::Io { .. })
        ));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.get("").is_err());
    }
}
