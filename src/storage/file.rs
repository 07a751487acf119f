//! One JSON document per key under a data directory.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use super::KeyValueStore;
use crate::errors::{error_logging, AppError, AppResult};
use crate::observability;

/// File-backed store: `<data_dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::Validation(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn write_atomically(&self, path: &Path, value: &str) -> AppResult<()> {
        // Write next to the target, then rename over it
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _span = observability::storage_span("get", key).entered();
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                observability::record_storage_metrics("get", key, true);
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "No stored document yet");
                Ok(None)
            }
            Err(e) => {
                error_logging::log_storage_error(&e, "get", key);
                observability::record_storage_metrics("get", key, false);
                Err(e.into())
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _span = observability::storage_span("set", key).entered();
        let path = self.path_for(key)?;
        let result = self.write_atomically(&path, value);
        if let Err(e) = &result {
            error_logging::log_storage_error(e, "set", key);
        }
        observability::record_storage_metrics("set", key, result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_and_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.get("chefsnap_ratings").unwrap(), None);
        store.set("chefsnap_ratings", "{\"Soup\":[4]}").unwrap();
        store.set("chefsnap_ratings", "{\"Soup\":[4,5]}").unwrap();
        assert_eq!(
            store.get("chefsnap_ratings").unwrap().as_deref(),
            Some("{\"Soup\":[4,5]}")
        );
        assert!(store.dir().join("chefsnap_ratings.json").is_file());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
