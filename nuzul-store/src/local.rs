use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use dashmap::DashMap;
use nuzul_core::storage::LocalStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed store: one file per key inside a dedicated directory, the
/// desktop analog of a browser's per-origin storage.
///
/// Reads return `None` for anything unreadable. Writes go through a
/// temp-file rename so a crash mid-write leaves the previous value intact,
/// and write failures are logged and swallowed per the [`LocalStore`]
/// best-effort contract.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let result = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &path));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "storage write failed, value not persisted");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = fs::remove_file(self.path_for(key)) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(key, error = %e, "storage remove failed");
            }
        }
    }
}

/// Concurrent in-memory store for tests and headless harnesses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}
