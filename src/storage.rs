use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use serde_json::Value;

use crate::error::StorageError;

/// Synchronous key-value persistence, the only side channel the store
/// writes to. Each collection is written back in full under a fixed key
/// after every mutation; a reader sees the last written value or nothing.
pub trait Storage {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Storage that never leaves the process. Backs tests and throwaway
/// sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, Value>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<DirStorage, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        Ok(DirStorage { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for DirStorage {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.key_path(key);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(_) => return None,
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Unable to parse '{}': {}", path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let file = File::create(self.key_path(key))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer(&mut out, &value)?;
        out.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("coursetrack-storage-{}", Uuid::new_v4()))
    }

    #[test]
    fn memory_storage_overwrites() {
        let mut storage = MemoryStorage::default();

        storage.set("users", json!([1, 2])).unwrap();
        storage.set("users", json!([1, 2, 3])).unwrap();

        assert_eq!(storage.get("users"), Some(json!([1, 2, 3])));
        assert_eq!(storage.get("courses"), None);
    }

    #[test]
    fn dir_storage_round_trips() {
        let dir = scratch_dir();
        let mut storage = DirStorage::open(&dir).expect("unable to open scratch storage");

        storage.set("courses", json!([{"name": "Calculus I"}])).unwrap();

        let reopened = DirStorage::open(&dir).expect("unable to reopen scratch storage");
        assert_eq!(reopened.get("courses"), Some(json!([{"name": "Calculus I"}])));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn dir_storage_tolerates_garbage() {
        let dir = scratch_dir();
        let storage = DirStorage::open(&dir).expect("unable to open scratch storage");

        std::fs::write(dir.join("users.json"), b"{not json").unwrap();
        assert_eq!(storage.get("users"), None);

        std::fs::remove_dir_all(dir).ok();
    }
}
