use crate::data_manager::{DataError, DataResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Get/set of whole JSON documents by key.
///
/// Reads never fail: anything unreadable is reported as absent and the caller
/// substitutes its default.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

/// One pretty-printed `<key>.json` file per document.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> DataResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    pub fn read(&self, key: &str) -> DataResult<Option<Value>> {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn write(&self, key: &str, value: &Value) -> DataResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        let file = fs::File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        match fs::rename(&temp_path, &path) {
            Ok(()) => Ok(()),
            Err(_err) if path.exists() => {
                let _ = fs::remove_file(&path);
                fs::rename(&temp_path, &path).map_err(DataError::from)
            }
            Err(err) => Err(DataError::from(err)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        match self.read(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "ignoring unreadable document");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: Value) {
        if let Err(err) = self.write(key, &value) {
            error!(key, %err, "failed to write document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::fs;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.get("missing").is_none());

        store.set("doc", json!({ "a": 1 }));
        assert_eq!(store.get("doc"), Some(json!({ "a": 1 })));
    }

    #[test]
    fn file_store_writes_and_reads_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path()).expect("create store");

        store.set("WORKOUT_SAVED_V1", json!([{ "name": "Legs" }]));

        assert!(store.path_for("WORKOUT_SAVED_V1").exists());
        assert!(!store.path_for("WORKOUT_SAVED_V1").with_extension("tmp").exists());
        assert_eq!(
            store.get("WORKOUT_SAVED_V1"),
            Some(json!([{ "name": "Legs" }]))
        );
    }

    #[test]
    fn file_store_treats_invalid_json_as_absent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileStore::new(dir.path()).expect("create store");
        fs::write(store.path_for("broken"), "{ not json").expect("write file");
        fs::write(store.path_for("blank"), "   \n").expect("write file");

        assert!(store.read("broken").is_err());
        assert!(store.get("broken").is_none());
        assert!(store.get("blank").is_none());
        assert!(store.get("missing").is_none());
    }
}
