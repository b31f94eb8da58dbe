//! Key-value store persisted as a single JSON object.

use super::atomic_json::AtomicJsonFile;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabsage_core::storage::KeyValueStore;
use tabsage_core::{Result, TabSageError};

type Document = BTreeMap<String, Value>;

/// [`KeyValueStore`] backed by `storage.json`.
///
/// Every write is a locked read-modify-write of the whole document, so
/// concurrent writers for different keys never lose each other's records.
/// File I/O runs on the blocking pool.
#[derive(Clone)]
pub struct JsonFileKeyValueStore {
    file: Arc<AtomicJsonFile<Document>>,
}

impl JsonFileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path.into())),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicJsonFile<Document>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| TabSageError::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        let keys = keys.to_vec();
        self.blocking(move |file| {
            let document = file.load()?.unwrap_or_default();
            Ok(keys
                .into_iter()
                .filter_map(|key| document.get(&key).cloned().map(|value| (key, value)))
                .collect())
        })
        .await
    }

    async fn set(&self, record: HashMap<String, Value>) -> Result<()> {
        if record.is_empty() {
            return Ok(());
        }
        self.blocking(move |file| {
            file.update(Document::new(), |document| document.extend(record))?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let keys = keys.to_vec();
        self.blocking(move |file| {
            file.update(Document::new(), |document| {
                for key in &keys {
                    document.remove(key);
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.blocking(|file| Ok(file.load()?.unwrap_or_default().into_keys().collect()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(key: &str, value: Value) -> HashMap<String, Value> {
        HashMap::from([(key.to_string(), value)])
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("storage.json"));

        store
            .set(record("tab_1", json!({"summary": "Coral reefs"})))
            .await
            .unwrap();

        let values = store
            .get(&["tab_1".to_string(), "tab_2".to_string()])
            .await
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["tab_1"]["summary"], "Coral reefs");
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("storage.json"));

        store
            .set(record("tab_1", json!({"summary": "a", "answer": "b"})))
            .await
            .unwrap();
        store.set(record("tab_1", json!({"summary": "c"}))).await.unwrap();

        let values = store.get(&["tab_1".to_string()]).await.unwrap();
        assert_eq!(values["tab_1"], json!({"summary": "c"}));
    }

    #[tokio::test]
    async fn test_remove_and_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("storage.json"));

        store.set(record("tab_1", json!(1))).await.unwrap();
        store.set(record("tab_2", json!(2))).await.unwrap();
        store.remove(&["tab_1".to_string()]).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["tab_2".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("absent/storage.json"));
        assert!(store.keys().await.unwrap().is_empty());
        assert!(store.get(&["tab_1".to_string()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileKeyValueStore::new(path);

        let err = store.keys().await.unwrap_err();
        assert!(err.is_storage());
    }
}
