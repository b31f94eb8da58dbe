//! In-memory key-value store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tabsage_core::Result;
use tabsage_core::storage::KeyValueStore;
use tokio::sync::RwLock;

/// [`KeyValueStore`] that lives only as long as the process.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently stored.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.values.read().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        let values = self.values.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn set(&self, record: HashMap<String, Value>) -> Result<()> {
        self.values.write().await.extend(record);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let mut values = self.values.write().await;
        for key in keys {
            values.remove(key);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryKeyValueStore::new();
        store
            .set(HashMap::from([
                ("tab_2".to_string(), json!("b")),
                ("tab_1".to_string(), json!("a")),
            ]))
            .await
            .unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["tab_1", "tab_2"]);
        store.remove(&["tab_2".to_string()]).await.unwrap();
        assert_eq!(store.snapshot().await, HashMap::from([("tab_1".to_string(), json!("a"))]));
    }
}
