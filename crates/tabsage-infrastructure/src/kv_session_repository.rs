//! SessionRepository over a key-value store.

use crate::dto::SessionRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tabsage_core::config::RetentionPolicy;
use tabsage_core::session::{Session, SessionRepository, TabId, storage_key, tab_id_from_key};
use tabsage_core::storage::KeyValueStore;
use tabsage_core::{Result, TabSageError};

/// Persists each session as one `tab_{id}` record.
///
/// Saves replace the record wholesale. After every save, records beyond
/// `retention.max_sessions` are evicted oldest-`savedAt` first; the record
/// just written is never evicted. A limit of zero disables eviction.
/// A failed eviction pass is logged and does not fail the save.
pub struct KeyValueSessionRepository {
    store: Arc<dyn KeyValueStore>,
    default_model: String,
    retention: RetentionPolicy,
}

impl KeyValueSessionRepository {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        default_model: impl Into<String>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            store,
            default_model: default_model.into(),
            retention,
        }
    }

    async fn enforce_retention(&self, keep: TabId) -> Result<()> {
        let limit = self.retention.max_sessions;
        if limit == 0 {
            return Ok(());
        }

        let keys: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|key| tab_id_from_key(key).is_some())
            .collect();
        if keys.len() <= limit {
            return Ok(());
        }

        let records = self.store.get(&keys).await?;
        let mut stamped: Vec<(i64, TabId, String)> = records
            .into_iter()
            .filter_map(|(key, value)| {
                let tab_id = tab_id_from_key(&key)?;
                let saved_at = value.get("savedAt").and_then(|v| v.as_i64()).unwrap_or(0);
                Some((saved_at, tab_id, key))
            })
            .filter(|(_, tab_id, _)| *tab_id != keep)
            .collect();
        stamped.sort();

        let excess = keys.len() - limit;
        let evicted: Vec<String> = stamped.into_iter().take(excess).map(|(_, _, key)| key).collect();
        if !evicted.is_empty() {
            tracing::info!(
                "[KeyValueSessionRepository] Evicting {} session record(s) over limit {}",
                evicted.len(),
                limit
            );
            self.store.remove(&evicted).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for KeyValueSessionRepository {
    async fn load(&self, tab_id: TabId) -> Result<Option<Session>> {
        let key = storage_key(tab_id);
        let mut values = self.store.get(std::slice::from_ref(&key)).await?;

        let Some(value) = values.remove(&key) else {
            return Ok(None);
        };

        let record: SessionRecord = serde_json::from_value(value)
            .map_err(|e| TabSageError::storage(format!("Malformed record '{}': {}", key, e)))?;
        Ok(Some(record.into_domain(tab_id, &self.default_model)))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let key = session.storage_key();
        let saved_at = chrono::Utc::now().timestamp_millis();
        let value = serde_json::to_value(SessionRecord::from_domain(session, saved_at))?;

        self.store.set(HashMap::from([(key, value)])).await?;
        tracing::debug!("[KeyValueSessionRepository] Saved tab {}", session.tab_id);

        if let Err(e) = self.enforce_retention(session.tab_id).await {
            tracing::warn!(
                "[KeyValueSessionRepository] Retention pass failed after saving tab {}: {}",
                session.tab_id,
                e
            );
        }
        Ok(())
    }

    async fn delete(&self, tab_id: TabId) -> Result<()> {
        self.store.remove(&[storage_key(tab_id)]).await
    }

    async fn list_tab_ids(&self) -> Result<Vec<TabId>> {
        let mut ids: Vec<TabId> = self
            .store
            .keys()
            .await?
            .iter()
            .filter_map(|key| tab_id_from_key(key))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use serde_json::{Value, json};

    /// Store whose key listing fails; reads and writes go through.
    struct UnlistableStore(MemoryKeyValueStore);

    #[async_trait]
    impl KeyValueStore for UnlistableStore {
        async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
            self.0.get(keys).await
        }

        async fn set(&self, record: HashMap<String, Value>) -> Result<()> {
            self.0.set(record).await
        }

        async fn remove(&self, keys: &[String]) -> Result<()> {
            self.0.remove(keys).await
        }

        async fn keys(&self) -> Result<Vec<String>> {
            Err(TabSageError::storage("listing unavailable"))
        }
    }

    fn repository(store: Arc<MemoryKeyValueStore>, max_sessions: usize) -> KeyValueSessionRepository {
        KeyValueSessionRepository::new(store, "gemini", RetentionPolicy { max_sessions })
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let repo = repository(store.clone(), 10);

        let mut session = Session::new(4, "perplexity");
        session.summary = Some("Pricing page".into());
        repo.save(&session).await.unwrap();

        let loaded = repo.load(4).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert!(store.snapshot().await.contains_key("tab_4"));
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let repo = repository(Arc::new(MemoryKeyValueStore::new()), 10);
        assert!(repo.load(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_is_storage_error() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set(HashMap::from([("tab_1".to_string(), json!("garbage"))]))
            .await
            .unwrap();

        let err = repository(store, 10).load(1).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_keys() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set(HashMap::from([("settings".to_string(), json!({}))]))
            .await
            .unwrap();
        let repo = repository(store, 10);
        repo.save(&Session::new(12, "gemini")).await.unwrap();
        repo.save(&Session::new(3, "gemini")).await.unwrap();

        assert_eq!(repo.list_tab_ids().await.unwrap(), vec![3, 12]);
        repo.delete(12).await.unwrap();
        assert_eq!(repo.list_tab_ids().await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_retention_evicts_oldest() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set(HashMap::from([
                ("tab_1".to_string(), json!({"savedAt": 100})),
                ("tab_2".to_string(), json!({"savedAt": 200})),
                ("tab_3".to_string(), json!({})),
            ]))
            .await
            .unwrap();
        let repo = repository(store, 2);

        repo.save(&Session::new(4, "gemini")).await.unwrap();

        assert_eq!(repo.list_tab_ids().await.unwrap(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_zero_limit_keeps_everything() {
        let repo = repository(Arc::new(MemoryKeyValueStore::new()), 0);
        for tab in 0..5 {
            repo.save(&Session::new(tab, "gemini")).await.unwrap();
        }
        assert_eq!(repo.list_tab_ids().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_failed_retention_does_not_fail_save() {
        let repo = KeyValueSessionRepository::new(
            Arc::new(UnlistableStore(MemoryKeyValueStore::new())),
            "gemini",
            RetentionPolicy { max_sessions: 1 },
        );
        let mut session = Session::new(8, "gemini");
        session.answer = Some("Saved anyway.".into());

        repo.save(&session).await.unwrap();

        assert_eq!(repo.load(8).await.unwrap(), Some(session));
    }
}
