use super::tab_session::TabSession;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tabsage_core::Result;
use tabsage_core::session::{Session, SessionRepository, TabId};
use tokio::sync::RwLock;

/// Owns the live per-tab sessions and their persistence.
///
/// `SessionStore` is responsible for:
/// - Lazily creating a tab's session (loaded from storage or defaulted)
/// - Saving whole records after every mutation
/// - Tearing sessions down on tab close and pruning stale records
///
/// Storage failures never abort an operation: they are logged and the
/// session keeps working in memory.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<TabId, Arc<TabSession>>>>,
    repository: Arc<dyn SessionRepository>,
    default_model: String,
}

impl SessionStore {
    pub fn new(repository: Arc<dyn SessionRepository>, default_model: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            repository,
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the live session for `tab_id`, loading it on first access.
    ///
    /// A stored model id rejected by `is_known_model` is replaced by the
    /// default model.
    pub async fn open<F>(&self, tab_id: TabId, is_known_model: F) -> Arc<TabSession>
    where
        F: Fn(&str) -> bool,
    {
        if let Some(tab) = self.sessions.read().await.get(&tab_id) {
            return Arc::clone(tab);
        }

        let mut session = self.load(tab_id).await;
        if !is_known_model(&session.current_model_id) {
            tracing::warn!(
                "[SessionStore] Tab {} stored unknown model '{}', using '{}'",
                tab_id,
                session.current_model_id,
                self.default_model
            );
            session.current_model_id = self.default_model.clone();
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(tab_id)
                .or_insert_with(|| Arc::new(TabSession::new(session))),
        )
    }

    /// Loads the stored session, falling back to a fresh one.
    pub async fn load(&self, tab_id: TabId) -> Session {
        match self.repository.load(tab_id).await {
            Ok(Some(session)) => {
                tracing::debug!("[SessionStore] Loaded tab {} from storage", tab_id);
                session
            }
            Ok(None) => Session::new(tab_id, self.default_model.clone()),
            Err(e) => {
                tracing::warn!(
                    "[SessionStore] Failed to load tab {}: {}. Starting empty",
                    tab_id,
                    e
                );
                Session::new(tab_id, self.default_model.clone())
            }
        }
    }

    /// Writes the whole record; returns whether it reached storage.
    pub async fn save(&self, session: &Session) -> bool {
        match self.repository.save(session).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "[SessionStore] Failed to persist tab {}: {}. Keeping in-memory state",
                    session.tab_id,
                    e
                );
                false
            }
        }
    }

    /// True while `tab` is still the live session for its tab id.
    pub async fn is_live(&self, tab: &Arc<TabSession>) -> bool {
        self.sessions
            .read()
            .await
            .get(&tab.tab_id())
            .is_some_and(|current| Arc::ptr_eq(current, tab))
    }

    /// Tears down the tab's session and deletes its record.
    ///
    /// A commit that already passed its liveness check finishes saving
    /// before the record is deleted.
    pub async fn close(&self, tab_id: TabId) -> Result<()> {
        let removed = self.sessions.write().await.remove(&tab_id);
        if let Some(tab) = &removed {
            let _settled = tab.lock().await;
        }
        self.repository.delete(tab_id).await?;
        tracing::info!(
            "[SessionStore] Closed tab {} (was live: {})",
            tab_id,
            removed.is_some()
        );
        Ok(())
    }

    /// Deletes sessions and records of tabs not in `open_tabs`.
    ///
    /// Like [`SessionStore::close`], in-flight commits of pruned tabs finish
    /// saving before their records are deleted.
    ///
    /// Returns the pruned tab ids in ascending order.
    pub async fn prune(&self, open_tabs: &[TabId]) -> Result<Vec<TabId>> {
        let open: HashSet<TabId> = open_tabs.iter().copied().collect();

        let mut stale: Vec<TabId> = self
            .repository
            .list_tab_ids()
            .await?
            .into_iter()
            .filter(|tab_id| !open.contains(tab_id))
            .collect();

        let removed: Vec<Arc<TabSession>> = {
            let mut sessions = self.sessions.write().await;
            let live_stale: Vec<TabId> = sessions
                .keys()
                .filter(|tab_id| !open.contains(tab_id))
                .copied()
                .collect();
            live_stale
                .into_iter()
                .filter_map(|tab_id| sessions.remove(&tab_id))
                .collect()
        };
        for tab in &removed {
            let _settled = tab.lock().await;
            stale.push(tab.tab_id());
        }

        stale.sort_unstable();
        stale.dedup();
        for tab_id in &stale {
            self.repository.delete(*tab_id).await?;
        }

        tracing::info!("[SessionStore] Pruned {} stale tab(s)", stale.len());
        Ok(stale)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
