//! Session domain model.
//!
//! This module contains the per-tab Session entity that the orchestrator
//! mutates and the session store persists.

use super::search_log::SearchResultLog;

/// Browser tab identifier; the sole key of a session.
pub type TabId = u64;

/// The tab-isolated state bundle.
///
/// A session contains:
/// - The latest page summary
/// - The latest answer (single slot, overwritten by each question)
/// - The running log of search results
/// - Display and model preferences
///
/// This is the "pure" domain model that business logic operates on,
/// independent of the persisted record format.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub tab_id: TabId,
    pub summary: Option<String>,
    pub answer: Option<String>,
    pub search_results: SearchResultLog,
    pub dark_mode: bool,
    /// Provider id used for summaries; always resolves to a registered provider.
    pub current_model_id: String,
}

impl Session {
    /// Creates an empty session for `tab_id` using `default_model`.
    pub fn new(tab_id: TabId, default_model: impl Into<String>) -> Self {
        Self {
            tab_id,
            summary: None,
            answer: None,
            search_results: SearchResultLog::new(),
            dark_mode: false,
            current_model_id: default_model.into(),
        }
    }

    /// True once a summary has been stored for this tab.
    pub fn is_summarized(&self) -> bool {
        self.summary.is_some()
    }

    /// Key of the persisted record: `tab_{tabId}`.
    pub fn storage_key(&self) -> String {
        storage_key(self.tab_id)
    }
}

/// Storage key for a tab's session record.
pub fn storage_key(tab_id: TabId) -> String {
    format!("tab_{}", tab_id)
}

/// Inverse of [`storage_key`]; `None` for keys that are not session records.
pub fn tab_id_from_key(key: &str) -> Option<TabId> {
    key.strip_prefix("tab_")?.parse().ok()
}
