//! Session record DTO.

use serde::{Deserialize, Serialize};
use tabsage_core::session::{SearchResult, SearchResultLog, Session, TabId};

/// Stored search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub id: String,
    pub content: String,
    pub timestamp: i64,
}

/// The value stored under `tab_{id}`.
///
/// Field names follow the browser extension layout so records written by
/// either side stay readable. Unknown fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub search_results: Vec<SearchResultRecord>,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub current_model: Option<String>,
    /// Milliseconds since the epoch of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
}

impl SessionRecord {
    pub fn from_domain(session: &Session, saved_at: i64) -> Self {
        Self {
            summary: session.summary.clone(),
            answer: session.answer.clone(),
            search_results: session
                .search_results
                .iter()
                .map(|result| SearchResultRecord {
                    id: result.id.clone(),
                    content: result.content.clone(),
                    timestamp: result.timestamp,
                })
                .collect(),
            dark_mode: session.dark_mode,
            current_model: Some(session.current_model_id.clone()),
            saved_at: Some(saved_at),
        }
    }

    /// Rebuilds the domain session; a missing model falls back to `default_model`.
    pub fn into_domain(self, tab_id: TabId, default_model: &str) -> Session {
        let entries = self
            .search_results
            .into_iter()
            .map(|record| SearchResult {
                id: record.id,
                content: record.content,
                timestamp: record.timestamp,
            })
            .collect();

        Session {
            tab_id,
            summary: self.summary,
            answer: self.answer,
            search_results: SearchResultLog::from_entries(entries),
            dark_mode: self.dark_mode,
            current_model_id: self
                .current_model
                .filter(|model| !model.is_empty())
                .unwrap_or_else(|| default_model.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_extension_layout() {
        let mut session = Session::new(3, "perplexity");
        session.summary = Some("Reefs are dying.".into());
        session.dark_mode = true;
        session.search_results = session.search_results.append("Three tiers.", 1_700_000_000_000);

        let value = serde_json::to_value(SessionRecord::from_domain(&session, 42)).unwrap();
        assert_eq!(
            value,
            json!({
                "summary": "Reefs are dying.",
                "searchResults": [
                    {"id": "1700000000000-0", "content": "Three tiers.", "timestamp": 1_700_000_000_000i64}
                ],
                "darkMode": true,
                "currentModel": "perplexity",
                "savedAt": 42
            })
        );
    }

    #[test]
    fn test_reads_sparse_record() {
        let record: SessionRecord =
            serde_json::from_value(json!({"answer": "Bleaching.", "extra": 1})).unwrap();
        let session = record.into_domain(9, "gemini");

        assert_eq!(session.tab_id, 9);
        assert_eq!(session.answer.as_deref(), Some("Bleaching."));
        assert!(session.summary.is_none());
        assert!(session.search_results.is_empty());
        assert!(!session.dark_mode);
        assert_eq!(session.current_model_id, "gemini");
    }

    #[test]
    fn test_loaded_log_keeps_ids_unique() {
        let record: SessionRecord = serde_json::from_value(json!({
            "searchResults": [{"id": "5-0", "content": "a", "timestamp": 5}],
            "currentModel": "gemini"
        }))
        .unwrap();
        let session = record.into_domain(1, "gemini");
        let log = session.search_results.append("b", 5);

        assert_eq!(log.len(), 2);
        assert_ne!(log.entries()[0].id, log.entries()[1].id);
    }
}
