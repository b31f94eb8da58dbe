//! Append-only log of search results kept inside a session.

use serde::{Deserialize, Serialize};

/// A single stored search answer.
///
/// Immutable once created; the log orders entries by insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    /// Wall-clock time of the append, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Ordered collection of search results.
///
/// Appending produces a new log and leaves the receiver untouched, so a
/// caller can prepare the next state and discard it if persisting fails.
///
/// Ids are `"{timestamp}-{seq}"` where `seq` is a per-log sequence number.
/// The sequence starts at the number of loaded entries, so ids stay unique
/// even when two appends land in the same millisecond.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultLog {
    entries: Vec<SearchResult>,
    next_seq: u64,
}

impl SearchResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from persisted entries, preserving their order.
    pub fn from_entries(entries: Vec<SearchResult>) -> Self {
        let next_seq = entries.len() as u64;
        Self { entries, next_seq }
    }

    /// Returns a new log with `content` appended.
    pub fn append(&self, content: impl Into<String>, timestamp: i64) -> Self {
        let mut entries = self.entries.clone();
        entries.push(SearchResult {
            id: format!("{}-{}", timestamp, self.next_seq),
            content: content.into(),
            timestamp,
        });

        Self {
            entries,
            next_seq: self.next_seq + 1,
        }
    }

    pub fn entries(&self) -> &[SearchResult] {
        &self.entries
    }

    pub fn last(&self) -> Option<&SearchResult> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<SearchResult> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_append_does_not_mutate_previous_log() {
        let empty = SearchResultLog::new();
        let one = empty.append("first", 1_000);
        let two = one.append("second", 2_000);

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(two.entries()[0], one.entries()[0]);
        assert_eq!(two.last().unwrap().content, "second");
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut log = SearchResultLog::new();
        for i in 0..50 {
            log = log.append(format!("answer {i}"), 1_700_000_000_000);
        }

        let ids: HashSet<_> = log.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_reloaded_log_continues_sequence() {
        let log = SearchResultLog::new().append("a", 5).append("b", 5);
        let reloaded = SearchResultLog::from_entries(log.clone().into_entries());
        let extended = reloaded.append("c", 5);

        let ids: HashSet<_> = extended.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(extended.last().unwrap().id, "5-2");
    }

    #[test]
    fn test_legacy_millisecond_ids_do_not_collide() {
        let legacy = vec![SearchResult {
            id: "1700000000000".to_string(),
            content: "old".to_string(),
            timestamp: 1_700_000_000_000,
        }];
        let log = SearchResultLog::from_entries(legacy).append("new", 1_700_000_000_000);
        assert_ne!(log.entries()[0].id, log.entries()[1].id);
    }
}
