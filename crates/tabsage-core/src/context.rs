//! Grounding context types and the content collaborators that feed them.
//!
//! The collaborators are external services (browser tab APIs, content
//! indexes); only their consumed interfaces are defined here.

use crate::error::Result;
use crate::scope::Scope;
use crate::session::TabId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The tab a query is made from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub url: String,
}

impl TabSnapshot {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }

    /// Registrable domain of the tab's URL, if it has a host.
    pub fn domain(&self) -> Option<String> {
        registrable_domain(&self.url)
    }
}

/// A ranked piece of indexed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Where the text came from (usually a URL).
    pub source: String,
    pub text: String,
    /// Higher is more relevant.
    pub score: f64,
}

/// Knows which tabs exist and which one is active.
#[async_trait]
pub trait TabRegistry: Send + Sync {
    async fn get_active_tab(&self) -> Result<Option<TabSnapshot>>;

    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabSnapshot>>;
}

/// Extracts the visible text of a tab.
#[async_trait]
pub trait PageContentExtractor: Send + Sync {
    async fn get_visible_text(&self, tab_id: TabId) -> Result<String>;
}

/// Content index over pages sharing a registrable domain.
#[async_trait]
pub trait DomainIndex: Send + Sync {
    /// Returns snippets for `text` ranked best-first.
    async fn query(&self, domain: &str, text: &str) -> Result<Vec<Snippet>>;
}

/// Content index over everything the user has seen.
#[async_trait]
pub trait GlobalIndex: Send + Sync {
    /// Returns snippets for `text` ranked best-first.
    async fn query(&self, text: &str) -> Result<Vec<Snippet>>;
}

/// One unit of assembled context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSegment {
    pub source: String,
    pub text: String,
    pub relevance: f64,
    /// Position in the order the source produced it.
    pub position: usize,
}

/// Bounded grounding text for a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub scope: Scope,
    pub segments: Vec<ContextSegment>,
    /// True when segments were dropped or cut to fit the budget.
    pub truncated: bool,
}

impl ContextBlock {
    pub const SEPARATOR: &'static str = "\n\n";

    pub fn empty(scope: Scope) -> Self {
        Self {
            scope,
            segments: Vec::new(),
            truncated: false,
        }
    }

    /// Joined segment text.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }

    /// Length of [`ContextBlock::text`] in characters.
    pub fn char_len(&self) -> usize {
        let text: usize = self.segments.iter().map(|s| s.text.chars().count()).sum();
        let separators = self.segments.len().saturating_sub(1) * Self::SEPARATOR.len();
        text + separators
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Splits page text into paragraphs at blank lines, in document order.
///
/// Lines are trimmed; whitespace-only paragraphs are dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

/// Derives the registrable domain of `url`.
///
/// Drops a leading `www.` and keeps the last two host labels, or three when
/// the URL sits under a two-letter country code with a generic second level
/// (`bbc.co.uk`, `example.com.au`). IP hosts are returned as-is.
pub fn registrable_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    if host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>().is_ok() {
        return Some(host);
    }

    let host = host.strip_prefix("www.").unwrap_or(&host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return Some(labels.join("."));
    }

    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && is_generic_second_level(second) {
        3
    } else {
        2
    };

    Some(labels[labels.len() - keep..].join("."))
}

fn is_generic_second_level(label: &str) -> bool {
    matches!(
        label,
        "co" | "com" | "org" | "net" | "ac" | "gov" | "edu" | "ne" | "or"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, position: usize) -> ContextSegment {
        ContextSegment {
            source: "page".into(),
            text: text.into(),
            relevance: 1.0,
            position,
        }
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(
            registrable_domain("https://www.example.com/pricing").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            registrable_domain("https://docs.rs/tokio/latest").as_deref(),
            Some("docs.rs")
        );
        assert_eq!(
            registrable_domain("https://news.bbc.co.uk/world").as_deref(),
            Some("bbc.co.uk")
        );
        assert_eq!(
            registrable_domain("https://a.b.example.org/").as_deref(),
            Some("example.org")
        );
        assert_eq!(
            registrable_domain("http://127.0.0.1:8080/x").as_deref(),
            Some("127.0.0.1")
        );
        assert_eq!(registrable_domain("not a url"), None);
        assert_eq!(registrable_domain("about:blank"), None);
    }

    #[test]
    fn test_context_text_and_len_agree() {
        let block = ContextBlock {
            scope: Scope::Page,
            segments: vec![segment("héllo", 0), segment("world", 1)],
            truncated: false,
        };
        assert_eq!(block.text(), "héllo\n\nworld");
        assert_eq!(block.char_len(), block.text().chars().count());
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "  Coral reefs\ncover 1%.\n\n\n   \nBleaching is rising.  \n";
        assert_eq!(
            split_paragraphs(text),
            vec!["Coral reefs\ncover 1%.", "Bleaching is rising."]
        );
        assert!(split_paragraphs(" \n\t\n").is_empty());
    }

    #[test]
    fn test_empty_block() {
        let block = ContextBlock::empty(Scope::All);
        assert!(block.is_empty());
        assert_eq!(block.text(), "");
        assert_eq!(block.char_len(), 0);
    }
}
