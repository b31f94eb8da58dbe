//! Local archive of captured pages.
//!
//! Serves as both content indexes: [`DomainIndex`] restricts the search to
//! pages sharing a registrable domain, [`GlobalIndex`] searches everything.

use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tabsage_core::context::{DomainIndex, GlobalIndex, Snippet, registrable_domain, split_paragraphs};
use tabsage_core::{Result, TabSageError};

const DEFAULT_MAX_PAGES: usize = 200;
const DEFAULT_MAX_RESULTS: usize = 20;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "in",
    "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "where",
    "which", "who", "why", "with",
];

/// A captured page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedPage {
    pub url: String,
    pub domain: String,
    pub text: String,
    /// Milliseconds since the epoch.
    pub captured_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ArchiveDocument {
    #[serde(default)]
    pages: Vec<ArchivedPage>,
}

/// JSON-file page archive with term-overlap ranking.
///
/// Each paragraph of each page is scored by the share of distinct query
/// terms it contains. Results are ordered by score, then newer pages first,
/// then url, then paragraph order.
#[derive(Clone)]
pub struct PageArchive {
    file: Arc<AtomicJsonFile<ArchiveDocument>>,
    max_pages: usize,
    max_results: usize,
}

impl PageArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path.into())),
            max_pages: DEFAULT_MAX_PAGES,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_limits(mut self, max_pages: usize, max_results: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self.max_results = max_results;
        self
    }

    /// Stores `text` for `url`, replacing an earlier capture of the same url.
    ///
    /// Pages without a registrable domain (`about:blank`, files) are skipped.
    pub async fn record_page(&self, url: &str, text: &str, captured_at: i64) -> Result<bool> {
        let Some(domain) = registrable_domain(url) else {
            tracing::debug!("[PageArchive] Skipping {} (no domain)", url);
            return Ok(false);
        };

        let page = ArchivedPage {
            url: url.to_string(),
            domain,
            text: text.to_string(),
            captured_at,
        };
        let max_pages = self.max_pages;
        let file = Arc::clone(&self.file);

        tokio::task::spawn_blocking(move || {
            file.update(ArchiveDocument::default(), |document| {
                document.pages.retain(|existing| existing.url != page.url);
                document.pages.push(page);
                if document.pages.len() > max_pages {
                    document.pages.sort_by_key(|p| std::cmp::Reverse(p.captured_at));
                    document.pages.truncate(max_pages);
                }
            })
        })
        .await
        .map_err(|e| TabSageError::internal(format!("archive task failed: {e}")))??;

        Ok(true)
    }

    /// All archived pages in stored order.
    pub async fn pages(&self) -> Result<Vec<ArchivedPage>> {
        let file = Arc::clone(&self.file);
        let document = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| TabSageError::internal(format!("archive task failed: {e}")))??;
        Ok(document.unwrap_or_default().pages)
    }

    async fn search(&self, domain: Option<&str>, text: &str) -> Result<Vec<Snippet>> {
        let terms = query_terms(text);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let pages = self.pages().await?;
        let mut hits: Vec<Hit> = Vec::new();
        for page in pages.iter().filter(|p| domain.is_none_or(|d| p.domain == d)) {
            for (paragraph_index, paragraph) in split_paragraphs(&page.text).into_iter().enumerate() {
                let score = overlap_score(&terms, &paragraph);
                if score > 0.0 {
                    hits.push(Hit {
                        score,
                        captured_at: page.captured_at,
                        url: page.url.clone(),
                        paragraph_index,
                        text: paragraph,
                    });
                }
            }
        }

        hits.sort_by(Hit::rank);
        hits.truncate(self.max_results);

        tracing::debug!(
            "[PageArchive] query domain={:?} terms={} hits={}",
            domain,
            terms.len(),
            hits.len()
        );

        Ok(hits
            .into_iter()
            .map(|hit| Snippet {
                source: hit.url,
                text: hit.text,
                score: hit.score,
            })
            .collect())
    }
}

struct Hit {
    score: f64,
    captured_at: i64,
    url: String,
    paragraph_index: usize,
    text: String,
}

impl Hit {
    fn rank(a: &Hit, b: &Hit) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.captured_at.cmp(&a.captured_at))
            .then_with(|| a.url.cmp(&b.url))
            .then_with(|| a.paragraph_index.cmp(&b.paragraph_index))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

fn query_terms(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .filter(|term| !STOP_WORDS.contains(&term.as_str()))
        .collect()
}

fn overlap_score(terms: &BTreeSet<String>, paragraph: &str) -> f64 {
    let words: BTreeSet<String> = tokenize(paragraph).collect();
    let matched = terms.iter().filter(|term| words.contains(*term)).count();
    matched as f64 / terms.len() as f64
}

#[async_trait]
impl DomainIndex for PageArchive {
    async fn query(&self, domain: &str, text: &str) -> Result<Vec<Snippet>> {
        self.search(Some(domain), text).await
    }
}

#[async_trait]
impl GlobalIndex for PageArchive {
    async fn query(&self, text: &str) -> Result<Vec<Snippet>> {
        self.search(None, text).await
    }
}
