//! Scope-aware context assembly.

use std::sync::Arc;
use tabsage_core::Result;
use tabsage_core::config::ContextBudget;
use tabsage_core::context::{
    ContextBlock, ContextSegment, DomainIndex, GlobalIndex, PageContentExtractor, Snippet,
    TabSnapshot, split_paragraphs,
};
use tabsage_core::scope::Scope;

/// Builds bounded grounding text for a query.
///
/// `page` reads the tab's visible text, `domain` asks the domain index for
/// pages sharing the tab's registrable domain, `all` asks the global index.
/// The result never exceeds the configured budget, and identical inputs
/// always produce identical blocks.
pub struct ContextResolver {
    extractor: Arc<dyn PageContentExtractor>,
    domain_index: Arc<dyn DomainIndex>,
    global_index: Arc<dyn GlobalIndex>,
    budget: ContextBudget,
}

impl ContextResolver {
    pub fn new(
        extractor: Arc<dyn PageContentExtractor>,
        domain_index: Arc<dyn DomainIndex>,
        global_index: Arc<dyn GlobalIndex>,
        budget: ContextBudget,
    ) -> Self {
        Self {
            extractor,
            domain_index,
            global_index,
            budget,
        }
    }

    pub fn budget(&self) -> ContextBudget {
        self.budget
    }

    /// Assembles context for `scope` around `tab`; `query` feeds the indexes.
    pub async fn resolve(&self, scope: Scope, tab: &TabSnapshot, query: &str) -> Result<ContextBlock> {
        let segments = match scope {
            Scope::Page => {
                let text = self.extractor.get_visible_text(tab.id).await?;
                page_segments(&tab.url, &text)
            }
            Scope::Domain => match tab.domain() {
                Some(domain) => snippet_segments(self.domain_index.query(&domain, query).await?),
                None => {
                    tracing::warn!(
                        "[ContextResolver] Tab {} has no registrable domain ({}), domain context is empty",
                        tab.id,
                        tab.url
                    );
                    Vec::new()
                }
            },
            Scope::All => snippet_segments(self.global_index.query(query).await?),
        };

        let available = segments.len();
        let (segments, truncated) = fit_to_budget(segments, self.budget);
        tracing::debug!(
            "[ContextResolver] scope={} tab={} segments={}/{} truncated={}",
            scope,
            tab.id,
            segments.len(),
            available,
            truncated
        );

        Ok(ContextBlock {
            scope,
            segments,
            truncated,
        })
    }
}

/// Paragraphs in document order; earlier paragraphs rank higher.
fn page_segments(url: &str, text: &str) -> Vec<ContextSegment> {
    split_paragraphs(text)
        .into_iter()
        .enumerate()
        .map(|(position, text)| ContextSegment {
            source: url.to_string(),
            text,
            relevance: 1.0 / (position as f64 + 1.0),
            position,
        })
        .collect()
}

fn snippet_segments(snippets: Vec<Snippet>) -> Vec<ContextSegment> {
    snippets
        .into_iter()
        .filter(|snippet| !snippet.text.trim().is_empty())
        .enumerate()
        .map(|(position, snippet)| ContextSegment {
            source: snippet.source,
            text: snippet.text,
            relevance: snippet.score,
            position,
        })
        .collect()
}

/// Keeps the most relevant segments that fit `budget`.
///
/// Candidates are visited by relevance (ties: earlier first). A segment is
/// kept when the joined text stays within `max_chars`; when the very first
/// candidate is too long on its own it is cut at a char boundary. Kept
/// segments are returned in their original order.
pub(crate) fn fit_to_budget(
    segments: Vec<ContextSegment>,
    budget: ContextBudget,
) -> (Vec<ContextSegment>, bool) {
    let separator = ContextBlock::SEPARATOR.chars().count();
    let total = segments.len();

    let mut ordered = segments;
    ordered.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then_with(|| a.position.cmp(&b.position))
    });

    let mut kept: Vec<ContextSegment> = Vec::new();
    let mut used = 0usize;
    let mut cut = false;

    for mut segment in ordered {
        if kept.len() >= budget.max_segments {
            break;
        }
        let joiner = if kept.is_empty() { 0 } else { separator };
        let len = segment.text.chars().count();

        if used + joiner + len <= budget.max_chars {
            used += joiner + len;
            kept.push(segment);
        } else if kept.is_empty() && budget.max_chars > 0 {
            segment.text = segment.text.chars().take(budget.max_chars).collect();
            used = budget.max_chars;
            cut = true;
            kept.push(segment);
        }
    }

    let truncated = cut || kept.len() < total;
    kept.sort_by_key(|segment| segment.position);
    (kept, truncated)
}
