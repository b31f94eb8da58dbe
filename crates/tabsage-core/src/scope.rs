//! Query scope and the `[SCOPE] text` tag micro-syntax.

use crate::error::{Result, TabSageError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static SCOPE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\[(ALL|DOMAIN|PAGE)\]\s*(.+)$").expect("scope tag pattern is valid")
});

/// Controls how much content grounds a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Visible text of the active tab.
    #[default]
    Page,
    /// Pages sharing the tab's registrable domain.
    Domain,
    /// The global content index.
    All,
}

impl Scope {
    pub const ALL_SCOPES: [Scope; 3] = [Scope::Page, Scope::Domain, Scope::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Page => "page",
            Scope::Domain => "domain",
            Scope::All => "all",
        }
    }

    /// Upper-case keyword used inside a scope tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Scope::Page => "PAGE",
            Scope::Domain => "DOMAIN",
            Scope::All => "ALL",
        }
    }

    /// Prefixes `query` with this scope's tag, e.g. `[DOMAIN] pricing`.
    pub fn tagged(&self, query: &str) -> String {
        format!("[{}] {}", self.tag(), query)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = TabSageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" => Ok(Scope::Page),
            "domain" => Ok(Scope::Domain),
            "all" => Ok(Scope::All),
            other => Err(TabSageError::ScopeParse(format!(
                "unknown scope '{other}' (expected page, domain or all)"
            ))),
        }
    }
}

/// A query paired with the scope it should be grounded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRequest {
    pub scope: Scope,
    pub raw_query: String,
}

impl ScopeRequest {
    pub fn new(scope: Scope, raw_query: impl Into<String>) -> Self {
        Self {
            scope,
            raw_query: raw_query.into(),
        }
    }

    /// Decodes a `[SCOPE] text` tag, failing when `input` does not carry one.
    ///
    /// The keyword is case-insensitive and the remaining text is trimmed.
    /// The tag and its text must sit on a single line.
    pub fn parse_tagged(input: &str) -> Result<Self> {
        let captures = SCOPE_TAG.captures(input).ok_or_else(|| {
            TabSageError::ScopeParse(format!("no scope tag in '{}'", preview(input)))
        })?;

        let scope = captures[1].parse::<Scope>()?;
        let text = captures[2].trim();
        if text.is_empty() {
            return Err(TabSageError::ScopeParse(format!(
                "scope tag [{}] carries no query text",
                scope.tag()
            )));
        }

        Ok(Self::new(scope, text))
    }

    /// True when the query is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.raw_query.trim().is_empty()
    }
}

/// Parses a floating-search query.
///
/// A well-formed tag overrides any caller-supplied scope. Anything else is
/// treated as an untagged page query and returned unchanged.
pub fn parse_scope_tag(input: &str) -> ScopeRequest {
    match ScopeRequest::parse_tagged(input) {
        Ok(request) => request,
        Err(err) => {
            tracing::trace!("[ScopeTag] falling back to page scope: {}", err);
            ScopeRequest::new(Scope::Page, input)
        }
    }
}

fn preview(input: &str) -> String {
    const MAX: usize = 40;
    match input.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &input[..idx]),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_scope_keyword() {
        for scope in Scope::ALL_SCOPES {
            let parsed = parse_scope_tag(&scope.tagged("compare pricing tiers"));
            assert_eq!(parsed.scope, scope);
            assert_eq!(parsed.raw_query, "compare pricing tiers");
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        let parsed = parse_scope_tag("[Domain]   compare pricing tiers  ");
        assert_eq!(parsed.scope, Scope::Domain);
        assert_eq!(parsed.raw_query, "compare pricing tiers");
    }

    #[test]
    fn test_untagged_query_defaults_to_page_unchanged() {
        let input = "  what is this page about?";
        let parsed = parse_scope_tag(input);
        assert_eq!(parsed.scope, Scope::Page);
        assert_eq!(parsed.raw_query, input);
    }

    #[test]
    fn test_unknown_keyword_is_not_a_tag() {
        let input = "[SITE] pricing";
        let parsed = parse_scope_tag(input);
        assert_eq!(parsed.scope, Scope::Page);
        assert_eq!(parsed.raw_query, input);
    }

    #[test]
    fn test_tag_not_at_start_is_not_a_tag() {
        let input = "see [ALL] pricing";
        assert_eq!(parse_scope_tag(input).raw_query, input);
    }

    #[test]
    fn test_tag_without_text_is_rejected_strictly() {
        let err = ScopeRequest::parse_tagged("[ALL]    ").unwrap_err();
        assert!(matches!(err, TabSageError::ScopeParse(_)));
        assert_eq!(parse_scope_tag("[ALL]    ").raw_query, "[ALL]    ");
    }

    #[test]
    fn test_multiline_query_is_not_a_tag() {
        let input = "[ALL] first line\nsecond line";
        let parsed = parse_scope_tag(input);
        assert_eq!(parsed.scope, Scope::Page);
        assert_eq!(parsed.raw_query, input);
        assert!(ScopeRequest::parse_tagged(input).is_err());
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("ALL".parse::<Scope>().unwrap(), Scope::All);
        assert_eq!(" page ".parse::<Scope>().unwrap(), Scope::Page);
        assert!("everywhere".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Domain).unwrap(), "\"domain\"");
    }
}
