//! Command-line stand-in for the browser host.
//!
//! A single tab described by `--tab`/`--url`, whose visible text comes from
//! `--page` (a file, or stdin for `-`). That tab is also the active one.

use crate::TabArgs;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Read;
use std::path::Path;
use tabsage_core::context::{PageContentExtractor, TabRegistry, TabSnapshot};
use tabsage_core::session::TabId;

#[derive(Debug, Default)]
pub struct CliBrowser {
    tab: Option<TabSnapshot>,
    page_text: String,
}

impl CliBrowser {
    /// No tab is open; for commands that only touch stored sessions.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn from_args(args: &TabArgs) -> Result<Self> {
        let page_text = match &args.page {
            Some(path) => read_page(path)?,
            None => String::new(),
        };
        Ok(Self::new(
            TabSnapshot::new(args.tab, args.url.clone().unwrap_or_default()),
            page_text,
        ))
    }

    pub fn new(tab: TabSnapshot, page_text: impl Into<String>) -> Self {
        Self {
            tab: Some(tab),
            page_text: page_text.into(),
        }
    }

    pub fn tab(&self) -> Option<&TabSnapshot> {
        self.tab.as_ref()
    }

    pub fn page_text(&self) -> &str {
        &self.page_text
    }
}

fn read_page(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read page text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[async_trait]
impl TabRegistry for CliBrowser {
    async fn get_active_tab(&self) -> tabsage_core::Result<Option<TabSnapshot>> {
        Ok(self.tab.clone())
    }

    async fn get_tab(&self, tab_id: TabId) -> tabsage_core::Result<Option<TabSnapshot>> {
        Ok(self.tab.clone().filter(|tab| tab.id == tab_id))
    }
}

#[async_trait]
impl PageContentExtractor for CliBrowser {
    async fn get_visible_text(&self, tab_id: TabId) -> tabsage_core::Result<String> {
        match &self.tab {
            Some(tab) if tab.id == tab_id => Ok(self.page_text.clone()),
            _ => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(tab: TabId, url: Option<&str>, page: Option<PathBuf>) -> TabArgs {
        TabArgs {
            tab,
            url: url.map(str::to_string),
            page,
        }
    }

    #[tokio::test]
    async fn test_from_args_reads_page_file() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.txt");
        std::fs::write(&page, "Coral reefs are bleaching.").unwrap();

        let browser =
            CliBrowser::from_args(&args(7, Some("https://example.com/reefs"), Some(page)))
                .unwrap();

        let active = browser.get_active_tab().await.unwrap().unwrap();
        assert_eq!(active.id, 7);
        assert_eq!(active.domain().as_deref(), Some("example.com"));
        assert_eq!(
            browser.get_visible_text(7).await.unwrap(),
            "Coral reefs are bleaching."
        );
    }

    #[tokio::test]
    async fn test_other_tabs_are_unknown() {
        let browser = CliBrowser::new(TabSnapshot::new(1, "https://example.com"), "text");

        assert!(browser.get_tab(2).await.unwrap().is_none());
        assert_eq!(browser.get_visible_text(2).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_detached_has_no_tabs() {
        let browser = CliBrowser::detached();

        assert!(browser.get_active_tab().await.unwrap().is_none());
        assert!(browser.tab().is_none());
    }

    #[test]
    fn test_missing_page_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.txt");

        assert!(CliBrowser::from_args(&args(1, None, Some(missing))).is_err());
    }
}
