use crate::browser::CliBrowser;
use anyhow::{Context, Result};
use std::sync::Arc;
use tabsage_application::{ContextResolver, QueryOrchestrator, SessionStore};
use tabsage_core::config::AppConfig;
use tabsage_core::session::TabId;
use tabsage_infrastructure::{
    ConfigService, JsonFileKeyValueStore, KeyValueSessionRepository, PageArchive, TabSagePaths,
};
use tabsage_interaction::ProviderRegistry;

/// Everything a command needs, wired from the config directory.
pub struct App {
    pub orchestrator: QueryOrchestrator,
    pub config: AppConfig,
    browser: Arc<CliBrowser>,
    archive: Arc<PageArchive>,
}

impl App {
    pub fn build(paths: &TabSagePaths, browser: CliBrowser) -> Result<Self> {
        let config_service = ConfigService::new(paths.clone());
        let config = config_service
            .app_config()
            .context("failed to load config.toml")?;
        let secrets = config_service
            .secrets()
            .context("failed to load secret.json")?;

        let registry = Arc::new(ProviderRegistry::from_config(&config, &secrets)?);
        let browser = Arc::new(browser);
        let archive = Arc::new(PageArchive::new(paths.archive_file()));
        let resolver = ContextResolver::new(
            browser.clone(),
            archive.clone(),
            archive.clone(),
            config.context,
        );
        let repository = Arc::new(KeyValueSessionRepository::new(
            Arc::new(JsonFileKeyValueStore::new(paths.storage_file())),
            config.default_model.clone(),
            config.retention,
        ));
        let store = SessionStore::new(repository, config.default_model.clone());
        let orchestrator = QueryOrchestrator::new(registry, resolver, browser.clone(), store)?;

        tracing::debug!(
            "[App] config dir {}, {} providers",
            paths.config_dir().display(),
            orchestrator.registry().ids().len()
        );
        Ok(Self {
            orchestrator,
            config,
            browser,
            archive,
        })
    }

    /// `explicit`, or the model the tab's session currently uses.
    pub async fn model_for(&self, tab_id: TabId, explicit: Option<&str>) -> String {
        match explicit {
            Some(model) => model.to_string(),
            None => self.orchestrator.session(tab_id).await.current_model_id,
        }
    }

    /// Adds the current page to the archive behind domain/all context.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn archive_page(&self) {
        let Some(tab) = self.browser.tab() else {
            return;
        };
        if self.browser.page_text().trim().is_empty() {
            return;
        }

        let now = chrono::Utc::now().timestamp_millis();
        match self
            .archive
            .record_page(&tab.url, self.browser.page_text(), now)
            .await
        {
            Ok(true) => tracing::debug!("[App] archived {}", tab.url),
            Ok(false) => tracing::debug!("[App] {} has no domain, not archived", tab.url),
            Err(e) => tracing::warn!("[App] failed to archive {}: {}", tab.url, e),
        }
    }
}
