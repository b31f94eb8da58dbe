//! Scoped query orchestration.
//!
//! Every AI operation runs the same pipeline:
//!
//! 1. validate input (no I/O)
//! 2. resolve the provider (`UnknownProvider` before any I/O)
//! 3. move the tab's state machine out of `Idle` (`Busy` otherwise)
//! 4. resolve grounding context and render the prompt
//! 5. dispatch to the provider
//! 6. commit: verify the tab is still live, apply the result to a copy of
//!    the session, persist the copy, then swap it in
//!
//! The state returns to `Idle` when the in-flight guard drops, whatever
//! the outcome. Nothing is written to the session unless step 6 runs.

use crate::context_resolver::ContextResolver;
use crate::prompts::PromptBuilder;
use crate::session::{SessionStore, TabSession};
use std::sync::Arc;
use tabsage_core::context::{TabRegistry, TabSnapshot};
use tabsage_core::provider::{ProviderClient, SamplingParams};
use tabsage_core::scope::{Scope, ScopeRequest, parse_scope_tag};
use tabsage_core::session::{QueryState, SearchResult, Session, TabId};
use tabsage_core::{Result, TabSageError};
use tabsage_interaction::ProviderRegistry;

/// Quick prompts offered once a page has been summarized.
pub const SUGGESTIONS: [&str; 3] = [
    "Explain the main concepts",
    "Find key takeaways",
    "Summarize in bullet points",
];

/// Turns (query, scope, model) requests into grounded AI calls and keeps
/// each tab's session consistent.
pub struct QueryOrchestrator {
    registry: Arc<ProviderRegistry>,
    resolver: ContextResolver,
    prompts: PromptBuilder,
    tabs: Arc<dyn TabRegistry>,
    store: SessionStore,
}

impl QueryOrchestrator {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        resolver: ContextResolver,
        tabs: Arc<dyn TabRegistry>,
        store: SessionStore,
    ) -> Result<Self> {
        if !registry.contains(store.default_model()) {
            return Err(TabSageError::config(format!(
                "default model '{}' is not a registered provider",
                store.default_model()
            )));
        }

        Ok(Self {
            registry,
            resolver,
            prompts: PromptBuilder::new()?,
            tabs,
            store,
        })
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Copy of the tab's session, creating it on first access.
    pub async fn session(&self, tab_id: TabId) -> Session {
        self.open(tab_id).await.snapshot().await
    }

    pub async fn state(&self, tab_id: TabId) -> QueryState {
        self.open(tab_id).await.state()
    }

    /// Summarizes the tab's visible text with the session's current model.
    ///
    /// Stores the result in `summary`, which also marks the session summarized.
    pub async fn summarize_page(&self, tab_id: TabId) -> Result<String> {
        let tab = self.tab(tab_id).await?;
        let live = self.open(tab_id).await;
        let model_id = live.lock().await.current_model_id.clone();
        let provider = self.registry.resolve(&model_id)?;

        let _flight = live.begin(QueryState::Summarizing)?;
        let page = self.resolver.resolve(Scope::Page, &tab, "").await?;
        if page.is_empty() {
            return Err(TabSageError::validation("page has no visible text to summarize"));
        }
        let prompt = self.prompts.summarize(&page)?;
        let summary = self.dispatch(provider.as_ref(), &prompt, tab_id).await?;

        self.commit(&live, |session| session.summary = Some(summary.clone()))
            .await?;
        Ok(summary)
    }

    /// Answers `question` about the active tab; overwrites `answer`.
    pub async fn ask(&self, question: &str, scope: Scope, model_id: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TabSageError::validation("question must not be empty"));
        }
        let provider = self.registry.resolve(model_id)?;
        let tab = self.active_tab().await?;
        let live = self.open(tab.id).await;

        let _flight = live.begin(QueryState::Asking)?;
        let grounding = self.resolver.resolve(scope, &tab, question).await?;
        let prompt = self.prompts.question(question, &grounding)?;
        let answer = self.dispatch(provider.as_ref(), &prompt, tab.id).await?;

        self.commit(&live, |session| session.answer = Some(answer.clone()))
            .await?;
        Ok(answer)
    }

    /// Searches from the active tab and appends the result to the log.
    ///
    /// A leading `[SCOPE]` tag in `query` overrides `scope`; untagged text
    /// is used unchanged with the caller's scope.
    pub async fn search(&self, query: &str, scope: Scope, model_id: &str) -> Result<SearchResult> {
        let request = ScopeRequest::parse_tagged(query)
            .unwrap_or_else(|_| ScopeRequest::new(scope, query));
        let tab = self.active_tab().await?;
        self.run_search(tab, request, model_id).await
    }

    /// Floating-search entry: untagged text is a page query, sent verbatim.
    pub async fn floating_search(
        &self,
        tab_id: TabId,
        raw_text: &str,
        model_id: &str,
    ) -> Result<SearchResult> {
        let request = parse_scope_tag(raw_text);
        let tab = self.tab(tab_id).await?;
        self.run_search(tab, request, model_id).await
    }

    /// Suggested follow-ups; empty until the page is summarized.
    pub async fn suggestions(&self, tab_id: TabId) -> Vec<&'static str> {
        if self.open(tab_id).await.lock().await.is_summarized() {
            SUGGESTIONS.to_vec()
        } else {
            Vec::new()
        }
    }

    /// Submits suggestion `index` as a page-scoped floating search.
    pub async fn search_suggestion(
        &self,
        tab_id: TabId,
        index: usize,
        model_id: &str,
    ) -> Result<SearchResult> {
        let suggestions = self.suggestions(tab_id).await;
        let suggestion = suggestions.get(index).ok_or_else(|| {
            TabSageError::validation(format!(
                "no suggestion #{index} for tab {tab_id} ({} available)",
                suggestions.len()
            ))
        })?;
        self.floating_search(tab_id, &Scope::Page.tagged(suggestion), model_id)
            .await
    }

    /// Explains a text selection without page context; appends to the log.
    pub async fn explain_selection(
        &self,
        tab_id: TabId,
        selection: &str,
        model_id: &str,
    ) -> Result<SearchResult> {
        if selection.trim().is_empty() {
            return Err(TabSageError::validation("selection must not be empty"));
        }
        let provider = self.registry.resolve(model_id)?;
        let live = self.open(tab_id).await;

        let _flight = live.begin(QueryState::Searching)?;
        let prompt = self.prompts.explain(selection)?;
        let content = self.dispatch(provider.as_ref(), &prompt, tab_id).await?;

        self.append_result(&live, content).await
    }

    pub async fn set_dark_mode(&self, tab_id: TabId, enabled: bool) -> Result<()> {
        let live = self.open(tab_id).await;
        self.commit(&live, |session| session.dark_mode = enabled).await?;
        Ok(())
    }

    /// Switches the tab's model; unknown ids leave the session unchanged.
    pub async fn select_model(&self, tab_id: TabId, model_id: &str) -> Result<()> {
        self.registry.resolve(model_id)?;
        let live = self.open(tab_id).await;
        self.commit(&live, |session| session.current_model_id = model_id.to_string())
            .await?;
        tracing::info!("[QueryOrchestrator] tab {} now uses '{}'", tab_id, model_id);
        Ok(())
    }

    /// Drops the tab's session; an in-flight response for it is discarded.
    pub async fn close_tab(&self, tab_id: TabId) -> Result<()> {
        self.store.close(tab_id).await
    }

    /// Drops sessions of every tab not in `open_tabs`.
    pub async fn prune(&self, open_tabs: &[TabId]) -> Result<Vec<TabId>> {
        self.store.prune(open_tabs).await
    }

    async fn run_search(
        &self,
        tab: TabSnapshot,
        request: ScopeRequest,
        model_id: &str,
    ) -> Result<SearchResult> {
        if request.is_blank() {
            return Err(TabSageError::validation("search query must not be empty"));
        }
        let provider = self.registry.resolve(model_id)?;
        let live = self.open(tab.id).await;

        let _flight = live.begin(QueryState::Searching)?;
        let query = request.raw_query.as_str();
        let grounding = self.resolver.resolve(request.scope, &tab, query).await?;
        let prompt = self.prompts.question(query, &grounding)?;
        let content = self.dispatch(provider.as_ref(), &prompt, tab.id).await?;

        self.append_result(&live, content).await
    }

    async fn append_result(&self, live: &Arc<TabSession>, content: String) -> Result<SearchResult> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let session = self
            .commit(live, |session| {
                session.search_results = session.search_results.append(content, timestamp);
            })
            .await?;

        session
            .search_results
            .last()
            .cloned()
            .ok_or_else(|| TabSageError::internal("search log empty after append"))
    }

    async fn dispatch(
        &self,
        provider: &dyn ProviderClient,
        prompt: &str,
        tab_id: TabId,
    ) -> Result<String> {
        tracing::info!(
            "[QueryOrchestrator] tab {} -> provider '{}' ({} prompt chars)",
            tab_id,
            provider.provider_id(),
            prompt.chars().count()
        );

        match provider.send(prompt, &SamplingParams::default()).await {
            Ok(text) if text.trim().is_empty() => Err(TabSageError::provider(
                provider.provider_id(),
                "empty response",
            )),
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!("[QueryOrchestrator] tab {} request failed: {}", tab_id, e);
                Err(e)
            }
        }
    }

    /// Applies `mutate` to a copy of the live session, persists the copy and
    /// swaps it in. Returns the committed session.
    async fn commit<F>(&self, live: &Arc<TabSession>, mutate: F) -> Result<Session>
    where
        F: FnOnce(&mut Session),
    {
        let mut current = live.lock().await;
        if !self.store.is_live(live).await {
            tracing::warn!(
                "[QueryOrchestrator] tab {} closed mid-flight, discarding result",
                live.tab_id()
            );
            return Err(TabSageError::SessionClosed {
                tab_id: live.tab_id(),
            });
        }

        let mut next = current.clone();
        mutate(&mut next);
        self.store.save(&next).await;
        *current = next.clone();
        Ok(next)
    }

    async fn open(&self, tab_id: TabId) -> Arc<TabSession> {
        self.store
            .open(tab_id, |model_id| self.registry.contains(model_id))
            .await
    }

    async fn tab(&self, tab_id: TabId) -> Result<TabSnapshot> {
        self.tabs
            .get_tab(tab_id)
            .await?
            .ok_or_else(|| TabSageError::not_found("tab", tab_id.to_string()))
    }

    async fn active_tab(&self) -> Result<TabSnapshot> {
        self.tabs
            .get_active_tab()
            .await?
            .ok_or_else(|| TabSageError::not_found("tab", "active"))
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
