//! Model id → provider client lookup.

use crate::chat_api_client::ChatApiClient;
use crate::defaults::provider_configs;
use crate::gemini_api_client::GeminiApiClient;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tabsage_core::config::{AppConfig, SecretConfig};
use tabsage_core::provider::{ProviderClient, ProviderConfig, ProviderKind};
use tabsage_core::{Result, TabSageError};

/// Transport timeout for provider calls; the orchestrator enforces none.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Maps model ids to provider clients.
///
/// Built once at startup and then shared read-only behind an `Arc`.
/// `resolve` never substitutes a default for an unknown id.
pub struct ProviderRegistry {
    http: Client,
    clients: BTreeMap<String, Arc<dyn ProviderClient>>,
    configs: BTreeMap<String, Arc<ProviderConfig>>,
}

impl ProviderRegistry {
    /// Creates an empty registry with its own HTTP connection pool.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TabSageError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(http))
    }

    /// Creates an empty registry around an existing HTTP client.
    pub fn with_http_client(http: Client) -> Self {
        Self {
            http,
            clients: BTreeMap::new(),
            configs: BTreeMap::new(),
        }
    }

    /// Builds the registry from configuration and secrets.
    pub fn from_config(app: &AppConfig, secrets: &SecretConfig) -> Result<Self> {
        let mut registry = Self::new()?;
        for config in provider_configs(app, secrets)? {
            let id = config.id.clone();
            registry.register(id, config);
        }
        Ok(registry)
    }

    /// Registers (or replaces) the provider `id`, choosing the client by `config.kind`.
    pub fn register(&mut self, id: impl Into<String>, mut config: ProviderConfig) {
        let id = id.into();
        config.id = id.clone();

        let client: Arc<dyn ProviderClient> = match config.kind {
            ProviderKind::Prompt => Arc::new(GeminiApiClient::new(self.http.clone(), config.clone())),
            ProviderKind::Chat => Arc::new(ChatApiClient::new(self.http.clone(), config.clone())),
        };

        tracing::debug!(
            "[ProviderRegistry] registered '{}' ({:?}, model={})",
            id,
            config.kind,
            config.model_name
        );
        self.configs.insert(id.clone(), Arc::new(config));
        self.clients.insert(id, client);
    }

    /// Registers a ready-made client under its own provider id.
    pub fn register_client(&mut self, client: Arc<dyn ProviderClient>) {
        let id = client.provider_id().to_string();
        self.configs.remove(&id);
        self.clients.insert(id, client);
    }

    /// Looks up the client for `id`.
    ///
    /// # Errors
    ///
    /// `TabSageError::UnknownProvider` when nothing is registered under `id`.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn ProviderClient>> {
        self.clients
            .get(id)
            .cloned()
            .ok_or_else(|| TabSageError::unknown_provider(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.clients.keys().cloned().collect()
    }

    /// Configuration behind `id`, when it was registered from a config.
    pub fn config(&self, id: &str) -> Option<Arc<ProviderConfig>> {
        self.configs.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{gemini_config, perplexity_config};
    use async_trait::async_trait;
    use tabsage_core::provider::SamplingParams;

    struct EchoClient;

    #[async_trait]
    impl ProviderClient for EchoClient {
        fn provider_id(&self) -> &str {
            "echo"
        }

        async fn send(&self, prompt: &str, _params: &SamplingParams) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::with_http_client(Client::new());
        registry.register("gemini", gemini_config("g"));
        registry.register("perplexity", perplexity_config("p"));
        registry
    }

    #[test]
    fn test_resolve_known_ids() {
        let registry = registry();
        assert_eq!(registry.resolve("gemini").unwrap().provider_id(), "gemini");
        assert_eq!(registry.resolve("perplexity").unwrap().provider_id(), "perplexity");
        assert_eq!(registry.ids(), vec!["gemini", "perplexity"]);
    }

    #[test]
    fn test_resolve_unknown_id_fails() {
        let registry = registry();
        let err = registry.resolve("claude").err().unwrap();
        assert_eq!(err, TabSageError::unknown_provider("claude"));
    }

    #[test]
    fn test_register_renames_config_to_id() {
        let mut registry = ProviderRegistry::with_http_client(Client::new());
        registry.register("pplx-fast", perplexity_config("p"));

        assert!(registry.contains("pplx-fast"));
        assert_eq!(registry.config("pplx-fast").unwrap().id, "pplx-fast");
        assert_eq!(registry.resolve("pplx-fast").unwrap().provider_id(), "pplx-fast");
    }

    #[tokio::test]
    async fn test_register_client_overrides() {
        let mut registry = registry();
        registry.register_client(Arc::new(EchoClient));

        let client = registry.resolve("echo").unwrap();
        let answer = client.send("ping", &SamplingParams::default()).await.unwrap();
        assert_eq!(answer, "ping");
        assert!(registry.config("echo").is_none());
    }

    #[test]
    fn test_from_config_registers_builtins() {
        let registry =
            ProviderRegistry::from_config(&AppConfig::default(), &SecretConfig::default()).unwrap();
        assert!(registry.contains("gemini"));
        assert!(registry.contains("perplexity"));
        assert!(!registry.contains("xai"));
    }
}
