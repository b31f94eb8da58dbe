//! Configuration model.
//!
//! `config.toml` carries non-secret settings, `secret.json` carries API keys.
//! Loading lives in `tabsage-infrastructure`; this module only defines shapes
//! and defaults.

use crate::provider::{ProviderKind, SamplingParams};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL_ID: &str = "gemini";
pub const DEFAULT_CONTEXT_MAX_CHARS: usize = 12_000;
pub const DEFAULT_CONTEXT_MAX_SEGMENTS: usize = 16;
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub context: ContextBudget,
    #[serde(default)]
    pub retention: RetentionPolicy,
    /// Extra providers, or overrides of the built-in ones by id.
    #[serde(default, rename = "providers")]
    pub providers: Vec<ProviderEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            context: ContextBudget::default(),
            retention: RetentionPolicy::default(),
            providers: Vec::new(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL_ID.to_string()
}

/// Upper bound on assembled grounding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_max_segments")]
    pub max_segments: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CONTEXT_MAX_CHARS,
            max_segments: DEFAULT_CONTEXT_MAX_SEGMENTS,
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_CONTEXT_MAX_CHARS
}

fn default_max_segments() -> usize {
    DEFAULT_CONTEXT_MAX_SEGMENTS
}

/// How many tab records survive in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Least recently saved records beyond this count are evicted on save.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

/// A `[[providers]]` entry in `config.toml`.
///
/// Unset fields inherit from the built-in provider with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub id: String,
    #[serde(default)]
    pub kind: Option<ProviderKind>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(flatten)]
    pub sampling: SamplingParams,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<ApiKeyConfig>,
    #[serde(default)]
    pub perplexity: Option<ApiKeyConfig>,
    #[serde(default)]
    pub xai: Option<ApiKeyConfig>,
}

impl SecretConfig {
    /// API key configured for `provider_id`, if any.
    pub fn api_key(&self, provider_id: &str) -> Option<&str> {
        let entry = match provider_id {
            "gemini" => self.gemini.as_ref(),
            "perplexity" => self.perplexity.as_ref(),
            "xai" => self.xai.as_ref(),
            _ => None,
        };
        entry
            .map(|config| config.api_key.as_str())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_model, "gemini");
        assert_eq!(config.context.max_chars, DEFAULT_CONTEXT_MAX_CHARS);
    }

    #[test]
    fn test_provider_entries_parse() {
        let config: AppConfig = toml::from_str(
            r#"
default_model = "perplexity"

[context]
max_chars = 2000

[[providers]]
id = "perplexity"
temperature = 0.2

[[providers]]
id = "local"
kind = "chat"
endpoint = "http://localhost:8080/v1/chat/completions"
model_name = "llama"
"#,
        )
        .unwrap();

        assert_eq!(config.default_model, "perplexity");
        assert_eq!(config.context.max_chars, 2000);
        assert_eq!(config.context.max_segments, DEFAULT_CONTEXT_MAX_SEGMENTS);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].sampling.temperature, Some(0.2));
        assert_eq!(config.providers[1].kind, Some(ProviderKind::Chat));
    }

    #[test]
    fn test_secret_api_key_lookup_skips_empty() {
        let secrets: SecretConfig = serde_json::from_str(
            r#"{"gemini": {"api_key": "g-key"}, "perplexity": {"api_key": ""}}"#,
        )
        .unwrap();

        assert_eq!(secrets.api_key("gemini"), Some("g-key"));
        assert_eq!(secrets.api_key("perplexity"), None);
        assert_eq!(secrets.api_key("xai"), None);
    }
}
