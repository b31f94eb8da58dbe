//! Built-in provider definitions.
//!
//! | Id | Shape | Default model |
//! |----|-------|---------------|
//! | `gemini` | single prompt | `gemini-pro` |
//! | `perplexity` | chat messages | `llama-3.1-sonar-small-128k-online` |
//! | `xai` | chat messages | `grok-beta` (registered only when a key is set) |
//!
//! Entries in `config.toml` override these by id; unknown ids become new
//! providers and must name their `kind`, `endpoint` and `model_name`.

use tabsage_core::config::{AppConfig, ProviderEntry, SecretConfig};
use tabsage_core::provider::{ProviderConfig, ProviderKind, SamplingParams};
use tabsage_core::{Result, TabSageError};

pub const GEMINI_ID: &str = "gemini";
pub const PERPLEXITY_ID: &str = "perplexity";
pub const XAI_ID: &str = "xai";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

const PERPLEXITY_ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";
const DEFAULT_PERPLEXITY_MODEL: &str = "llama-3.1-sonar-small-128k-online";

const XAI_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
const DEFAULT_XAI_MODEL: &str = "grok-beta";

pub const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant that provides accurate and detailed information.";

/// Fixed sampling for chat-style providers.
pub const CHAT_SAMPLING: SamplingParams = SamplingParams {
    temperature: Some(0.7),
    top_p: Some(0.9),
    max_tokens: Some(4096),
};

pub fn gemini_config(api_key: impl Into<String>) -> ProviderConfig {
    ProviderConfig {
        id: GEMINI_ID.to_string(),
        kind: ProviderKind::Prompt,
        api_key: api_key.into(),
        endpoint: GEMINI_ENDPOINT.to_string(),
        model_name: DEFAULT_GEMINI_MODEL.to_string(),
        sampling: SamplingParams::default(),
        system_prompt: None,
    }
}

pub fn perplexity_config(api_key: impl Into<String>) -> ProviderConfig {
    ProviderConfig {
        id: PERPLEXITY_ID.to_string(),
        kind: ProviderKind::Chat,
        api_key: api_key.into(),
        endpoint: PERPLEXITY_ENDPOINT.to_string(),
        model_name: DEFAULT_PERPLEXITY_MODEL.to_string(),
        sampling: CHAT_SAMPLING,
        system_prompt: Some(CHAT_SYSTEM_PROMPT.to_string()),
    }
}

pub fn xai_config(api_key: impl Into<String>) -> ProviderConfig {
    ProviderConfig {
        id: XAI_ID.to_string(),
        kind: ProviderKind::Chat,
        api_key: api_key.into(),
        endpoint: XAI_ENDPOINT.to_string(),
        model_name: DEFAULT_XAI_MODEL.to_string(),
        sampling: CHAT_SAMPLING,
        system_prompt: Some(CHAT_SYSTEM_PROMPT.to_string()),
    }
}

/// Produces the full provider table from configuration and secrets.
///
/// Gemini and Perplexity are always present (a missing key surfaces as a
/// provider error at send time); xAI only when a key is configured.
pub fn provider_configs(app: &AppConfig, secrets: &SecretConfig) -> Result<Vec<ProviderConfig>> {
    let key = |id: &str| secrets.api_key(id).unwrap_or_default().to_string();

    let mut configs = vec![gemini_config(key(GEMINI_ID)), perplexity_config(key(PERPLEXITY_ID))];
    if secrets.api_key(XAI_ID).is_some() {
        configs.push(xai_config(key(XAI_ID)));
    }

    for entry in &app.providers {
        match configs.iter_mut().find(|c| c.id == entry.id) {
            Some(existing) => apply_entry(existing, entry),
            None => configs.push(new_from_entry(entry, key(&entry.id))?),
        }
    }

    Ok(configs)
}

fn apply_entry(config: &mut ProviderConfig, entry: &ProviderEntry) {
    if let Some(kind) = entry.kind {
        config.kind = kind;
    }
    if let Some(endpoint) = &entry.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(model_name) = &entry.model_name {
        config.model_name = model_name.clone();
    }
    if entry.system_prompt.is_some() {
        config.system_prompt = entry.system_prompt.clone();
    }
    config.sampling = entry.sampling.or(config.sampling);
}

fn new_from_entry(entry: &ProviderEntry, api_key: String) -> Result<ProviderConfig> {
    let missing = |field: &str| {
        TabSageError::config(format!(
            "provider '{}' is not built in and needs '{}'",
            entry.id, field
        ))
    };

    let kind = entry.kind.ok_or_else(|| missing("kind"))?;
    let endpoint = entry.endpoint.clone().ok_or_else(|| missing("endpoint"))?;
    let model_name = entry.model_name.clone().ok_or_else(|| missing("model_name"))?;

    let system_prompt = match kind {
        ProviderKind::Chat => entry
            .system_prompt
            .clone()
            .or_else(|| Some(CHAT_SYSTEM_PROMPT.to_string())),
        ProviderKind::Prompt => entry.system_prompt.clone(),
    };

    Ok(ProviderConfig {
        id: entry.id.clone(),
        kind,
        api_key,
        endpoint,
        model_name,
        sampling: entry.sampling,
        system_prompt,
    })
}
