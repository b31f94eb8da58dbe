//! AI provider abstraction.
//!
//! A provider turns a prompt into answer text. Concrete HTTP clients live in
//! `tabsage-interaction`; this module only holds the contract and the static
//! configuration every client is built from.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request shape a provider expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// A single free-text prompt (Gemini `generateContent`).
    Prompt,
    /// A chat message list with a system preamble (chat completions).
    Chat,
}

/// Sampling parameters; `None` fields fall back to the provider's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl SamplingParams {
    /// Fills unset fields from `defaults`.
    pub fn or(self, defaults: SamplingParams) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
        }
    }
}

/// Static, process-wide provider configuration.
///
/// Read-only once the registry has been built.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    pub endpoint: String,
    pub model_name: String,
    #[serde(default)]
    pub sampling: SamplingParams,
    /// System preamble for chat-style providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

// Keeps API keys out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("endpoint", &self.endpoint)
            .field("model_name", &self.model_name)
            .field("sampling", &self.sampling)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

/// A backend capable of answering a prompt.
///
/// Implementations fail with `TabSageError::Provider` tagged with their id on
/// network, auth or quota failures and on responses missing the text field.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Registry id this client answers to (e.g. `"gemini"`).
    fn provider_id(&self) -> &str;

    /// Sends `prompt` and returns the first completion's text.
    async fn send(&self, prompt: &str, params: &SamplingParams) -> Result<String>;
}
