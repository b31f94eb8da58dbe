//! ChatApiClient - REST client for chat-completions style endpoints.
//!
//! Used for Perplexity and any OpenAI-compatible provider (xAI, local
//! servers). Sends a fixed system preamble plus the prompt as the user turn.

use crate::http_error::{map_http_error, map_transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tabsage_core::provider::{ProviderClient, ProviderConfig, SamplingParams};
use tabsage_core::{Result, TabSageError};

/// Provider client for chat-completions endpoints.
#[derive(Clone)]
pub struct ChatApiClient {
    client: Client,
    config: ProviderConfig,
}

impl ChatApiClient {
    /// Creates a client sharing `client`'s connection pool.
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, prompt: &str, params: &SamplingParams) -> ChatCompletionRequest {
        let sampling = params.or(self.config.sampling);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.config.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            stream: false,
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let provider = self.config.id.as_str();
        if self.config.api_key.is_empty() {
            return Err(TabSageError::provider(provider, "no API key configured"));
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error(provider, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(provider, status, &body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            TabSageError::provider(provider, format!("malformed response body: {err}"))
        })?;

        extract_text_response(provider, parsed)
    }
}

#[async_trait]
impl ProviderClient for ChatApiClient {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    async fn send(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        tracing::debug!(
            "[ChatApiClient] POST provider={} model={} prompt_chars={}",
            self.config.id,
            self.config.model_name,
            prompt.chars().count()
        );
        let request = self.build_request(prompt, params);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn extract_text_response(provider: &str, response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| TabSageError::provider(provider, "response carried no message content"))
}
