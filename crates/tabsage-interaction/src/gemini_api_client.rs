//! GeminiApiClient - Direct REST client for the Gemini `generateContent` API.
//!
//! Sends the prompt as a single user turn and reads the first candidate's text.

use crate::http_error::{map_http_error, map_transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tabsage_core::provider::{ProviderClient, ProviderConfig, SamplingParams};
use tabsage_core::{Result, TabSageError};

/// Provider client for prompt-style Gemini endpoints.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    config: ProviderConfig,
}

impl GeminiApiClient {
    /// Creates a client sharing `client`'s connection pool.
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/{model}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            model = self.config.model_name
        )
    }

    fn build_request(&self, prompt: &str, params: &SamplingParams) -> GenerateContentRequest {
        let sampling = params.or(self.config.sampling);
        let generation_config = GenerationConfig {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_output_tokens: sampling.max_tokens,
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let provider = self.config.id.as_str();
        if self.config.api_key.is_empty() {
            return Err(TabSageError::provider(provider, "no API key configured"));
        }

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error(provider, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(provider, status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            TabSageError::provider(provider, format!("malformed response body: {err}"))
        })?;

        extract_text_response(provider, parsed)
    }
}

#[async_trait]
impl ProviderClient for GeminiApiClient {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    async fn send(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        tracing::debug!(
            "[GeminiApiClient] POST model={} prompt_chars={}",
            self.config.model_name,
            prompt.chars().count()
        );
        let request = self.build_request(prompt, params);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_p.is_none() && self.max_output_tokens.is_none()
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

fn extract_text_response(provider: &str, response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            TabSageError::provider(provider, "response carried no candidate text")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsage_core::provider::ProviderKind;

    fn config(api_key: &str, endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            id: "gemini".into(),
            kind: ProviderKind::Prompt,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model_name: "gemini-pro".into(),
            sampling: SamplingParams::default(),
            system_prompt: None,
        }
    }

    #[test]
    fn test_request_shape_is_single_prompt() {
        let client = GeminiApiClient::new(Client::new(), config("k", "https://example.test/models/"));
        let body = serde_json::to_value(client.build_request("Summarize", &SamplingParams::default()))
            .unwrap();

        assert_eq!(client.url(), "https://example.test/models/gemini-pro:generateContent");
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Summarize"}]}]
            })
        );
    }

    #[test]
    fn test_request_carries_sampling_when_set() {
        let client = GeminiApiClient::new(Client::new(), config("k", "https://example.test"));
        let params = SamplingParams {
            temperature: Some(0.5),
            top_p: None,
            max_tokens: Some(256),
        };
        let body = serde_json::to_value(client.build_request("q", &params)).unwrap();

        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert!(body["generationConfig"].get("topP").is_none());
    }

    #[test]
    fn test_extract_joins_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Coral "},{"text":"reefs."}]}},
                              {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response("gemini", response).unwrap(), "Coral reefs.");
    }

    #[test]
    fn test_extract_missing_text_is_provider_error() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        let err = extract_text_response("gemini", response).unwrap_err();
        assert!(err.is_provider());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = GeminiApiClient::new(Client::new(), config("", "http://127.0.0.1:1"));
        let err = client.send("hello", &SamplingParams::default()).await.unwrap_err();
        assert_eq!(err, TabSageError::provider("gemini", "no API key configured"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_provider_error() {
        let client = GeminiApiClient::new(Client::new(), config("k", "http://127.0.0.1:1"));
        let err = client.send("hello", &SamplingParams::default()).await.unwrap_err();
        match err {
            TabSageError::Provider { provider, .. } => assert_eq!(provider, "gemini"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
