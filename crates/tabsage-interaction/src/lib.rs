//! Provider clients for TabSage.
//!
//! Two request shapes are supported: Gemini's single-prompt
//! `generateContent` and chat-completions (Perplexity, xAI and compatible
//! servers). [`ProviderRegistry`] maps model ids to clients.

pub mod chat_api_client;
pub mod defaults;
pub mod gemini_api_client;
mod http_error;
pub mod registry;

pub use chat_api_client::ChatApiClient;
pub use gemini_api_client::GeminiApiClient;
pub use registry::ProviderRegistry;
