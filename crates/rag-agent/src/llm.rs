//! LLM provider client (spec §4.5, wire shape spec §6).
//!
//! A JSON chat-completion API compatible with the "role/content/tool_calls"
//! message shape. The provider itself is an external collaborator (spec
//! §1); this module specifies only the client side of that interface, in
//! the same connection-pooled-`reqwest`-client shape as `rag-embed`'s
//! `HttpEmbeddingClient`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;

/// One message in the chat-completion history, matching the
/// "role/content/tool\_calls" shape spec §6 requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// A tool description handed to the model, derived from the registry's
/// types rather than duplicated by hand (spec §9 Design Notes).
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSchema>,
}

/// The model's turn: either natural-language content to emit, or one or
/// more tool calls to execute before re-calling the model (spec §4.5
/// `ToolLoop`).
#[derive(Debug, Clone)]
pub enum ChatCompletion {
    Content(String),
    ToolCalls(Vec<ToolCall>),
}

/// A capability to drive a chat-completion turn with an external LLM.
/// Provider-specific clients implement this directly (same pattern as
/// `rag-embed::Embedder`).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, AgentError>;

    /// A cheap reachability probe for `GET /health` (spec §4.6). Default
    /// implementation assumes reachable; `HttpLlmClient` overrides this
    /// with an actual request.
    async fn health(&self) -> bool {
        true
    }
}

/// Configuration for [`HttpLlmClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// An [`LlmClient`] backed by a remote HTTP provider. Shares the
/// connection-pooling discipline from `rag-embed`: one client, built
/// once, never per call.
pub struct HttpLlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    /// # Errors
    ///
    /// Returns [`AgentError::Llm`] if the underlying `reqwest` client
    /// fails to build.
    pub fn new(config: LlmConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AgentError::Llm(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, AgentError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Llm(format!("{status}: {body}")));
        }

        let parsed: ProviderResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        if !parsed.tool_calls.is_empty() {
            Ok(ChatCompletion::ToolCalls(parsed.tool_calls))
        } else {
            Ok(ChatCompletion::Content(parsed.content.unwrap_or_default()))
        }
    }

    async fn health(&self) -> bool {
        self.http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok_and(|resp| !resp.status().is_server_error())
    }
}

/// Split completed content into roughly word-sized chunks for the SSE
/// `token` stream (spec §4.5 Emit). The upstream provider's own
/// incremental-delta streaming is an external-collaborator detail (spec
/// §1); this chunking reproduces the client-observable token cadence
/// without parsing partial provider deltas.
#[must_use]
pub fn chunk_into_tokens(content: &str) -> Vec<String> {
    content
        .split_inclusive(' ')
        .map(std::string::ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_chunks_reassemble_to_original_content() {
        let content = "Strategy is the bridge between vision and execution.";
        let chunks = chunk_into_tokens(content);
        assert_eq!(chunks.concat(), content);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        assert!(chunk_into_tokens("").is_empty());
    }
}
