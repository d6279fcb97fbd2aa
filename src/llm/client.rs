//! Bedrock-style chat client
//!
//! Sends a system instruction plus user message to the configured summary
//! model via `/model/{id}/invoke`. Decoding is maximally greedy: the task
//! is extractive summarization, not creative generation.

use crate::config::BedrockConfig;
use crate::errors::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Protocol version for Anthropic models on Bedrock
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Request timeout (120 seconds; summarization over large contexts is slow)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A role-tagged conversation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The assembled two-part conversation sent atomically to the model:
/// a fixed system instruction and the combined user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

/// Decoding parameters, fixed per client
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_k: 1,
            top_p: 0.1,
            max_tokens: 50000,
        }
    }
}

/// A hosted chat model returning a single textual reply
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the payload and return the reply text
    async fn complete(&self, payload: &PromptPayload) -> Result<String>;
}

/// Chat client for Anthropic models behind a Bedrock-style endpoint
#[derive(Debug, Clone)]
pub struct BedrockChatClient {
    client: Client,
    endpoint: String,
    model_id: String,
    api_key: Option<String>,
    params: DecodingParams,
}

impl BedrockChatClient {
    /// Create a client with default (greedy) decoding parameters
    pub fn new(config: &BedrockConfig, model_id: &str) -> Result<Self> {
        Self::with_params(config, model_id, DecodingParams::default())
    }

    /// Create a client with explicit decoding parameters
    pub fn with_params(
        config: &BedrockConfig,
        model_id: &str,
        params: DecodingParams,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_id: model_id.to_string(),
            api_key: config.api_key.clone(),
            params,
        })
    }

    /// Get the model identifier
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Get the decoding parameters
    pub fn params(&self) -> &DecodingParams {
        &self.params
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

#[async_trait]
impl ChatModel for BedrockChatClient {
    async fn complete(&self, payload: &PromptPayload) -> Result<String> {
        let request = ChatRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            top_k: self.params.top_k,
            top_p: self.params.top_p,
            system: &payload.system,
            messages: &payload.messages,
        };

        let mut builder = self.client.post(self.invoke_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RagError::ChatApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::ChatApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::ChatApiError(format!("Failed to parse response: {}", e)))?;

        let text: String = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(RagError::ChatApiError(
                "Model returned no text content".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Anthropic-on-Bedrock invoke request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

/// Anthropic-on-Bedrock invoke response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    text: Option<String>,
}
