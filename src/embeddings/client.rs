//! Hosted embedding client
//!
//! Converts question text into a fixed-length vector by invoking a
//! Titan-style embedding model through a Bedrock-compatible
//! `/model/{id}/invoke` endpoint.

use crate::config::BedrockConfig;
use crate::errors::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Text-to-vector conversion
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text, returning one vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Embedding client for Titan-style models
#[derive(Debug, Clone)]
pub struct TitanEmbeddingClient {
    client: Client,
    endpoint: String,
    model_id: String,
    api_key: Option<String>,
}

impl TitanEmbeddingClient {
    /// Create a client for the given endpoint and model identifier
    pub fn new(config: &BedrockConfig, model_id: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_id: model_id.to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Get the model identifier
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

#[async_trait]
impl Embedder for TitanEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input_text: text.to_string(),
        };

        let mut builder = self.client.post(self.invoke_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RagError::EmbeddingApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::EmbeddingApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingApiError(format!("Failed to parse response: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(RagError::EmbeddingApiError(
                "Empty embedding returned".to_string(),
            ));
        }

        Ok(body.embedding)
    }
}

/// Titan embedding request
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest {
    #[serde(rename = "inputText")]
    input_text: String,
}

/// Titan embedding response
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}
