//! Neo4j HTTP client
//!
//! Issues parameterized Cypher statements through the transactional
//! endpoint (`POST /db/{database}/tx/commit`) and returns tabular results.

use crate::config::GraphConfig;
use crate::errors::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tabular result of a graph query: column names plus positionally
/// matching row values, in the order the store returned them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert to ordered records keyed by column name, preserving row order
    pub fn into_records(self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .cloned()
                    .zip(row)
                    .collect::<serde_json::Map<_, _>>()
            })
            .collect()
    }
}

/// Read-only query execution against the graph store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a parameterized Cypher statement and return the result table
    async fn run(
        &self,
        statement: &str,
        parameters: serde_json::Value,
    ) -> Result<QueryTable>;
}

/// Neo4j HTTP transactional API client
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    database: String,
    username: Option<String>,
    password: Option<String>,
}

impl GraphClient {
    /// Create a client from graph connection settings
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Check if the graph store is reachable
    pub async fn health_check(&self) -> Result<bool> {
        match self.run("RETURN 1 AS ok", serde_json::json!({})).await {
            Ok(table) => Ok(!table.is_empty()),
            Err(_) => Ok(false),
        }
    }

    /// Get the transactional endpoint URL
    fn commit_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.base_url, self.database)
    }
}

#[async_trait]
impl QueryExecutor for GraphClient {
    async fn run(
        &self,
        statement: &str,
        parameters: serde_json::Value,
    ) -> Result<QueryTable> {
        let request = TxRequest {
            statements: vec![TxStatement {
                statement: statement.to_string(),
                parameters,
            }],
        };

        let mut builder = self.client.post(self.commit_url()).json(&request);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RagError::GraphApiError(format!("Failed to send query: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::GraphApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let tx_response: TxResponse = response
            .json()
            .await
            .map_err(|e| RagError::GraphApiError(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = tx_response.errors.first() {
            return Err(RagError::GraphApiError(format!(
                "{}: {}",
                error.code, error.message
            )));
        }

        let result = tx_response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::GraphApiError("Empty result set".to_string()))?;

        Ok(QueryTable {
            columns: result.columns,
            rows: result.data.into_iter().map(|d| d.row).collect(),
        })
    }
}

/// Transactional API request body
#[derive(Debug, Clone, Serialize)]
struct TxRequest {
    statements: Vec<TxStatement>,
}

#[derive(Debug, Clone, Serialize)]
struct TxStatement {
    statement: String,
    parameters: serde_json::Value,
}

/// Transactional API response body
#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}
