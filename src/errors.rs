//! Error types for the EDGAR RAG engine
//!
//! Provides a single error enum shared by the graph, embedding, chat and
//! pipeline layers, with transport errors converted via `#[from]`.

use thiserror::Error;

/// Main error type for the RAG engine
#[derive(Error, Debug)]
pub enum RagError {
    /// Graph store rejected or failed a query
    #[error("Graph query error: {0}")]
    GraphApiError(String),

    /// Embedding service call failed
    #[error("Embedding API error: {0}")]
    EmbeddingApiError(String),

    /// Chat model call failed
    #[error("Chat API error: {0}")]
    ChatApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("RAG error: {0}")]
    Generic(String),
}

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Convert anyhow errors to RagError
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(err.to_string())
    }
}
