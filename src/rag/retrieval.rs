//! Context builder: hybrid vector+graph retrieval
//!
//! Embeds the question, runs a single nearest-neighbor query over the
//! document vector index joined out to companies and managers, and
//! serializes the result table into an ordered, lossless JSON context.

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::graph::{queries, QueryExecutor};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// How scores from multiple graph paths reaching the same document are
/// folded into one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreAggregation {
    Mean,
    Max,
}

impl ScoreAggregation {
    /// Cypher aggregate function name
    pub fn cypher_fn(&self) -> &'static str {
        match self {
            ScoreAggregation::Mean => "avg",
            ScoreAggregation::Max => "max",
        }
    }
}

/// Retrieval parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Name of the vector index over filing documents
    pub vector_index: String,
    /// Maximum number of rows retrieved and returned
    pub top_k: usize,
    /// Score aggregation across multiple paths per document
    pub aggregation: ScoreAggregation,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_index: "document-embeddings".to_string(),
            top_k: 50,
            aggregation: ScoreAggregation::Mean,
        }
    }
}

/// One retrieved row: a filing excerpt with its (optional) company and
/// owning manager, plus the aggregated similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRow {
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    pub text: String,
    pub asset_manager: Option<String>,
    pub score: f64,
}

/// The ordered retrieval result, serializable to the JSON array handed
/// to the model as context. Serialization is lossless: field names and
/// row order round-trip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextDocument {
    rows: Vec<RetrievalRow>,
}

impl ContextDocument {
    pub fn new(rows: Vec<RetrievalRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RetrievalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize to a JSON array string preserving row order
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// Deserialize from the JSON array form
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<RetrievalRow> = serde_json::from_str(json)?;
        Ok(Self { rows })
    }
}

/// Builds the context document for a question
pub struct ContextBuilder {
    embedder: Arc<dyn Embedder>,
    executor: Arc<dyn QueryExecutor>,
    config: RetrievalConfig,
}

impl ContextBuilder {
    /// Create a builder over the given embedding and query backends
    pub fn new(
        embedder: Arc<dyn Embedder>,
        executor: Arc<dyn QueryExecutor>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            executor,
            config,
        }
    }

    /// Get the retrieval configuration
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Embed the question, run the hybrid query and collect the rows.
    /// Embedding or query failures propagate uncaught; an empty result
    /// is a valid empty document.
    pub async fn build(&self, question: &str) -> Result<ContextDocument> {
        let query_vector = self.embedder.embed(question).await?;

        let statement = queries::vector_graph_search(self.config.aggregation.cypher_fn());
        let parameters = json!({
            "indexName": self.config.vector_index,
            "k": self.config.top_k,
            "queryVector": query_vector,
        });

        let table = self.executor.run(&statement, parameters).await?;

        let rows = table
            .into_records()
            .into_iter()
            .map(|record| serde_json::from_value(serde_json::Value::Object(record)))
            .collect::<std::result::Result<Vec<RetrievalRow>, _>>()?;

        Ok(ContextDocument::new(rows))
    }
}
