//! End-to-end pipeline tests over in-memory backends
//!
//! Exercises the full answer flow without live services: scripted
//! embedding, graph and chat implementations plugged into the real
//! context builder, retry policy and orchestrator.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use edgar_rag::embeddings::Embedder;
use edgar_rag::errors::{RagError, Result};
use edgar_rag::graph::{QueryExecutor, QueryTable};
use edgar_rag::llm::{ChatModel, PromptPayload, RetryPolicy};
use edgar_rag::rag::{ContextBuilder, RagPipeline, RetrievalConfig, RetrievalRow};
use edgar_rag::telemetry::TelemetryCollector;

/// Always returns the same vector
struct FixedEmbedder {
    vector: Vec<f32>,
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }
}

/// Always fails
struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingApiError("service unavailable".to_string()))
    }
}

/// Returns a fixed table and captures the parameters it was called with
struct TableExecutor {
    table: QueryTable,
    captured: Mutex<Option<serde_json::Value>>,
}

impl TableExecutor {
    fn new(table: QueryTable) -> Self {
        Self {
            table,
            captured: Mutex::new(None),
        }
    }
}

#[async_trait]
impl QueryExecutor for TableExecutor {
    async fn run(&self, _statement: &str, parameters: serde_json::Value) -> Result<QueryTable> {
        *self.captured.lock().unwrap() = Some(parameters);
        Ok(self.table.clone())
    }
}

/// Fails a scripted number of times before succeeding
struct ScriptedChat {
    failures_before_success: u32,
    attempts: AtomicU32,
    reply: String,
}

impl ScriptedChat {
    fn new(failures_before_success: u32, reply: &str) -> Self {
        Self {
            failures_before_success,
            attempts: AtomicU32::new(0),
            reply: reply.to_string(),
        }
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, _payload: &PromptPayload) -> Result<String> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            Err(RagError::ChatApiError("throttled".to_string()))
        } else {
            Ok(self.reply.clone())
        }
    }
}

/// Records the payload it was sent
struct CapturingChat {
    reply: String,
    payloads: Mutex<Vec<PromptPayload>>,
}

impl CapturingChat {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            payloads: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for CapturingChat {
    async fn complete(&self, payload: &PromptPayload) -> Result<String> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(self.reply.clone())
    }
}

fn apple_table() -> QueryTable {
    QueryTable {
        columns: vec![
            "companyName".to_string(),
            "text".to_string(),
            "asset_manager".to_string(),
            "score".to_string(),
        ],
        rows: vec![
            vec![
                json!("Apple Inc"),
                json!("Vanguard reported 430M shares of Apple Inc"),
                json!("Vanguard"),
                json!(0.91),
            ],
            vec![
                json!("Apple Inc"),
                json!("BlackRock reported 410M shares of Apple Inc"),
                json!("BlackRock"),
                json!(0.88),
            ],
        ],
    }
}

fn empty_table() -> QueryTable {
    QueryTable {
        columns: vec![
            "companyName".to_string(),
            "text".to_string(),
            "asset_manager".to_string(),
            "score".to_string(),
        ],
        rows: vec![],
    }
}

fn make_pipeline(
    embedder: Arc<dyn Embedder>,
    executor: Arc<dyn QueryExecutor>,
    chat: Arc<dyn ChatModel>,
) -> (RagPipeline, TelemetryCollector) {
    let telemetry = TelemetryCollector::new();
    let pipeline = RagPipeline::new(
        ContextBuilder::new(embedder, executor, RetrievalConfig::default()),
        chat,
        RetryPolicy::new(5, Duration::from_secs(5)),
        telemetry.clone(),
    );
    (pipeline, telemetry)
}

/// Extract the serialized context array from the rendered prompt body
fn context_array(rendered: &str) -> Vec<RetrievalRow> {
    let start = rendered.find("<context>\n").unwrap() + "<context>\n".len();
    let end = rendered.find("\n</context>").unwrap();
    serde_json::from_str(&rendered[start..end]).unwrap()
}

#[tokio::test]
async fn test_example_scenario_two_rows() {
    let question = "Which managers own the most Apple stock?";
    let (pipeline, telemetry) = make_pipeline(
        Arc::new(FixedEmbedder {
            vector: vec![0.1, 0.2, 0.3],
        }),
        Arc::new(TableExecutor::new(apple_table())),
        Arc::new(ScriptedChat::new(0, "Vanguard and BlackRock hold the most.")),
    );

    let answer = pipeline.answer(question).await.unwrap();

    assert!(answer.context.contains(question));
    assert_eq!(answer.result, "Vanguard and BlackRock hold the most.");

    let rows = context_array(&answer.context);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].asset_manager.as_deref(), Some("Vanguard"));
    assert_eq!(rows[0].score, 0.91);
    assert_eq!(rows[1].asset_manager.as_deref(), Some("BlackRock"));
    assert_eq!(rows[1].score, 0.88);

    let stats = telemetry.get_stats();
    assert_eq!(stats.pipelines_succeeded, 1);
    assert_eq!(telemetry.pipeline_reports(), 1);
}

#[tokio::test]
async fn test_empty_retrieval_completes() {
    let (pipeline, telemetry) = make_pipeline(
        Arc::new(FixedEmbedder {
            vector: vec![0.5; 8],
        }),
        Arc::new(TableExecutor::new(empty_table())),
        Arc::new(ScriptedChat::new(0, "No relevant filings found.")),
    );

    let answer = pipeline.answer("Who owns Acme?").await.unwrap();

    assert!(answer.context.contains("<context>\n[]\n</context>"));
    assert_eq!(telemetry.get_stats().pipelines_succeeded, 1);
}

#[tokio::test]
async fn test_retrieval_parameters() {
    let executor = Arc::new(TableExecutor::new(apple_table()));
    let (pipeline, _telemetry) = make_pipeline(
        Arc::new(FixedEmbedder {
            vector: vec![0.25, -0.5],
        }),
        executor.clone(),
        Arc::new(ScriptedChat::new(0, "ok")),
    );

    pipeline.answer("q").await.unwrap();

    let captured = executor.captured.lock().unwrap().clone().unwrap();
    assert_eq!(captured["indexName"], json!("document-embeddings"));
    assert_eq!(captured["k"], json!(50));
    assert_eq!(captured["queryVector"], json!([0.25, -0.5]));
}

#[tokio::test]
async fn test_prompt_payload_shape() {
    let chat = Arc::new(CapturingChat::new("summary"));
    let (pipeline, _telemetry) = make_pipeline(
        Arc::new(FixedEmbedder {
            vector: vec![0.1],
        }),
        Arc::new(TableExecutor::new(apple_table())),
        chat.clone(),
    );

    let answer = pipeline.answer("Who owns Apple?").await.unwrap();

    let payloads = chat.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].messages.len(), 1);
    assert_eq!(payloads[0].messages[0].role, "user");
    // AnswerResult.context is exactly the rendered user message body
    assert_eq!(payloads[0].messages[0].content, answer.context);
    assert!(payloads[0].system.contains("Financial expert"));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_propagate_last_error() {
    let chat = Arc::new(ScriptedChat::new(u32::MAX, "never"));
    let (pipeline, telemetry) = make_pipeline(
        Arc::new(FixedEmbedder {
            vector: vec![0.1],
        }),
        Arc::new(TableExecutor::new(apple_table())),
        chat.clone(),
    );

    let result = pipeline.answer("q").await;

    assert!(matches!(result, Err(RagError::ChatApiError(_))));
    assert_eq!(chat.attempts(), 5);

    // Timing side-channel still fires exactly once on the failure path
    let stats = telemetry.get_stats();
    assert_eq!(stats.pipelines_failed, 1);
    assert_eq!(telemetry.pipeline_reports(), 1);
    assert_eq!(stats.retry_attempts, 4);
}

#[tokio::test(start_paused = true)]
async fn test_success_on_fifth_attempt() {
    let chat = Arc::new(ScriptedChat::new(4, "finally"));
    let (pipeline, telemetry) = make_pipeline(
        Arc::new(FixedEmbedder {
            vector: vec![0.1],
        }),
        Arc::new(TableExecutor::new(apple_table())),
        chat.clone(),
    );

    let answer = pipeline.answer("q").await.unwrap();

    assert_eq!(answer.result, "finally");
    assert_eq!(chat.attempts(), 5);
    assert_eq!(telemetry.get_stats().pipelines_succeeded, 1);
}

#[tokio::test]
async fn test_context_stage_failure_is_not_retried() {
    let chat = Arc::new(ScriptedChat::new(0, "unused"));
    let (pipeline, telemetry) = make_pipeline(
        Arc::new(FailingEmbedder),
        Arc::new(TableExecutor::new(apple_table())),
        chat.clone(),
    );

    let result = pipeline.answer("q").await;

    assert!(matches!(result, Err(RagError::EmbeddingApiError(_))));
    // Chat never reached, no retries attempted
    assert_eq!(chat.attempts(), 0);
    let stats = telemetry.get_stats();
    assert_eq!(stats.retry_attempts, 0);
    assert_eq!(stats.pipelines_failed, 1);
    assert_eq!(telemetry.pipeline_reports(), 1);
}
