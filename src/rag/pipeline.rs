//! Pipeline orchestrator
//!
//! Sequences build-context, assemble-prompt and complete-with-retry into
//! a single `answer` call. Each invocation runs to completion or failure
//! with no shared state between invocations; the wall-clock duration is
//! reported to telemetry exactly once per invocation, on every exit path.

use crate::errors::Result;
use crate::llm::{ChatModel, RetryPolicy};
use crate::rag::prompt;
use crate::rag::retrieval::ContextBuilder;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Final answer: the exact rendered prompt body and the model's raw reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub context: String,
    pub result: String,
}

/// End-to-end question answering pipeline
pub struct RagPipeline {
    context_builder: ContextBuilder,
    chat: Arc<dyn ChatModel>,
    retry: RetryPolicy,
    telemetry: TelemetryCollector,
}

impl RagPipeline {
    /// Create a pipeline over the given stages. Configuration is captured
    /// here once and never mutated afterwards.
    pub fn new(
        context_builder: ContextBuilder,
        chat: Arc<dyn ChatModel>,
        retry: RetryPolicy,
        telemetry: TelemetryCollector,
    ) -> Self {
        Self {
            context_builder,
            chat,
            retry,
            telemetry,
        }
    }

    /// Get the telemetry collector
    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    /// Answer a question: build context, assemble the prompt, complete
    /// with retry. Returns the complete result or the first unrecovered
    /// error; there is no partial response mode.
    pub async fn answer(&self, question: &str) -> Result<AnswerResult> {
        let mut timer = PipelineTimer::start(self.telemetry.clone());

        let context_start = Instant::now();
        let document = self.context_builder.build(question).await?;
        let context_json = document.to_json()?;
        self.telemetry.record(TelemetryEvent::ContextBuilt {
            rows: document.len(),
            duration_ms: context_start.elapsed().as_millis() as u64,
            timestamp: Instant::now(),
        });

        let payload = prompt::assemble(question, &context_json);
        let rendered_prompt = payload.messages[0].content.clone();

        let chat_start = Instant::now();
        let reply = self
            .retry
            .run(&self.telemetry, || self.chat.complete(&payload))
            .await?;
        self.telemetry.record(TelemetryEvent::ChatCompleted {
            duration_ms: chat_start.elapsed().as_millis() as u64,
            timestamp: Instant::now(),
        });

        timer.succeed();
        Ok(AnswerResult {
            context: rendered_prompt,
            result: reply,
        })
    }
}

/// Drop-guard timing the invocation. The completion event fires when the
/// guard goes out of scope, so early `?` returns report the duration too.
struct PipelineTimer {
    telemetry: TelemetryCollector,
    start: Instant,
    success: bool,
}

impl PipelineTimer {
    fn start(telemetry: TelemetryCollector) -> Self {
        Self {
            telemetry,
            start: Instant::now(),
            success: false,
        }
    }

    fn succeed(&mut self) {
        self.success = true;
    }
}

impl Drop for PipelineTimer {
    fn drop(&mut self) {
        self.telemetry.record(TelemetryEvent::PipelineCompleted {
            duration_ms: self.start.elapsed().as_millis() as u64,
            success: self.success,
            timestamp: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_result_serialization() {
        let result = AnswerResult {
            context: "<question>\nq\n</question>".to_string(),
            result: "summary".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        let restored: AnswerResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, result);
    }

    #[test]
    fn test_timer_reports_failure_by_default() {
        let telemetry = TelemetryCollector::new();
        {
            let _timer = PipelineTimer::start(telemetry.clone());
        }

        let stats = telemetry.get_stats();
        assert_eq!(stats.pipelines_failed, 1);
        assert_eq!(stats.pipelines_succeeded, 0);
    }

    #[test]
    fn test_timer_reports_success_once() {
        let telemetry = TelemetryCollector::new();
        {
            let mut timer = PipelineTimer::start(telemetry.clone());
            timer.succeed();
        }

        assert_eq!(telemetry.pipeline_reports(), 1);
        assert_eq!(telemetry.get_stats().pipelines_succeeded, 1);
    }
}
