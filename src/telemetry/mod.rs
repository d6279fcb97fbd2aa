//! Telemetry for the RAG pipeline
//!
//! Collects per-invocation events and durations for terminal display.
//! The pipeline timing side-channel is reported through this collector:
//! every `answer` call records exactly one `PipelineCompleted` event,
//! whether the invocation succeeds or fails.

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// Context builder finished (embedding + hybrid query + serialization)
    ContextBuilt {
        rows: usize,
        duration_ms: u64,
        timestamp: Instant,
    },
    /// A chat attempt failed and will be retried after the fixed delay
    RetryAttempt {
        attempt: u32,
        timestamp: Instant,
    },
    /// Chat model returned a reply
    ChatCompleted {
        duration_ms: u64,
        timestamp: Instant,
    },
    /// Pipeline invocation finished, on any exit path
    PipelineCompleted {
        duration_ms: u64,
        success: bool,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub contexts_built: usize,
    pub rows_retrieved: usize,
    pub retry_attempts: usize,
    pub chats_completed: usize,
    pub pipelines_succeeded: usize,
    pub pipelines_failed: usize,
    pub last_pipeline_ms: u64,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = self.stats.lock().unwrap();
            match &event {
                TelemetryEvent::ContextBuilt { rows, .. } => {
                    stats.contexts_built += 1;
                    stats.rows_retrieved += rows;
                }
                TelemetryEvent::RetryAttempt { .. } => {
                    stats.retry_attempts += 1;
                }
                TelemetryEvent::ChatCompleted { .. } => {
                    stats.chats_completed += 1;
                }
                TelemetryEvent::PipelineCompleted {
                    duration_ms,
                    success,
                    ..
                } => {
                    if *success {
                        stats.pipelines_succeeded += 1;
                    } else {
                        stats.pipelines_failed += 1;
                    }
                    stats.last_pipeline_ms = *duration_ms;
                }
            }
        }

        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        self.stats.lock().unwrap().clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = self.events.lock().unwrap();
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Number of pipeline-completed events recorded so far
    pub fn pipeline_reports(&self) -> usize {
        let stats = self.stats.lock().unwrap();
        stats.pipelines_succeeded + stats.pipelines_failed
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal summary display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
}

impl TelemetryDisplay {
    pub fn new(collector: TelemetryCollector) -> Self {
        Self { collector }
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        let stats = self.collector.get_stats();

        println!("\nPipeline Summary");
        println!("─────────────────────────────────────");
        println!("Answer time:       {}ms", stats.last_pipeline_ms);
        println!("Context rows:      {}", stats.rows_retrieved);
        println!("Chat retries:      {}", stats.retry_attempts);
        println!(
            "Outcome:           {}",
            if stats.pipelines_failed == 0 {
                "ok"
            } else {
                "failed"
            }
        );
        println!();
    }
}
