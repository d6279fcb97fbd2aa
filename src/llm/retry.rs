//! Bounded retry for the chat model call
//!
//! The chat stage is the only automatic recovery in the system: up to
//! `max_attempts` tries with a fixed delay between attempts, the final
//! error returned to the caller when all attempts fail. Context-building
//! errors are never routed through this policy.

use crate::errors::Result;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given attempt bound and inter-attempt delay
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Build from configuration
    pub fn from_config(config: &crate::config::RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.delay_secs))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds or the attempt bound is reached,
    /// sleeping the fixed delay between attempts and recording each
    /// retry to telemetry. Returns the first success or the last error.
    pub async fn run<T, F, Fut>(&self, telemetry: &TelemetryCollector, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    telemetry.record(TelemetryEvent::RetryAttempt {
                        attempt,
                        timestamp: std::time::Instant::now(),
                    });
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RagError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_makes_exactly_max_attempts() {
        let policy = RetryPolicy::new(5, Duration::from_secs(5));
        let telemetry = TelemetryCollector::new();
        let attempts = AtomicU32::new(0);

        let result: Result<()> = policy
            .run(&telemetry, || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(RagError::ChatApiError("throttled".to_string())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        assert_eq!(telemetry.get_stats().retry_attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_delay_spacing() {
        let policy = RetryPolicy::new(5, Duration::from_secs(5));
        let telemetry = TelemetryCollector::new();

        let start = tokio::time::Instant::now();
        let result: Result<()> = policy
            .run(&telemetry, || async {
                Err(RagError::ChatApiError("down".to_string()))
            })
            .await;

        assert!(result.is_err());
        // 5 attempts with 4 delays in between
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(20));
        assert!(elapsed < Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_final_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(5));
        let telemetry = TelemetryCollector::new();
        let attempts = AtomicU32::new(0);

        let result = policy
            .run(&telemetry, || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 5 {
                        Err(RagError::ChatApiError("transient".to_string()))
                    } else {
                        Ok("summary text")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "summary text");
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_immediate_success_makes_one_attempt() {
        let policy = RetryPolicy::default();
        let telemetry = TelemetryCollector::new();
        let attempts = AtomicU32::new(0);

        let result = policy
            .run(&telemetry, || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(telemetry.get_stats().retry_attempts, 0);
    }

    #[test]
    fn test_attempt_bound_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_secs(5));
        assert_eq!(policy.max_attempts(), 1);
    }
}
