// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timeout and retry policy around a completion adapter.
//!
//! Every attempt is bounded by `tokio::time::timeout` so a hung provider
//! cannot block the turn. Failed attempts back off linearly (attempt N waits
//! N x base) on the async timer; the serving task is never parked on a
//! blocking sleep.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use mnemo_config::LlmConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::CompletionAdapter;

/// Completion adapter decorator adding per-attempt timeout and bounded
/// linear-backoff retry.
pub struct RetryingCompletion {
    inner: Arc<dyn CompletionAdapter>,
    retry_count: u32,
    backoff: Duration,
}

impl RetryingCompletion {
    pub fn new(inner: Arc<dyn CompletionAdapter>, config: &LlmConfig) -> Self {
        Self {
            inner,
            retry_count: config.retry_count,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

#[async_trait]
impl CompletionAdapter for RetryingCompletion {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, MnemoError> {
        let mut last_error: Option<MnemoError> = None;

        for attempt in 0..=self.retry_count {
            if attempt > 0 {
                let backoff = self.backoff * attempt;
                debug!(attempt, backoff_ms = backoff.as_millis() as u64, "backing off before retry");
                tokio::time::sleep(backoff).await;
            }

            let result = match tokio::time::timeout(timeout, self.inner.complete(prompt, timeout))
                .await
            {
                Ok(inner) => inner,
                Err(_) => Err(MnemoError::Timeout { duration: timeout }),
            };

            match result {
                Ok(reply) => {
                    debug!(attempt = attempt + 1, "completion succeeded");
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "completion attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(MnemoError::Timeout { duration }) => MnemoError::Timeout { duration },
            Some(e) => MnemoError::Completion {
                message: format!("completion failed after {} attempts: {e}", self.retry_count + 1),
                source: Some(Box::new(e)),
            },
            None => MnemoError::completion("completion failed with no attempts recorded"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyCompletion {
        calls: AtomicU32,
        fail_first: u32,
    }

    impl FlakyCompletion {
        fn new(fail_first: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first,
            }
        }
    }

    #[async_trait]
    impl CompletionAdapter for FlakyCompletion {
        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, MnemoError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                Err(MnemoError::completion("transient provider error"))
            } else {
                Ok("recovered reply".to_string())
            }
        }
    }

    struct HangingCompletion;

    #[async_trait]
    impl CompletionAdapter for HangingCompletion {
        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, MnemoError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".to_string())
        }
    }

    fn config(retries: u32, backoff_ms: u64) -> LlmConfig {
        LlmConfig {
            retry_count: retries,
            retry_backoff_ms: backoff_ms,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn succeeds_first_try_without_backoff() {
        let inner = Arc::new(FlakyCompletion::new(0));
        let retrying = RetryingCompletion::new(Arc::clone(&inner) as Arc<dyn CompletionAdapter>, &config(2, 1));
        let reply = retrying
            .complete("hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply, "recovered reply");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let inner = Arc::new(FlakyCompletion::new(2));
        let retrying = RetryingCompletion::new(Arc::clone(&inner) as Arc<dyn CompletionAdapter>, &config(2, 1));
        let reply = retrying
            .complete("hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply, "recovered reply");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_error() {
        let inner = Arc::new(FlakyCompletion::new(10));
        let retrying = RetryingCompletion::new(Arc::clone(&inner) as Arc<dyn CompletionAdapter>, &config(2, 1));
        let err = retrying
            .complete("hi", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::Completion { .. }));
        assert!(err.to_string().contains("after 3 attempts"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out() {
        let retrying = RetryingCompletion::new(Arc::new(HangingCompletion), &config(0, 1));
        let err = retrying
            .complete("hi", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::Timeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_grows_linearly() {
        let inner = Arc::new(FlakyCompletion::new(2));
        let retrying = RetryingCompletion::new(Arc::clone(&inner) as Arc<dyn CompletionAdapter>, &config(2, 100));
        let started = tokio::time::Instant::now();
        retrying
            .complete("hi", Duration::from_secs(5))
            .await
            .unwrap();
        // 100ms after attempt 1, 200ms after attempt 2.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "elapsed {elapsed:?}");
    }
}
