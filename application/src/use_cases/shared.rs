//! Shared utilities for use cases.
//!
//! Bounded, retried completion calls used by every stage that talks to the
//! model, and cancellation checking for the orchestrator.

use crate::config::CompletionParams;
use crate::ports::completion::{CompletionBackend, CompletionError};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Temperature for deterministic stage calls (correction, validation,
/// consolidation, query extraction).
pub(crate) const DETERMINISTIC_TEMPERATURE: f64 = 0.0;

/// Call the backend with a per-attempt timeout, retrying with backoff.
///
/// Returns the last error once `params.retry` is exhausted. An attempt that
/// exceeds `params.timeout` counts as [`CompletionError::Timeout`].
pub(crate) async fn complete_with_retry(
    backend: &dyn CompletionBackend,
    prompt: &str,
    temperature: f64,
    params: &CompletionParams,
) -> Result<String, CompletionError> {
    let attempts = params.retry.attempts();
    let mut last_error = CompletionError::Timeout;

    for attempt in 0..attempts {
        if attempt > 0 {
            tokio::time::sleep(params.retry.backoff_for(attempt - 1)).await;
        }

        let call = backend.complete(prompt, temperature, params.max_tokens);
        match tokio::time::timeout(params.timeout, call).await {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => {
                warn!(
                    "{} attempt {}/{} failed: {}",
                    backend.name(),
                    attempt + 1,
                    attempts,
                    e
                );
                last_error = e;
            }
            Err(_) => {
                warn!(
                    "{} attempt {}/{} timed out after {:?}",
                    backend.name(),
                    attempt + 1,
                    attempts,
                    params.timeout
                );
                last_error = CompletionError::Timeout;
            }
        }
    }

    debug!("{} exhausted {} attempts", backend.name(), attempts);
    Err(last_error)
}

/// Check if cancellation has been requested.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(CancellationToken::is_cancelled)
}

/// Run `future` unless the token fires first. `None` means cancelled.
///
/// Dropping the losing future aborts any `JoinSet` it owns, so abandoned
/// tasks never report back.
pub(crate) async fn until_cancelled<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Option<F::Output> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        }
        None => Some(future.await),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted test doubles shared by the use case tests.

    use crate::ports::completion::{CompletionBackend, CompletionError};
    use crate::ports::evidence_source::{EvidenceSource, SourceError};
    use async_trait::async_trait;
    use cok_domain::EvidenceSnippet;
    use std::sync::Mutex;
    use std::time::Duration;

    type Responder = dyn Fn(&str, f64) -> Result<String, CompletionError> + Send + Sync;

    /// Backend answering from a closure and recording every call.
    pub struct ScriptedBackend {
        responder: Box<Responder>,
        pub calls: Mutex<Vec<(String, f64)>>,
        delay: Option<Duration>,
    }

    impl ScriptedBackend {
        pub fn new(
            responder: impl Fn(&str, f64) -> Result<String, CompletionError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        /// Always reply with `text`.
        pub fn fixed(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_, _| Ok(text.clone()))
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn prompts(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(p, _)| p.clone())
                .collect()
        }

        pub fn temperatures(&self) -> Vec<f64> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            prompt: &str,
            temperature: f64,
            _max_tokens: u32,
        ) -> Result<String, CompletionError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.responder)(prompt, temperature)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Evidence source with a fixed behaviour.
    pub enum FakeSource {
        Returns(&'static str, Vec<EvidenceSnippet>),
        Fails(&'static str),
        Sleeps(&'static str, Duration),
    }

    impl FakeSource {
        pub fn returning(name: &'static str, texts: &[(&str, f64)]) -> Self {
            FakeSource::Returns(
                name,
                texts
                    .iter()
                    .map(|(text, score)| EvidenceSnippet::new(name, *text, *score))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl EvidenceSource for FakeSource {
        fn name(&self) -> &str {
            match self {
                FakeSource::Returns(name, _) | FakeSource::Fails(name) | FakeSource::Sleeps(name, _) => {
                    name
                }
            }
        }

        async fn fetch(
            &self,
            _query: &str,
            limit: usize,
            _timeout: Duration,
        ) -> Result<Vec<EvidenceSnippet>, SourceError> {
            match self {
                FakeSource::Returns(_, snippets) => Ok(snippets.iter().take(limit).cloned().collect()),
                FakeSource::Fails(_) => Err(SourceError::Unavailable("connection refused".into())),
                FakeSource::Sleeps(_, duration) => {
                    tokio::time::sleep(*duration).await;
                    Ok(Vec::new())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedBackend;
    use super::*;
    use crate::config::RetryPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn params(max_attempts: u32) -> CompletionParams {
        CompletionParams {
            max_tokens: 64,
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_attempts,
                initial_backoff: Duration::from_millis(10),
                max_backoff: Duration::from_millis(40),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let failures = AtomicUsize::new(0);
        let backend = ScriptedBackend::new(move |_, _| {
            if failures.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CompletionError::RateLimited)
            } else {
                Ok("done".to_string())
            }
        });

        let result = complete_with_retry(&backend, "p", 0.0, &params(3)).await;
        assert_eq!(result, Ok("done".to_string()));
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_returns_last_error() {
        let backend =
            ScriptedBackend::new(|_, _| Err(CompletionError::ProviderError("boom".into())));
        let result = complete_with_retry(&backend, "p", 0.0, &params(2)).await;
        assert_eq!(result, Err(CompletionError::ProviderError("boom".into())));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_maps_to_timeout() {
        let backend = ScriptedBackend::fixed("late").with_delay(Duration::from_secs(60));
        let result = complete_with_retry(&backend, "p", 0.0, &params(1)).await;
        assert_eq!(result, Err(CompletionError::Timeout));
    }

    #[tokio::test]
    async fn test_until_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let out = until_cancelled(&Some(token), async { 1 }).await;
        assert_eq!(out, None);
        assert_eq!(until_cancelled(&None, async { 1 }).await, Some(1));
    }
}
