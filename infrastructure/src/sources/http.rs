//! HTTP plumbing shared by the web-backed sources.

use cok_application::ports::evidence_source::SourceError;
use std::future::Future;
use std::time::Duration;

pub(crate) const USER_AGENT: &str =
    concat!("chain-of-knowledge/", env!("CARGO_PKG_VERSION"), " (evidence retrieval)");

/// Build the client shared by one source.
pub(crate) fn client() -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SourceError::Unavailable(format!("HTTP client: {}", e)))
}

pub(crate) fn map_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Unavailable(e.to_string())
    }
}

/// GET `url` with `params` and decode the JSON body, failing after `timeout`.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    params: &[(&str, &str)],
    timeout: Duration,
) -> Result<serde_json::Value, SourceError> {
    bounded(timeout, async {
        let response = client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_error)?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        response.json().await.map_err(map_error)
    })
    .await
}

/// Fail with [`SourceError::Timeout`] if `future` outlives `timeout`.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    future: impl Future<Output = Result<T, SourceError>>,
) -> Result<T, SourceError> {
    tokio::time::timeout(timeout, future)
        .await
        .unwrap_or(Err(SourceError::Timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: Result<(), _> = bounded(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(SourceError::Timeout));
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let result = bounded(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
