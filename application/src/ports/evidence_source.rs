//! Evidence source port
//!
//! One implementation per external knowledge provider. Sources are selected
//! from an explicit registered list, never by inspecting their runtime type.

use async_trait::async_trait;
use cok_domain::EvidenceSnippet;
use std::time::Duration;
use thiserror::Error;

/// Source-local failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network, auth or malformed-response failure
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Source timed out")]
    Timeout,
}

/// Uniform interface over one knowledge provider
///
/// `fetch` makes no retries; retry policy belongs to the caller. It must not
/// run past `timeout`: on timeout it fails with [`SourceError::Timeout`]
/// instead of returning partial data.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Registered name, e.g. `"wikipedia"`
    fn name(&self) -> &str;

    /// Fetch at most `limit` snippets for `query`.
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<EvidenceSnippet>, SourceError>;
}
