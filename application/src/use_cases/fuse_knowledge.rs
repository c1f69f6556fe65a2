//! Knowledge Fusion Unit
//!
//! Fans one query out to every registered evidence source concurrently and
//! merges what comes back. Failing or slow sources are dropped; if every
//! source fails the result is simply empty. Fusion itself never fails.

use crate::config::RetrievalParams;
use crate::ports::evidence_source::{EvidenceSource, SourceError};
use cok_domain::{EvidenceSnippet, FusedEvidence, SourceBatch};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// A source dropped from one fusion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub error: SourceError,
}

/// Fused evidence plus the sources that did not contribute
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub evidence: FusedEvidence,
    pub failures: Vec<SourceFailure>,
}

impl FusionOutcome {
    pub fn all_failed(&self, source_count: usize) -> bool {
        source_count > 0 && self.failures.len() == source_count
    }
}

/// Use case for parallel multi-source retrieval
pub struct FuseKnowledgeUseCase {
    /// Sources in priority order (index 0 wins relevance ties)
    sources: Vec<Arc<dyn EvidenceSource>>,
    params: RetrievalParams,
}

impl FuseKnowledgeUseCase {
    pub fn new(sources: Vec<Arc<dyn EvidenceSource>>, params: RetrievalParams) -> Self {
        Self { sources, params }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Query every source concurrently and fuse the results.
    ///
    /// Each source gets `1 + source_retries` attempts, all inside one
    /// `max_wait` bound, so wall-clock time is bounded by the slowest
    /// responding source rather than the sum.
    pub async fn execute(&self, query: &str) -> FusionOutcome {
        if self.sources.is_empty() || query.trim().is_empty() {
            return FusionOutcome {
                evidence: FusedEvidence::empty(),
                failures: Vec::new(),
            };
        }

        let fetches = self
            .sources
            .iter()
            .map(|source| self.fetch_bounded(source.as_ref(), query));
        let results = join_all(fetches).await;

        let mut batches = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (priority, (source, result)) in self.sources.iter().zip(results).enumerate() {
            match result {
                Ok(snippets) => {
                    debug!("{} returned {} snippets", source.name(), snippets.len());
                    batches.push(SourceBatch::new(priority, snippets));
                }
                Err(error) => {
                    warn!("Dropping source {}: {}", source.name(), error);
                    failures.push(SourceFailure {
                        source: source.name().to_string(),
                        error,
                    });
                }
            }
        }

        let evidence = FusedEvidence::fuse(batches, self.params.max_snippets);
        debug!(
            "Fused {} snippets from {}/{} sources",
            evidence.len(),
            self.sources.len() - failures.len(),
            self.sources.len()
        );

        FusionOutcome { evidence, failures }
    }

    async fn fetch_bounded(
        &self,
        source: &dyn EvidenceSource,
        query: &str,
    ) -> Result<Vec<EvidenceSnippet>, SourceError> {
        let attempts = self.params.source_retries.saturating_add(1);

        let with_retries = async {
            let mut last_error = SourceError::Timeout;
            for attempt in 0..attempts {
                let fetch = source.fetch(query, self.params.per_source_limit, self.params.fetch_timeout);
                match tokio::time::timeout(self.params.fetch_timeout, fetch).await {
                    Ok(Ok(snippets)) => return Ok(snippets),
                    Ok(Err(e)) => last_error = e,
                    Err(_) => last_error = SourceError::Timeout,
                }
                debug!(
                    "{} attempt {}/{} failed: {}",
                    source.name(),
                    attempt + 1,
                    attempts,
                    last_error
                );
            }
            Err(last_error)
        };

        tokio::time::timeout(self.params.max_wait, with_retries)
            .await
            .unwrap_or(Err(SourceError::Timeout))
    }
}
